// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadflow routing engine.

use thiserror::Error;

/// The primary error type used across the routing engine and its adapters.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification channel errors (SMTP connection, message build failure).
    ///
    /// Notification is best-effort: callers log this and carry on; it never
    /// rolls back an assignment.
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reputation service errors (HTTP failure, non-success status).
    ///
    /// Best-effort like notification failures.
    #[error("reputation error: {message}")]
    Reputation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced lead does not exist.
    #[error("lead not found: {0}")]
    LeadNotFound(String),

    /// The referenced agent does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// A routing call raced an existing active assignment for the lead.
    #[error("lead {lead_id} already has an active assignment")]
    ActiveAssignmentExists { lead_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
