// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadflow routing engine.
//!
//! This crate provides the error taxonomy, domain types (leads, agents,
//! assignments, tiers), and the adapter traits for the external collaborators
//! of the engine: the notification channel and the reputation service.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LeadflowError;
pub use types::{
    Agent, Assignment, AssignmentStatus, ContactPreference, Lead, MessageId, NotificationKind,
    NotificationMessage, Tier,
};

pub use traits::{NotificationChannel, ReputationService};
