// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the routing engine.
//!
//! Timestamps are stored and passed around as `%Y-%m-%dT%H:%M:%S%.3fZ` TEXT so
//! that lexicographic order equals chronological order, both in SQL
//! comparisons and in Rust. [`format_timestamp`] and [`parse_timestamp`] are
//! the only two places that know the format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a dispatched notification message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Escalation class of an agent. A static classification, not derived.
///
/// Ordering of escalation is External -> Internal -> OnCall; OnCall is the
/// terminal safety net and has no attempt limit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    External,
    Internal,
    OnCall,
}

/// Lifecycle state of an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Waiting on the agent; the SLA clock is running.
    Assigned,
    /// The agent responded in time. Terminal for the lead.
    Accepted,
    /// The SLA elapsed. Terminal for the assignment, not for the lead.
    Expired,
}

impl AssignmentStatus {
    /// Whether this status ends the assignment's lifecycle.
    pub fn is_terminal(self) -> bool {
        !matches!(self, AssignmentStatus::Assigned)
    }
}

/// How the buyer prefers to be contacted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactPreference {
    Phone,
    Email,
    Chat,
    Either,
}

/// A buyer's recorded interest in a property.
///
/// At most one lead exists per `(buyer_id, property_id)` pair; repeat interest
/// updates the existing record in place and never re-triggers routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub buyer_id: String,
    pub property_id: String,
    pub contact_preference: ContactPreference,
    pub message: String,
    /// Service region of the property, when known. Used by selection filters.
    pub property_area: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A broker eligible to receive leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub active: bool,
    pub email: String,
    pub phone: Option<String>,
    /// Service region this agent covers, when constrained.
    pub service_area: Option<String>,
    /// Fairness key for least-recently-assigned selection.
    pub last_assigned_at: Option<String>,
}

/// One timed attempt to hand a lead to one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub lead_id: String,
    pub agent_id: String,
    /// Tier of the agent at the time of assignment.
    pub tier: Tier,
    pub status: AssignmentStatus,
    pub assigned_at: String,
    /// `assigned_at` plus the configured SLA window.
    pub expires_at: String,
    /// Free-form outcome metadata as JSON (expiry timestamp, reassignment reason).
    pub outcome: Option<String>,
    /// Escalation lease: which worker invocation currently holds this row.
    pub lease_owner: Option<String>,
    /// Escalation lease: when the hold expires and the row becomes claimable again.
    pub lease_until: Option<String>,
}

/// Kinds of notification messages the engine dispatches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// "A new lead has been assigned to you."
    LeadAssigned,
    /// "You missed the response window for a lead."
    SlaMissed,
}

/// Context handed to the notification channel for rendering and delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub kind: NotificationKind,
    pub lead_id: String,
    pub property_id: String,
    pub assignment_id: String,
    /// Response deadline, present for `LeadAssigned`.
    pub expires_at: Option<String>,
    /// The buyer's free-text message, when worth including.
    pub note: Option<String>,
}

/// Render a UTC instant in the engine's canonical timestamp format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parse a timestamp previously produced by [`format_timestamp`].
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
