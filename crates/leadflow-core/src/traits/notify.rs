// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification channel trait for informing agents (email/SMS/etc.).

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::types::{Agent, MessageId, NotificationMessage};

/// Adapter for the outbound notification channel.
///
/// Exactly one `LeadAssigned` dispatch happens per successful routing call,
/// and one `SlaMissed` dispatch per expired assignment. Delivery guarantees
/// are the channel's problem; the engine treats the send as best-effort.
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    /// Returns the human-readable name of this channel (for logs).
    fn name(&self) -> &str;

    /// Sends one notification to one agent.
    async fn notify(
        &self,
        agent: &Agent,
        message: &NotificationMessage,
    ) -> Result<MessageId, LeadflowError>;
}
