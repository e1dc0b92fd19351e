// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log-only notification channel.
//!
//! Used when no SMTP relay is configured: the rendered message is emitted
//! into the log stream so operators still see what would have been sent.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use leadflow_core::types::{Agent, MessageId, NotificationMessage};
use leadflow_core::{LeadflowError, NotificationChannel};

use crate::templates;

/// A notification channel that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(
        &self,
        agent: &Agent,
        message: &NotificationMessage,
    ) -> Result<MessageId, LeadflowError> {
        let message_id = MessageId(Uuid::new_v4().to_string());
        info!(
            agent_id = %agent.id,
            agent_email = %agent.email,
            kind = %message.kind,
            subject = %templates::subject(message),
            message_id = %message_id.0,
            "notification (log-only delivery)"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::types::{NotificationKind, Tier};

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let agent = Agent {
            id: "a-1".to_string(),
            name: "Agent a-1".to_string(),
            tier: Tier::OnCall,
            active: true,
            email: "a-1@example.com".to_string(),
            phone: None,
            service_area: None,
            last_assigned_at: None,
        };
        let message = NotificationMessage {
            kind: NotificationKind::LeadAssigned,
            lead_id: "lead-1".to_string(),
            property_id: "prop-1".to_string(),
            assignment_id: "as-1".to_string(),
            expires_at: None,
            note: None,
        };

        let notifier = LogNotifier::new();
        let id = notifier.notify(&agent, &message).await.unwrap();
        assert!(!id.0.is_empty());
    }
}
