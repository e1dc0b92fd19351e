// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use uuid::Uuid;

use leadflow_config::model::NotifyConfig;
use leadflow_core::types::{Agent, MessageId, NotificationMessage};
use leadflow_core::{LeadflowError, NotificationChannel};

use crate::templates;

/// Notification channel backed by an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from the `[notify]` config section.
    ///
    /// Fails when `smtp_host` is unset — the caller decides between SMTP and
    /// the log fallback before constructing this.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, LeadflowError> {
        let host = config.smtp_host.as_deref().ok_or_else(|| {
            LeadflowError::Config("notify.smtp_host is required for SMTP delivery".to_string())
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| LeadflowError::Notify {
                message: format!("invalid SMTP relay `{host}`"),
                source: Some(Box::new(e)),
            })?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) =
            (&config.smtp_username, &config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| LeadflowError::Notify {
                message: format!("invalid notify.from_address `{}`", config.from_address),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl NotificationChannel for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn notify(
        &self,
        agent: &Agent,
        message: &NotificationMessage,
    ) -> Result<MessageId, LeadflowError> {
        let to = agent
            .email
            .parse::<Mailbox>()
            .map_err(|e| LeadflowError::Notify {
                message: format!("invalid agent email `{}`", agent.email),
                source: Some(Box::new(e)),
            })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(templates::subject(message))
            .body(templates::body(agent, message))
            .map_err(|e| LeadflowError::Notify {
                message: "failed to build email".to_string(),
                source: Some(Box::new(e)),
            })?;

        self.transport
            .send(email)
            .await
            .map_err(|e| LeadflowError::Notify {
                message: format!("SMTP send to {} failed", agent.email),
                source: Some(Box::new(e)),
            })?;

        let message_id = MessageId(Uuid::new_v4().to_string());
        debug!(
            agent_id = %agent.id,
            kind = %message.kind,
            message_id = %message_id.0,
            "notification delivered via SMTP"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: Option<&str>) -> NotifyConfig {
        NotifyConfig {
            smtp_host: host.map(str::to_string),
            smtp_port: 465,
            from_address: "leads@example.com".to_string(),
            smtp_username: None,
            smtp_password: None,
        }
    }

    #[test]
    fn from_config_requires_a_host() {
        let result = SmtpNotifier::from_config(&config(None));
        assert!(matches!(result, Err(LeadflowError::Config(_))));
    }

    #[test]
    fn from_config_builds_with_host_and_credentials() {
        let mut cfg = config(Some("smtp.example.com"));
        cfg.smtp_username = Some("mailer".to_string());
        cfg.smtp_password = Some("secret".to_string());
        let notifier = SmtpNotifier::from_config(&cfg).unwrap();
        assert_eq!(notifier.name(), "smtp");
    }

    #[test]
    fn from_config_rejects_bad_from_address() {
        let mut cfg = config(Some("smtp.example.com"));
        cfg.from_address = "not an address".to_string();
        let result = SmtpNotifier::from_config(&cfg);
        assert!(matches!(result, Err(LeadflowError::Notify { .. })));
    }
}
