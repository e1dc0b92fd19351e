// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter construction from configuration.
//!
//! The notification channel and reputation service are selected once at
//! startup: SMTP/HTTP when configured, log-only/no-op fallbacks otherwise.

use std::sync::Arc;

use leadflow_config::model::LeadflowConfig;
use leadflow_core::{LeadflowError, NotificationChannel, ReputationService};
use leadflow_notify::{LogNotifier, SmtpNotifier};
use leadflow_reputation::{HttpReputationService, NoopReputation};
use tracing::info;

/// Build the configured notification channel.
pub fn build_notifier(
    config: &LeadflowConfig,
) -> Result<Arc<dyn NotificationChannel>, LeadflowError> {
    let notifier: Arc<dyn NotificationChannel> = if config.notify.smtp_host.is_some() {
        Arc::new(SmtpNotifier::from_config(&config.notify)?)
    } else {
        Arc::new(LogNotifier::new())
    };
    info!(channel = notifier.name(), "notification channel ready");
    Ok(notifier)
}

/// Build the configured reputation service.
pub fn build_reputation(
    config: &LeadflowConfig,
) -> Result<Arc<dyn ReputationService>, LeadflowError> {
    let reputation: Arc<dyn ReputationService> = if config.reputation.base_url.is_some() {
        Arc::new(HttpReputationService::from_config(&config.reputation)?)
    } else {
        Arc::new(NoopReputation::new())
    };
    info!(service = reputation.name(), "reputation service ready");
    Ok(reputation)
}
