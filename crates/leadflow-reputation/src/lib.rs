// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the external reputation service.
//!
//! The engine's only contract with the service is `penalize_sla(agent_id)`,
//! invoked once per expired assignment. Scoring itself is out of scope.
//! [`HttpReputationService`] posts penalties over HTTP; [`NoopReputation`] is
//! used when no service is configured.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use leadflow_config::model::ReputationConfig;
use leadflow_core::{LeadflowError, ReputationService};

/// HTTP client for the reputation service.
pub struct HttpReputationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReputationService {
    /// Build a client from the `[reputation]` config section.
    ///
    /// Fails when `base_url` is unset — the caller decides between HTTP and
    /// the no-op fallback before constructing this.
    pub fn from_config(config: &ReputationConfig) -> Result<Self, LeadflowError> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            LeadflowError::Config("reputation.base_url is required for penalties".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LeadflowError::Reputation {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, base_url })
    }

    fn penalties_url(&self) -> String {
        format!("{}/penalties", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ReputationService for HttpReputationService {
    fn name(&self) -> &str {
        "http"
    }

    async fn penalize_sla(&self, agent_id: &str) -> Result<(), LeadflowError> {
        let response = self
            .client
            .post(self.penalties_url())
            .json(&serde_json::json!({
                "agent_id": agent_id,
                "reason": "sla_missed",
            }))
            .send()
            .await
            .map_err(|e| LeadflowError::Reputation {
                message: format!("penalty request for agent {agent_id} failed"),
                source: Some(Box::new(e)),
            })?;

        response
            .error_for_status()
            .map_err(|e| LeadflowError::Reputation {
                message: format!("penalty for agent {agent_id} rejected"),
                source: Some(Box::new(e)),
            })?;

        debug!(agent_id, "SLA penalty applied");
        Ok(())
    }
}

/// Reputation service that does nothing, for deployments without one.
#[derive(Debug, Default)]
pub struct NoopReputation;

impl NoopReputation {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReputationService for NoopReputation {
    fn name(&self) -> &str {
        "noop"
    }

    async fn penalize_sla(&self, agent_id: &str) -> Result<(), LeadflowError> {
        debug!(agent_id, "reputation disabled -- penalty skipped");
        Ok(())
    }
}
