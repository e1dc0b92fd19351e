// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reputation service trait for penalizing agents who miss the SLA.

use async_trait::async_trait;

use crate::error::LeadflowError;

/// Adapter for the external reputation/scoring service.
///
/// Invoked once per expired assignment, after the expiry transaction has
/// committed. The scoring algorithm itself is out of scope.
#[async_trait]
pub trait ReputationService: Send + Sync + 'static {
    /// Returns the human-readable name of this service (for logs).
    fn name(&self) -> &str;

    /// Applies an SLA-miss penalty for the given agent.
    async fn penalize_sla(&self, agent_id: &str) -> Result<(), LeadflowError>;
}
