// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reputation service for deterministic testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadflow_core::{LeadflowError, ReputationService};

/// A mock reputation service that records penalized agent ids.
pub struct MockReputation {
    penalized: Arc<Mutex<Vec<String>>>,
    failing: AtomicBool,
}

impl MockReputation {
    /// Mock service that accepts every penalty.
    pub fn new() -> Self {
        Self {
            penalized: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// Mock service that rejects every penalty.
    pub fn failing() -> Self {
        let service = Self::new();
        service.failing.store(true, Ordering::SeqCst);
        service
    }

    /// Agent ids penalized so far, in call order.
    pub async fn penalized(&self) -> Vec<String> {
        self.penalized.lock().await.clone()
    }

    /// Count of recorded penalties.
    pub async fn penalty_count(&self) -> usize {
        self.penalized.lock().await.len()
    }
}

impl Default for MockReputation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReputationService for MockReputation {
    fn name(&self) -> &str {
        "mock-reputation"
    }

    async fn penalize_sla(&self, agent_id: &str) -> Result<(), LeadflowError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadflowError::Reputation {
                message: "mock reputation set to fail".to_string(),
                source: None,
            });
        }
        self.penalized.lock().await.push(agent_id.to_string());
        Ok(())
    }
}
