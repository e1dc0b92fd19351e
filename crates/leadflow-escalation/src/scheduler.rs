// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-interval scheduling for the escalation worker.
//!
//! The worker itself is invocation-agnostic; this wrapper is the in-process
//! trigger used by `leadflow serve`. An external scheduler (cron, systemd
//! timer) can instead call `leadflow escalate` for one-shot batches.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::worker::EscalationWorker;

/// Runs an [`EscalationWorker`] on a fixed interval until cancelled.
pub struct EscalationScheduler {
    worker: Arc<EscalationWorker>,
    interval: Duration,
}

impl EscalationScheduler {
    pub fn new(worker: Arc<EscalationWorker>, interval: Duration) -> Self {
        Self { worker, interval }
    }

    /// Tick until `cancel` fires. Batch failures are logged and the loop
    /// continues; overdue rows stay claimable for the next tick.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "escalation scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("escalation scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.worker.run_once().await {
                        Ok(summary) if summary.processed > 0 => {
                            info!(%summary, "escalation tick");
                        }
                        Ok(_) => {
                            debug!("escalation tick: nothing overdue");
                        }
                        Err(e) => {
                            error!(error = %e, "escalation batch failed -- will retry next tick");
                        }
                    }
                }
            }
        }
    }
}
