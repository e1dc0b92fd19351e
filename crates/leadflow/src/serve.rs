// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow serve` command implementation.
//!
//! Opens storage, wires the router and escalation worker to the configured
//! notification/reputation adapters, and runs the escalation scheduler until
//! interrupted.

use std::sync::Arc;
use std::time::Duration;

use leadflow_config::model::LeadflowConfig;
use leadflow_core::LeadflowError;
use leadflow_escalation::{EscalationScheduler, EscalationWorker};
use leadflow_router::LeadRouter;
use leadflow_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::adapters;

/// Runs the `leadflow serve` command.
pub async fn run_serve(config: LeadflowConfig) -> Result<(), LeadflowError> {
    info!(name = %config.engine.name, "starting leadflow serve");

    let db = Arc::new(
        Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?,
    );

    let notifier = adapters::build_notifier(&config)?;
    let reputation = adapters::build_reputation(&config)?;

    let router = Arc::new(LeadRouter::new(
        db.clone(),
        notifier.clone(),
        config.routing.clone(),
    ));
    let worker = Arc::new(EscalationWorker::new(
        db.clone(),
        router,
        notifier,
        reputation,
        config.routing.clone(),
        config.escalation.clone(),
    ));
    let scheduler = EscalationScheduler::new(
        worker,
        Duration::from_secs(config.escalation.interval_secs),
    );

    // Graceful shutdown on Ctrl-C.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                return;
            }
            info!("shutdown signal received");
            cancel.cancel();
        });
    }

    scheduler.run(cancel).await;

    db.close().await?;
    info!("leadflow serve stopped");
    Ok(())
}
