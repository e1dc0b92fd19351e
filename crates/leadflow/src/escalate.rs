// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow escalate` command implementation.
//!
//! One-shot escalation batch for external schedulers (cron, systemd timers):
//! claims overdue assignments, expires and re-routes them, prints the summary.

use std::sync::Arc;

use leadflow_config::model::LeadflowConfig;
use leadflow_core::LeadflowError;
use leadflow_escalation::EscalationWorker;
use leadflow_router::LeadRouter;
use leadflow_storage::Database;
use tracing::info;

use crate::adapters;

/// Runs the `leadflow escalate` command.
pub async fn run_escalate(config: LeadflowConfig) -> Result<(), LeadflowError> {
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
    let worker = EscalationWorker::new(
        db.clone(),
        router,
        notifier,
        reputation,
        config.routing.clone(),
        config.escalation.clone(),
    );

    let summary = worker.run_once().await?;
    info!(%summary, "escalation batch finished");
    println!("{summary}");

    db.close().await?;
    Ok(())
}
