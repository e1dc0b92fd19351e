// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The escalation worker: expire overdue assignments and re-route their leads.
//!
//! Each invocation claims a batch of overdue `assigned` rows under a lease
//! (skip-locked emulation, see `leadflow-storage::queries::assignments`),
//! then processes them one at a time so one lead's failure never touches the
//! rest of the batch. Per item: a short expiry transaction commits first,
//! best-effort side effects (SLA-missed notification, reputation penalty) run
//! outside it, and the re-route happens in a new transaction with the tier
//! recomputed from the full history.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_config::model::{EscalationConfig, RoutingConfig};
use leadflow_core::types::{
    Assignment, NotificationKind, NotificationMessage, Tier,
};
use leadflow_core::{LeadflowError, NotificationChannel, ReputationService};
use leadflow_router::{resolve_tier, LeadRouter, RouteOptions, RouteOutcome};
use leadflow_storage::queries::{agents, assignments, leads};
use leadflow_storage::Database;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Per-batch outcome counts, returned to the external scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscalationSummary {
    /// Expired assignments this invocation handled.
    pub processed: u64,
    /// Items whose lead received a new assignment.
    pub reassigned: u64,
    /// Subset of `reassigned` that landed in the OnCall tier.
    pub routed_to_on_call: u64,
    /// Items whose lead was left without an active assignment
    /// (candidate pool exhausted -- manual follow-up required).
    pub unrouted: u64,
    /// Items that hit a transient error and were skipped.
    pub errors: u64,
}

impl fmt::Display for EscalationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} reassigned={} routed_to_on_call={} unrouted={} errors={}",
            self.processed, self.reassigned, self.routed_to_on_call, self.unrouted, self.errors
        )
    }
}

enum ItemOutcome {
    Reassigned { tier: Tier },
    Unrouted,
}

/// Periodically invoked processor for assignments whose SLA has elapsed.
pub struct EscalationWorker {
    db: Arc<Database>,
    router: Arc<LeadRouter>,
    notifier: Arc<dyn NotificationChannel>,
    reputation: Arc<dyn ReputationService>,
    policy: RoutingConfig,
    escalation: EscalationConfig,
    /// Lease owner id; unique per worker instance so concurrent invocations
    /// never expire each other's claimed rows.
    worker_id: String,
}

impl EscalationWorker {
    pub fn new(
        db: Arc<Database>,
        router: Arc<LeadRouter>,
        notifier: Arc<dyn NotificationChannel>,
        reputation: Arc<dyn ReputationService>,
        policy: RoutingConfig,
        escalation: EscalationConfig,
    ) -> Self {
        Self {
            db,
            router,
            notifier,
            reputation,
            policy,
            escalation,
            worker_id: format!("escalation-{}", Uuid::new_v4()),
        }
    }

    /// Run one escalation batch against the current clock.
    pub async fn run_once(&self) -> Result<EscalationSummary, LeadflowError> {
        self.run_at(Utc::now()).await
    }

    /// Run one escalation batch with an explicit clock, for deterministic tests.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<EscalationSummary, LeadflowError> {
        let claimed = assignments::claim_expired(
            &self.db,
            &self.worker_id,
            now,
            self.escalation.lease_secs,
            self.escalation.batch_limit,
        )
        .await?;

        let mut summary = EscalationSummary::default();
        for assignment in claimed {
            let assignment_id = assignment.id.clone();
            let lead_id = assignment.lead_id.clone();
            match self.process_item(assignment, now).await {
                Ok(Some(ItemOutcome::Reassigned { tier })) => {
                    summary.processed += 1;
                    summary.reassigned += 1;
                    if tier == Tier::OnCall {
                        summary.routed_to_on_call += 1;
                    }
                }
                Ok(Some(ItemOutcome::Unrouted)) => {
                    summary.processed += 1;
                    summary.unrouted += 1;
                }
                Ok(None) => {
                    // Lost the expiry race to another invocation.
                    debug!(assignment_id = %assignment_id, "already handled elsewhere -- skipping");
                }
                Err(e) => {
                    summary.processed += 1;
                    summary.errors += 1;
                    error!(
                        error = %e,
                        assignment_id = %assignment_id,
                        lead_id = %lead_id,
                        "escalation item failed -- continuing with batch"
                    );
                }
            }
        }

        if summary.processed > 0 {
            info!(%summary, "escalation batch complete");
        }
        Ok(summary)
    }

    /// Handle one claimed assignment. `Ok(None)` means the expiry guard
    /// matched nothing and the item belongs to someone else.
    async fn process_item(
        &self,
        assignment: Assignment,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemOutcome>, LeadflowError> {
        // Short transaction: flip to expired and commit, releasing the row
        // before any slower I/O below.
        if !assignments::mark_expired(&self.db, &assignment.id, &self.worker_id, now).await? {
            return Ok(None);
        }
        info!(
            assignment_id = %assignment.id,
            lead_id = %assignment.lead_id,
            agent_id = %assignment.agent_id,
            expired_at = %assignment.expires_at,
            "assignment expired"
        );

        self.notify_sla_missed(&assignment).await;
        if let Err(e) = self.reputation.penalize_sla(&assignment.agent_id).await {
            warn!(error = %e, agent_id = %assignment.agent_id, "reputation penalty failed");
        }

        // Recompute the full history: tier counts and the exclusion set both
        // come from it, never from cached state.
        let history = assignments::history_for_lead(&self.db, &assignment.lead_id).await?;
        let tiers: Vec<Tier> = history.iter().map(|a| a.tier).collect();
        let next_tier = resolve_tier(&tiers, &self.policy);
        let excluded: Vec<String> = history.iter().map(|a| a.agent_id.clone()).collect();

        let outcome = self
            .router
            .route_at(
                &assignment.lead_id,
                &excluded,
                RouteOptions {
                    force_tier: Some(next_tier),
                    reassignment_of: Some(assignment.id.clone()),
                },
                now,
            )
            .await?;

        match outcome {
            RouteOutcome::Routed { assignment: next } => {
                Ok(Some(ItemOutcome::Reassigned { tier: next.tier }))
            }
            RouteOutcome::NoEligibleAgent { tier } => {
                warn!(
                    lead_id = %assignment.lead_id,
                    %tier,
                    "candidate pool exhausted -- lead requires manual follow-up"
                );
                Ok(Some(ItemOutcome::Unrouted))
            }
        }
    }

    /// Best-effort "you missed the SLA" message to the losing agent.
    async fn notify_sla_missed(&self, assignment: &Assignment) {
        let agent = match agents::get_agent(&self.db, &assignment.agent_id).await {
            Ok(Some(agent)) => agent,
            Ok(None) => {
                warn!(agent_id = %assignment.agent_id, "agent missing -- skipping SLA-missed notification");
                return;
            }
            Err(e) => {
                warn!(error = %e, agent_id = %assignment.agent_id, "agent lookup failed -- skipping SLA-missed notification");
                return;
            }
        };

        let property_id = match leads::get_lead(&self.db, &assignment.lead_id).await {
            Ok(Some(lead)) => lead.property_id,
            _ => String::new(),
        };
        let message = NotificationMessage {
            kind: NotificationKind::SlaMissed,
            lead_id: assignment.lead_id.clone(),
            property_id,
            assignment_id: assignment.id.clone(),
            expires_at: Some(assignment.expires_at.clone()),
            note: None,
        };
        if let Err(e) = self.notifier.notify(&agent, &message).await {
            warn!(error = %e, agent_id = %agent.id, "SLA-missed notification failed");
        }
    }
}
