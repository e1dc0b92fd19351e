// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing orchestration: resolve tier, select candidate, create assignment,
//! notify.
//!
//! Used both on lead creation (empty exclusion set, tier computed from the
//! empty history) and by the escalation worker (forced tier, accumulated
//! exclusion set). The assignment row is the source of truth; notification is
//! best-effort and never rolls it back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_config::model::RoutingConfig;
use leadflow_core::types::{NotificationKind, NotificationMessage, Tier};
use leadflow_core::{LeadflowError, NotificationChannel};
use leadflow_storage::queries::{assignments, leads};
use leadflow_storage::Database;
use tracing::{debug, info, warn};

use crate::selector::CandidateSelector;
use crate::tier::resolve_tier;

/// Options for a single routing call.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Target this tier instead of resolving from history. Set by the
    /// escalation worker, which has already resolved the next tier.
    pub force_tier: Option<Tier>,

    /// Id of the expired assignment this call replaces, recorded in the new
    /// row's outcome metadata.
    pub reassignment_of: Option<String>,
}

/// Result of a routing call.
#[derive(Debug)]
pub enum RouteOutcome {
    /// An assignment was created and the agent notified.
    Routed {
        assignment: leadflow_core::Assignment,
    },
    /// The pool minus exclusions was empty. The lead is left without an
    /// active assignment, pending manual follow-up.
    NoEligibleAgent { tier: Tier },
}

impl RouteOutcome {
    /// Whether the call produced an assignment.
    pub fn success(&self) -> bool {
        matches!(self, RouteOutcome::Routed { .. })
    }

    /// Human-readable reason, for logs and batch summaries.
    pub fn reason(&self) -> &'static str {
        match self {
            RouteOutcome::Routed { .. } => "routed",
            RouteOutcome::NoEligibleAgent { .. } => "no eligible agent in terminal tier",
        }
    }
}

/// Assigns leads to agents.
pub struct LeadRouter {
    db: Arc<Database>,
    notifier: Arc<dyn NotificationChannel>,
    selector: CandidateSelector,
    policy: RoutingConfig,
}

impl LeadRouter {
    /// Router with the default candidate selector.
    pub fn new(
        db: Arc<Database>,
        notifier: Arc<dyn NotificationChannel>,
        policy: RoutingConfig,
    ) -> Self {
        Self::with_selector(db, notifier, policy, CandidateSelector::new())
    }

    /// Router with an explicit selector (custom filter chain).
    pub fn with_selector(
        db: Arc<Database>,
        notifier: Arc<dyn NotificationChannel>,
        policy: RoutingConfig,
        selector: CandidateSelector,
    ) -> Self {
        Self {
            db,
            notifier,
            selector,
            policy,
        }
    }

    /// Route a lead to one agent.
    pub async fn route(
        &self,
        lead_id: &str,
        excluded: &[String],
        options: RouteOptions,
    ) -> Result<RouteOutcome, LeadflowError> {
        self.route_at(lead_id, excluded, options, Utc::now()).await
    }

    /// Route with an explicit clock, for deterministic tests.
    pub async fn route_at(
        &self,
        lead_id: &str,
        excluded: &[String],
        options: RouteOptions,
        now: DateTime<Utc>,
    ) -> Result<RouteOutcome, LeadflowError> {
        let lead = leads::get_lead(&self.db, lead_id)
            .await?
            .ok_or_else(|| LeadflowError::LeadNotFound(lead_id.to_string()))?;

        let tier = match options.force_tier {
            Some(tier) => tier,
            None => {
                let history = assignments::history_for_lead(&self.db, lead_id).await?;
                let tiers: Vec<Tier> = history.iter().map(|a| a.tier).collect();
                resolve_tier(&tiers, &self.policy)
            }
        };

        let Some(agent) = self.selector.select(&self.db, &lead, tier, excluded).await? else {
            warn!(lead_id, %tier, "no eligible agent -- lead left without active assignment");
            return Ok(RouteOutcome::NoEligibleAgent { tier });
        };

        let outcome = options.reassignment_of.as_ref().map(|prev| {
            serde_json::json!({
                "reason": "sla_expired",
                "reassigned_from": prev,
            })
            .to_string()
        });

        let created = assignments::create(
            &self.db,
            assignments::NewAssignment {
                lead_id: lead.id.clone(),
                agent_id: agent.id.clone(),
                tier,
                outcome,
            },
            now,
            self.policy.sla_minutes,
        )
        .await?;

        let assignment = match created {
            assignments::CreateOutcome::Created(assignment) => assignment,
            assignments::CreateOutcome::ActiveExists => {
                return Err(LeadflowError::ActiveAssignmentExists {
                    lead_id: lead.id.clone(),
                });
            }
            assignments::CreateOutcome::AgentRepeated => {
                // The exclusion set is derived from history; reaching this
                // means the caller passed a stale one.
                return Err(LeadflowError::Internal(format!(
                    "agent {} already attempted for lead {}",
                    agent.id, lead.id
                )));
            }
        };

        let message = NotificationMessage {
            kind: NotificationKind::LeadAssigned,
            lead_id: lead.id.clone(),
            property_id: lead.property_id.clone(),
            assignment_id: assignment.id.clone(),
            expires_at: Some(assignment.expires_at.clone()),
            note: (!lead.message.is_empty()).then(|| lead.message.clone()),
        };
        match self.notifier.notify(&agent, &message).await {
            Ok(message_id) => {
                debug!(message_id = %message_id.0, agent_id = %agent.id, "assignment notification sent");
            }
            Err(e) => {
                warn!(error = %e, agent_id = %agent.id, "assignment notification failed");
            }
        }

        info!(
            lead_id = %lead.id,
            agent_id = %agent.id,
            assignment_id = %assignment.id,
            %tier,
            expires_at = %assignment.expires_at,
            "lead routed"
        );
        Ok(RouteOutcome::Routed { assignment })
    }
}
