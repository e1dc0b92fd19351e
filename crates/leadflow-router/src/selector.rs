// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Candidate selection within a resolved tier.
//!
//! Fairness matters more than speed here: the storage query orders the pool
//! least-recently-assigned first (never-assigned agents before all, agent id
//! as the stable tie-break) and the selector takes the first agent that every
//! filter accepts. Eligibility rules beyond tier/active/exclusion are
//! pluggable [`CandidateFilter`]s so the selection strategy can be extended
//! without touching the resolver or the escalation worker.

use leadflow_core::types::{Agent, Lead, Tier};
use leadflow_core::LeadflowError;
use leadflow_storage::queries::agents;
use leadflow_storage::Database;
use tracing::debug;

/// An eligibility rule applied to the ordered candidate pool.
pub trait CandidateFilter: Send + Sync {
    /// Returns the human-readable name of this filter (for logs).
    fn name(&self) -> &str;

    /// Whether `agent` may receive `lead`.
    fn eligible(&self, lead: &Lead, agent: &Agent) -> bool;
}

/// Matches an agent's service area against the lead's property area.
///
/// Passes when either side is unconstrained. This is a stand-in for fuller
/// geographic matching policy; swap it out via
/// [`CandidateSelector::with_filters`].
pub struct ServiceAreaFilter;

impl CandidateFilter for ServiceAreaFilter {
    fn name(&self) -> &str {
        "service-area"
    }

    fn eligible(&self, lead: &Lead, agent: &Agent) -> bool {
        match (&lead.property_area, &agent.service_area) {
            (Some(property), Some(service)) => property == service,
            _ => true,
        }
    }
}

/// Picks one agent within a tier, or reports that none is eligible.
pub struct CandidateSelector {
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl CandidateSelector {
    /// Selector with the default filter chain.
    pub fn new() -> Self {
        Self::with_filters(vec![Box::new(ServiceAreaFilter)])
    }

    /// Selector with an explicit filter chain (may be empty).
    pub fn with_filters(filters: Vec<Box<dyn CandidateFilter>>) -> Self {
        Self { filters }
    }

    /// Select the least-recently-assigned eligible agent in `tier`, excluding
    /// agents already attempted for this lead.
    ///
    /// `Ok(None)` is the "no eligible agent" signal: a normal business
    /// outcome, not an error.
    pub async fn select(
        &self,
        db: &Database,
        lead: &Lead,
        tier: Tier,
        excluded: &[String],
    ) -> Result<Option<Agent>, LeadflowError> {
        let pool = agents::eligible_in_tier(db, tier, excluded.to_vec()).await?;
        let picked = pool.into_iter().find(|agent| {
            self.filters.iter().all(|filter| {
                let ok = filter.eligible(lead, agent);
                if !ok {
                    debug!(
                        agent_id = %agent.id,
                        filter = filter.name(),
                        "candidate rejected"
                    );
                }
                ok
            })
        });
        Ok(picked)
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_test_utils::fixtures;

    #[tokio::test]
    async fn picks_least_recently_assigned_eligible_agent() {
        let (db, _dir) = fixtures::setup_db().await;
        let lead = fixtures::seed_lead(&db, "buyer-1", "prop-1", None).await;

        fixtures::seed_agent_with(
            &db,
            "a-recent",
            Tier::External,
            true,
            None,
            Some("2026-03-01T10:00:00.000Z"),
        )
        .await;
        fixtures::seed_agent_with(
            &db,
            "a-stale",
            Tier::External,
            true,
            None,
            Some("2026-03-01T08:00:00.000Z"),
        )
        .await;

        let selector = CandidateSelector::new();
        let picked = selector
            .select(&db, &lead, Tier::External, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.id, "a-stale");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn exclusion_set_removes_attempted_agents() {
        let (db, _dir) = fixtures::setup_db().await;
        let lead = fixtures::seed_lead(&db, "buyer-1", "prop-1", None).await;
        fixtures::seed_agent(&db, "a-1", Tier::External).await;
        fixtures::seed_agent(&db, "a-2", Tier::External).await;

        let selector = CandidateSelector::new();
        let picked = selector
            .select(&db, &lead, Tier::External, &["a-1".to_string()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.id, "a-2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn service_area_filter_skips_mismatched_agents() {
        let (db, _dir) = fixtures::setup_db().await;
        let lead = fixtures::seed_lead(&db, "buyer-1", "prop-1", Some("north")).await;

        // First in LRA order, but covers the wrong area.
        fixtures::seed_agent_with(&db, "a-south", Tier::External, true, Some("south"), None).await;
        fixtures::seed_agent_with(
            &db,
            "a-north",
            Tier::External,
            true,
            Some("north"),
            Some("2026-03-01T10:00:00.000Z"),
        )
        .await;
        // Unconstrained agents always pass the area filter.
        fixtures::seed_agent_with(
            &db,
            "a-anywhere",
            Tier::External,
            true,
            None,
            Some("2026-03-01T11:00:00.000Z"),
        )
        .await;

        let selector = CandidateSelector::new();
        let picked = selector
            .select(&db, &lead, Tier::External, &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(picked.id, "a-north");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_pool_reports_no_eligible_agent() {
        let (db, _dir) = fixtures::setup_db().await;
        let lead = fixtures::seed_lead(&db, "buyer-1", "prop-1", None).await;
        fixtures::seed_agent_with(&db, "a-off", Tier::OnCall, false, None, None).await;

        let selector = CandidateSelector::new();
        let picked = selector.select(&db, &lead, Tier::OnCall, &[]).await.unwrap();
        assert!(picked.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn custom_filter_chain_replaces_default() {
        struct RejectAll;
        impl CandidateFilter for RejectAll {
            fn name(&self) -> &str {
                "reject-all"
            }
            fn eligible(&self, _lead: &Lead, _agent: &Agent) -> bool {
                false
            }
        }

        let (db, _dir) = fixtures::setup_db().await;
        let lead = fixtures::seed_lead(&db, "buyer-1", "prop-1", None).await;
        fixtures::seed_agent(&db, "a-1", Tier::External).await;

        let selector = CandidateSelector::with_filters(vec![Box::new(RejectAll)]);
        let picked = selector
            .select(&db, &lead, Tier::External, &[])
            .await
            .unwrap();
        assert!(picked.is_none());

        db.close().await.unwrap();
    }
}
