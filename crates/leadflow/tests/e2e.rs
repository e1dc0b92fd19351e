// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete routing and escalation cycle.
//!
//! Each test creates an isolated temp SQLite database with mock notification
//! and reputation adapters. Tests are independent and order-insensitive.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use leadflow_config::model::{EscalationConfig, RoutingConfig};
use leadflow_core::types::{AssignmentStatus, ContactPreference, NotificationKind, Tier};
use leadflow_escalation::EscalationWorker;
use leadflow_router::{LeadIntake, LeadRouter, RouteOptions};
use leadflow_storage::queries::{agents, assignments, leads};
use leadflow_storage::Database;
use leadflow_test_utils::{fixtures, MockNotifier, MockReputation};

struct Stack {
    db: Arc<Database>,
    intake: LeadIntake,
    router: Arc<LeadRouter>,
    worker: EscalationWorker,
    notifier: Arc<MockNotifier>,
    reputation: Arc<MockReputation>,
    _dir: tempfile::TempDir,
}

async fn stack(policy: RoutingConfig) -> Stack {
    let (db, dir) = fixtures::setup_db().await;
    let db = Arc::new(db);
    let notifier = Arc::new(MockNotifier::new());
    let reputation = Arc::new(MockReputation::new());
    let router = Arc::new(LeadRouter::new(db.clone(), notifier.clone(), policy.clone()));
    let worker = EscalationWorker::new(
        db.clone(),
        router.clone(),
        notifier.clone(),
        reputation.clone(),
        policy,
        EscalationConfig::default(),
    );
    let intake = LeadIntake::new(db.clone(), router.clone());
    Stack {
        db,
        intake,
        router,
        worker,
        notifier,
        reputation,
        _dir: dir,
    }
}

fn new_lead(buyer: &str, property: &str) -> leads::NewLead {
    leads::NewLead {
        buyer_id: buyer.to_string(),
        property_id: property.to_string(),
        contact_preference: ContactPreference::Email,
        message: "Interested in a viewing this week".to_string(),
        property_area: None,
    }
}

/// Full cycle with limit_external=3, limit_internal=3, sla_minutes=5:
/// three External expiries force Internal; three Internal expiries force
/// OnCall; an OnCall acceptance ends the cycle.
#[tokio::test]
async fn full_escalation_cycle_through_all_tiers() {
    let s = stack(RoutingConfig {
        limit_external: 3,
        limit_internal: 3,
        sla_minutes: 5,
    })
    .await;

    for id in ["ext-a", "ext-b", "ext-c"] {
        fixtures::seed_agent(&s.db, id, Tier::External).await;
    }
    for id in ["int-d", "int-e", "int-f"] {
        fixtures::seed_agent(&s.db, id, Tier::Internal).await;
    }
    fixtures::seed_agent(&s.db, "call-g", Tier::OnCall).await;

    let t0 = fixtures::fixed_now();
    let outcome = s
        .intake
        .register_interest_at(new_lead("buyer-1", "prop-1"), t0)
        .await
        .unwrap();
    let lead_id = outcome.lead.id.clone();
    assert!(outcome.routing.unwrap().success());

    // Six consecutive SLA misses walk External a/b/c then Internal d/e/f.
    let mut on_call_total = 0;
    for round in 1..=6 {
        let now = t0 + Duration::minutes(6 * round);
        let summary = s.worker.run_at(now).await.unwrap();
        assert_eq!(summary.processed, 1, "round {round}");
        assert_eq!(summary.reassigned, 1, "round {round}");
        assert_eq!(summary.errors, 0, "round {round}");
        on_call_total += summary.routed_to_on_call;
    }
    assert_eq!(on_call_total, 1, "only the final hop lands on call");

    let history = assignments::history_for_lead(&s.db, &lead_id).await.unwrap();
    let agents_seen: Vec<&str> = history.iter().map(|a| a.agent_id.as_str()).collect();
    assert_eq!(
        agents_seen,
        vec!["ext-a", "ext-b", "ext-c", "int-d", "int-e", "int-f", "call-g"]
    );
    let tiers: Vec<Tier> = history.iter().map(|a| a.tier).collect();
    assert_eq!(
        tiers,
        vec![
            Tier::External,
            Tier::External,
            Tier::External,
            Tier::Internal,
            Tier::Internal,
            Tier::Internal,
            Tier::OnCall
        ]
    );

    // Invariants: no agent appears twice; at most one assignment is active.
    let unique: HashSet<&str> = agents_seen.iter().copied().collect();
    assert_eq!(unique.len(), agents_seen.len());
    let active: Vec<_> = history
        .iter()
        .filter(|a| a.status == AssignmentStatus::Assigned)
        .collect();
    assert_eq!(active.len(), 1);

    // The on-call agent accepts before the deadline; the cycle ends.
    let final_assignment = active[0];
    assert!(assignments::accept(&s.db, &final_assignment.id).await.unwrap());
    let summary = s.worker.run_at(t0 + Duration::minutes(60)).await.unwrap();
    assert_eq!(summary.processed, 0, "accepted assignment stops the engine");

    let accepted = assignments::get(&s.db, &final_assignment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(accepted.status, AssignmentStatus::Accepted);

    // Six losers were penalized, in order.
    assert_eq!(
        s.reputation.penalized().await,
        vec!["ext-a", "ext-b", "ext-c", "int-d", "int-e", "int-f"]
    );

    // 7 assignment notifications + 6 SLA-missed notifications.
    assert_eq!(
        s.notifier
            .sent_of_kind(NotificationKind::LeadAssigned)
            .await
            .len(),
        7
    );
    assert_eq!(
        s.notifier.sent_of_kind(NotificationKind::SlaMissed).await.len(),
        6
    );

    s.db.close().await.unwrap();
}

/// Candidate pool exhausted: OnCall resolved but every OnCall agent inactive.
#[tokio::test]
async fn exhausted_on_call_pool_leaves_lead_unrouted() {
    let s = stack(RoutingConfig::default()).await;

    fixtures::seed_agent_with(&s.db, "call-off", Tier::OnCall, false, None, None).await;
    let lead = fixtures::seed_lead(&s.db, "buyer-1", "prop-1", None).await;

    let outcome = s
        .router
        .route_at(
            &lead.id,
            &[],
            RouteOptions {
                force_tier: Some(Tier::OnCall),
                reassignment_of: None,
            },
            fixtures::fixed_now(),
        )
        .await
        .unwrap();

    assert!(!outcome.success());
    assert_eq!(outcome.reason(), "no eligible agent in terminal tier");
    let active = assignments::active_for_lead(&s.db, &lead.id).await.unwrap();
    assert!(active.is_none());

    s.db.close().await.unwrap();
}

/// Intake idempotence: two registrations for one (buyer, property) pair
/// produce exactly one lead and exactly one initial assignment.
#[tokio::test]
async fn duplicate_interest_registration_is_idempotent() {
    let s = stack(RoutingConfig::default()).await;
    fixtures::seed_agent(&s.db, "ext-a", Tier::External).await;
    fixtures::seed_agent(&s.db, "ext-b", Tier::External).await;

    let t0 = fixtures::fixed_now();
    let first = s
        .intake
        .register_interest_at(new_lead("buyer-1", "prop-1"), t0)
        .await
        .unwrap();
    let second = s
        .intake
        .register_interest_at(new_lead("buyer-1", "prop-1"), t0 + Duration::minutes(2))
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.lead.id, second.lead.id);

    let history = assignments::history_for_lead(&s.db, &first.lead.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1, "exactly one initial assignment");
    assert_eq!(s.notifier.sent_count().await, 1);

    s.db.close().await.unwrap();
}

/// A deactivated agent drops out of selection on the next hop.
#[tokio::test]
async fn deactivated_agent_is_skipped_on_reroute() {
    let s = stack(RoutingConfig {
        limit_external: 3,
        limit_internal: 3,
        sla_minutes: 5,
    })
    .await;
    fixtures::seed_agent(&s.db, "ext-a", Tier::External).await;
    fixtures::seed_agent(&s.db, "ext-b", Tier::External).await;
    fixtures::seed_agent(&s.db, "ext-c", Tier::External).await;

    let t0 = fixtures::fixed_now();
    let outcome = s
        .intake
        .register_interest_at(new_lead("buyer-1", "prop-1"), t0)
        .await
        .unwrap();
    let lead_id = outcome.lead.id.clone();

    // ext-b goes on leave before the first expiry.
    agents::set_active(&s.db, "ext-b", false).await.unwrap();

    let summary = s.worker.run_at(t0 + Duration::minutes(6)).await.unwrap();
    assert_eq!(summary.reassigned, 1);

    let history = assignments::history_for_lead(&s.db, &lead_id).await.unwrap();
    assert_eq!(history[1].agent_id, "ext-c", "inactive agent is skipped");

    s.db.close().await.unwrap();
}
