// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database fixtures: temp-file databases and seeded leads/agents.

use chrono::{DateTime, TimeZone, Utc};
use leadflow_core::types::{Agent, ContactPreference, Lead, Tier};
use leadflow_storage::queries::{agents, leads};
use leadflow_storage::Database;

/// Open a fresh database in a temp directory.
///
/// The `TempDir` must be kept alive for the lifetime of the database.
pub async fn setup_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("leadflow-test.db");
    let db = Database::open(db_path.to_str().expect("utf-8 path"))
        .await
        .expect("open test database");
    (db, dir)
}

/// A fixed instant for deterministic SLA arithmetic in tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// Seed a lead for `buyer` and `property`, optionally area-constrained.
pub async fn seed_lead(
    db: &Database,
    buyer: &str,
    property: &str,
    property_area: Option<&str>,
) -> Lead {
    let (lead, created) = leads::upsert_lead(
        db,
        leads::NewLead {
            buyer_id: buyer.to_string(),
            property_id: property.to_string(),
            contact_preference: ContactPreference::Either,
            message: String::new(),
            property_area: property_area.map(str::to_string),
        },
        fixed_now(),
    )
    .await
    .expect("seed lead");
    assert!(created, "seed_lead expects a fresh (buyer, property) pair");
    lead
}

/// Seed an active, unconstrained agent.
pub async fn seed_agent(db: &Database, id: &str, tier: Tier) -> Agent {
    seed_agent_with(db, id, tier, true, None, None).await
}

/// Seed an agent with explicit activity, area, and fairness state.
pub async fn seed_agent_with(
    db: &Database,
    id: &str,
    tier: Tier,
    active: bool,
    service_area: Option<&str>,
    last_assigned_at: Option<&str>,
) -> Agent {
    let agent = Agent {
        id: id.to_string(),
        name: format!("Agent {id}"),
        tier,
        active,
        email: format!("{id}@example.com"),
        phone: None,
        service_area: service_area.map(str::to_string),
        last_assigned_at: last_assigned_at.map(str::to_string),
    };
    agents::insert_agent(db, &agent).await.expect("seed agent");
    agent
}
