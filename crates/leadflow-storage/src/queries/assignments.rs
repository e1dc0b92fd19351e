// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment history operations.
//!
//! Assignments for a lead are an append-only, ordered history. Two invariants
//! are enforced here, inside the creation transaction and again by schema
//! indexes: at most one `assigned` row per lead, and no agent appearing twice
//! in one lead's history.
//!
//! Expiry claiming emulates skip-locked row acquisition with a lease
//! (`lease_owner` + `lease_until`): a claim CAS-updates unleased overdue rows,
//! so concurrent worker invocations skip each other's rows instead of
//! blocking, and a crashed invocation's rows become claimable again once the
//! lease lapses.

use chrono::{DateTime, Duration, Utc};
use leadflow_core::types::{format_timestamp, Assignment, AssignmentStatus, Tier};
use leadflow_core::LeadflowError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;

/// Input for creating an assignment.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub lead_id: String,
    pub agent_id: String,
    pub tier: Tier,
    /// Initial outcome metadata (e.g. reassignment reason), as JSON.
    pub outcome: Option<String>,
}

/// Result of an attempted assignment creation.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Assignment),
    /// The lead already has an `assigned` row.
    ActiveExists,
    /// The agent already appears in this lead's history.
    AgentRepeated,
}

/// Create an `assigned` row and stamp the agent's `last_assigned_at`, in one
/// transaction that re-checks both history invariants.
pub async fn create(
    db: &Database,
    new: NewAssignment,
    now: DateTime<Utc>,
    sla_minutes: i64,
) -> Result<CreateOutcome, LeadflowError> {
    let id = Uuid::new_v4().to_string();
    let assigned_at = format_timestamp(now);
    let expires_at = format_timestamp(now + Duration::minutes(sla_minutes));
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let active: i64 = tx.query_row(
                "SELECT COUNT(*) FROM assignments WHERE lead_id = ?1 AND status = 'assigned'",
                params![new.lead_id],
                |row| row.get(0),
            )?;
            if active > 0 {
                return Ok(CreateOutcome::ActiveExists);
            }

            let repeated: i64 = tx.query_row(
                "SELECT COUNT(*) FROM assignments WHERE lead_id = ?1 AND agent_id = ?2",
                params![new.lead_id, new.agent_id],
                |row| row.get(0),
            )?;
            if repeated > 0 {
                return Ok(CreateOutcome::AgentRepeated);
            }

            tx.execute(
                "INSERT INTO assignments (id, lead_id, agent_id, tier, status, assigned_at,
                                          expires_at, outcome)
                 VALUES (?1, ?2, ?3, ?4, 'assigned', ?5, ?6, ?7)",
                params![
                    id,
                    new.lead_id,
                    new.agent_id,
                    new.tier.to_string(),
                    assigned_at,
                    expires_at,
                    new.outcome,
                ],
            )?;
            tx.execute(
                "UPDATE agents SET last_assigned_at = ?1 WHERE id = ?2",
                params![assigned_at, new.agent_id],
            )?;
            tx.commit()?;

            Ok(CreateOutcome::Created(Assignment {
                id,
                lead_id: new.lead_id,
                agent_id: new.agent_id,
                tier: new.tier,
                status: AssignmentStatus::Assigned,
                assigned_at,
                expires_at,
                outcome: new.outcome,
                lease_owner: None,
                lease_until: None,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an assignment by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<Assignment>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&select_sql("WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], assignment_from_row);
            match result {
                Ok(assignment) => Ok(Some(assignment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The full ordered history for a lead, oldest first.
pub async fn history_for_lead(
    db: &Database,
    lead_id: &str,
) -> Result<Vec<Assignment>, LeadflowError> {
    let lead_id = lead_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&select_sql("WHERE lead_id = ?1 ORDER BY assigned_at ASC, id ASC"))?;
            let rows = stmt.query_map(params![lead_id], assignment_from_row)?;
            let mut history = Vec::new();
            for row in rows {
                history.push(row?);
            }
            Ok(history)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The lead's current `assigned` row, if any.
pub async fn active_for_lead(
    db: &Database,
    lead_id: &str,
) -> Result<Option<Assignment>, LeadflowError> {
    let lead_id = lead_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&select_sql("WHERE lead_id = ?1 AND status = 'assigned'"))?;
            let result = stmt.query_row(params![lead_id], assignment_from_row);
            match result {
                Ok(assignment) => Ok(Some(assignment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim up to `limit` overdue assignments for this worker invocation.
///
/// A row is claimable when it is still `assigned`, its `expires_at` has
/// passed, and no live lease is held on it. Claimed rows get this worker's
/// lease so concurrent invocations skip them.
pub async fn claim_expired(
    db: &Database,
    worker_id: &str,
    now: DateTime<Utc>,
    lease_secs: i64,
    limit: u32,
) -> Result<Vec<Assignment>, LeadflowError> {
    let worker_id = worker_id.to_string();
    let now_s = format_timestamp(now);
    let lease_until = format_timestamp(now + Duration::seconds(lease_secs));
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut claimed = {
                let mut stmt = tx.prepare(&select_sql(
                    "WHERE status = 'assigned' AND expires_at <= ?1
                       AND (lease_until IS NULL OR lease_until <= ?1)
                     ORDER BY expires_at ASC, id ASC LIMIT ?2",
                ))?;
                let rows = stmt.query_map(params![now_s, limit], assignment_from_row)?;
                let mut claimed = Vec::new();
                for row in rows {
                    claimed.push(row?);
                }
                claimed
            };

            for assignment in &mut claimed {
                tx.execute(
                    "UPDATE assignments SET lease_owner = ?1, lease_until = ?2 WHERE id = ?3",
                    params![worker_id, lease_until, assignment.id],
                )?;
                assignment.lease_owner = Some(worker_id.clone());
                assignment.lease_until = Some(lease_until.clone());
            }
            tx.commit()?;
            Ok(claimed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition a claimed assignment to `expired`, recording the expiry
/// timestamp in its outcome metadata.
///
/// Guarded by `status = 'assigned' AND lease_owner = worker_id`, so exactly
/// one invocation wins the transition. Returns `false` when the guard matched
/// nothing (already handled elsewhere).
pub async fn mark_expired(
    db: &Database,
    id: &str,
    worker_id: &str,
    now: DateTime<Utc>,
) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    let worker_id = worker_id.to_string();
    let now_s = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = {
                let result = tx.query_row(
                    "SELECT outcome FROM assignments WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                );
                match result {
                    Ok(outcome) => outcome,
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            let mut outcome: serde_json::Value = existing
                .as_deref()
                .and_then(|s| serde_json::from_str(s).ok())
                .filter(serde_json::Value::is_object)
                .unwrap_or_else(|| serde_json::json!({}));
            outcome["expired_at"] = serde_json::Value::String(now_s.clone());

            let changed = tx.execute(
                "UPDATE assignments SET status = 'expired', outcome = ?1,
                        lease_owner = NULL, lease_until = NULL
                 WHERE id = ?2 AND status = 'assigned' AND lease_owner = ?3",
                params![outcome.to_string(), id, worker_id],
            )?;
            tx.commit()?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Transition an assignment to `accepted` (the agent responded in time).
///
/// Returns `false` when the assignment was no longer `assigned` — the SLA
/// clock had already run out and the worker won the race.
pub async fn accept(db: &Database, id: &str) -> Result<bool, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE assignments SET status = 'accepted',
                        lease_owner = NULL, lease_until = NULL
                 WHERE id = ?1 AND status = 'assigned'",
                params![id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn select_sql(suffix: &str) -> String {
    format!(
        "SELECT id, lead_id, agent_id, tier, status, assigned_at, expires_at, outcome,
                lease_owner, lease_until
         FROM assignments {suffix}"
    )
}

fn assignment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assignment> {
    let tier: String = row.get(3)?;
    let status: String = row.get(4)?;
    Ok(Assignment {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        agent_id: row.get(2)?,
        tier: tier.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        status: status.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        assigned_at: row.get(5)?,
        expires_at: row.get(6)?,
        outcome: row.get(7)?,
        lease_owner: row.get(8)?,
        lease_until: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{agents, leads};
    use chrono::TimeZone;
    use leadflow_core::types::{Agent, ContactPreference};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    async fn seed_lead(db: &Database) -> String {
        let (lead, _) = leads::upsert_lead(
            db,
            leads::NewLead {
                buyer_id: "buyer-1".to_string(),
                property_id: "prop-1".to_string(),
                contact_preference: ContactPreference::Either,
                message: String::new(),
                property_area: None,
            },
            t0(),
        )
        .await
        .unwrap();
        lead.id
    }

    async fn seed_agent(db: &Database, id: &str, tier: Tier) {
        agents::insert_agent(
            db,
            &Agent {
                id: id.to_string(),
                name: format!("Agent {id}"),
                tier,
                active: true,
                email: format!("{id}@example.com"),
                phone: None,
                service_area: None,
                last_assigned_at: None,
            },
        )
        .await
        .unwrap();
    }

    fn new_assignment(lead_id: &str, agent_id: &str) -> NewAssignment {
        NewAssignment {
            lead_id: lead_id.to_string(),
            agent_id: agent_id.to_string(),
            tier: Tier::External,
            outcome: None,
        }
    }

    #[tokio::test]
    async fn create_sets_sla_deadline_and_touches_agent() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;

        let outcome = create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap();
        let assignment = match outcome {
            CreateOutcome::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };
        assert_eq!(assignment.status, AssignmentStatus::Assigned);
        assert_eq!(assignment.assigned_at, "2026-03-01T09:00:00.000Z");
        assert_eq!(assignment.expires_at, "2026-03-01T09:05:00.000Z");

        let agent = agents::get_agent(&db, "a-1").await.unwrap().unwrap();
        assert_eq!(
            agent.last_assigned_at.as_deref(),
            Some("2026-03-01T09:00:00.000Z")
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_active_assignment_is_rejected() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;
        seed_agent(&db, "a-2", Tier::External).await;

        let first = create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap();
        assert!(matches!(first, CreateOutcome::Created(_)));

        let second = create(&db, new_assignment(&lead_id, "a-2"), t0(), 5)
            .await
            .unwrap();
        assert!(matches!(second, CreateOutcome::ActiveExists));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn agent_reuse_across_history_is_rejected() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;

        let first = match create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap()
        {
            CreateOutcome::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        // Expire the first attempt, then try to hand the same agent the lead again.
        claim_expired(&db, "w-1", t0() + Duration::minutes(10), 60, 10)
            .await
            .unwrap();
        assert!(mark_expired(&db, &first.id, "w-1", t0() + Duration::minutes(10))
            .await
            .unwrap());

        let again = create(
            &db,
            new_assignment(&lead_id, "a-1"),
            t0() + Duration::minutes(10),
            5,
        )
        .await
        .unwrap();
        assert!(matches!(again, CreateOutcome::AgentRepeated));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_picks_only_overdue_unleased_rows() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;

        create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap();

        // Not yet overdue.
        let claimed = claim_expired(&db, "w-1", t0() + Duration::minutes(4), 60, 10)
            .await
            .unwrap();
        assert!(claimed.is_empty());

        // Overdue at five minutes (deadline inclusive).
        let claimed = claim_expired(&db, "w-1", t0() + Duration::minutes(5), 60, 10)
            .await
            .unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].lease_owner.as_deref(), Some("w-1"));

        // A second invocation inside the lease window skips the claimed row.
        let second = claim_expired(&db, "w-2", t0() + Duration::minutes(5), 60, 10)
            .await
            .unwrap();
        assert!(second.is_empty(), "leased row must be skipped, not re-claimed");

        // After the lease lapses the row is claimable again (crash recovery).
        let third = claim_expired(&db, "w-2", t0() + Duration::minutes(7), 60, 10)
            .await
            .unwrap();
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].lease_owner.as_deref(), Some("w-2"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_expired_requires_matching_lease_owner() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;

        let assignment = match create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap()
        {
            CreateOutcome::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        let later = t0() + Duration::minutes(6);
        claim_expired(&db, "w-1", later, 60, 10).await.unwrap();

        // The wrong worker cannot expire the row.
        assert!(!mark_expired(&db, &assignment.id, "w-2", later).await.unwrap());
        // The claiming worker can, exactly once.
        assert!(mark_expired(&db, &assignment.id, "w-1", later).await.unwrap());
        assert!(!mark_expired(&db, &assignment.id, "w-1", later).await.unwrap());

        let expired = get(&db, &assignment.id).await.unwrap().unwrap();
        assert_eq!(expired.status, AssignmentStatus::Expired);
        assert!(expired.lease_owner.is_none());
        let outcome: serde_json::Value =
            serde_json::from_str(expired.outcome.as_deref().unwrap()).unwrap();
        assert_eq!(outcome["expired_at"], "2026-03-01T09:06:00.000Z");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn accept_stops_the_clock_once() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;

        let assignment = match create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap()
        {
            CreateOutcome::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };

        assert!(accept(&db, &assignment.id).await.unwrap());
        assert!(!accept(&db, &assignment.id).await.unwrap());

        // An accepted assignment is never claimable.
        let claimed = claim_expired(&db, "w-1", t0() + Duration::minutes(10), 60, 10)
            .await
            .unwrap();
        assert!(claimed.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn history_is_ordered_oldest_first() {
        let (db, _dir) = setup_db().await;
        let lead_id = seed_lead(&db).await;
        seed_agent(&db, "a-1", Tier::External).await;
        seed_agent(&db, "a-2", Tier::External).await;

        let first = match create(&db, new_assignment(&lead_id, "a-1"), t0(), 5)
            .await
            .unwrap()
        {
            CreateOutcome::Created(a) => a,
            other => panic!("expected Created, got {other:?}"),
        };
        let later = t0() + Duration::minutes(6);
        claim_expired(&db, "w-1", later, 60, 10).await.unwrap();
        mark_expired(&db, &first.id, "w-1", later).await.unwrap();
        create(&db, new_assignment(&lead_id, "a-2"), later, 5)
            .await
            .unwrap();

        let history = history_for_lead(&db, &lead_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].agent_id, "a-1");
        assert_eq!(history[1].agent_id, "a-2");

        let active = active_for_lead(&db, &lead_id).await.unwrap().unwrap();
        assert_eq!(active.agent_id, "a-2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_respects_batch_limit() {
        let (db, _dir) = setup_db().await;

        // Three leads, each with an overdue assignment.
        for i in 1..=3 {
            let (lead, _) = leads::upsert_lead(
                &db,
                leads::NewLead {
                    buyer_id: format!("buyer-{i}"),
                    property_id: "prop-1".to_string(),
                    contact_preference: ContactPreference::Either,
                    message: String::new(),
                    property_area: None,
                },
                t0(),
            )
            .await
            .unwrap();
            seed_agent(&db, &format!("a-{i}"), Tier::External).await;
            create(&db, new_assignment(&lead.id, &format!("a-{i}")), t0(), 5)
                .await
                .unwrap();
        }

        let later = t0() + Duration::minutes(6);
        let claimed = claim_expired(&db, "w-1", later, 60, 2).await.unwrap();
        assert_eq!(claimed.len(), 2, "batch limit caps the claim");
        let rest = claim_expired(&db, "w-2", later, 60, 2).await.unwrap();
        assert_eq!(rest.len(), 1, "remaining row goes to the next invocation");

        db.close().await.unwrap();
    }
}
