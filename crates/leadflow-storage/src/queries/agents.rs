// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent pool operations.
//!
//! The eligible-pool query is the fairness half of candidate selection: it
//! orders by least-recently-assigned (never-assigned agents first) with a
//! stable agent-id tie-break, so selection is deterministic for a given state.

use leadflow_core::types::{Agent, Tier};
use leadflow_core::LeadflowError;
use rusqlite::params;

use crate::database::Database;

/// Insert a new agent.
pub async fn insert_agent(db: &Database, agent: &Agent) -> Result<(), LeadflowError> {
    let agent = agent.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO agents (id, name, tier, active, email, phone, service_area,
                                     last_assigned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    agent.id,
                    agent.name,
                    agent.tier.to_string(),
                    agent.active,
                    agent.email,
                    agent.phone,
                    agent.service_area,
                    agent.last_assigned_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an agent by ID.
pub async fn get_agent(db: &Database, id: &str) -> Result<Option<Agent>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, tier, active, email, phone, service_area, last_assigned_at
                 FROM agents WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], agent_from_row);
            match result {
                Ok(agent) => Ok(Some(agent)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Activate or deactivate an agent.
pub async fn set_active(db: &Database, id: &str, active: bool) -> Result<(), LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE agents SET active = ?1 WHERE id = ?2",
                params![active, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The pool of candidates in one tier: active, not previously attempted for
/// this lead, ordered least-recently-assigned first (never-assigned before
/// all), ties broken by agent id.
pub async fn eligible_in_tier(
    db: &Database,
    tier: Tier,
    excluded: Vec<String>,
) -> Result<Vec<Agent>, LeadflowError> {
    db.connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT id, name, tier, active, email, phone, service_area, last_assigned_at
                 FROM agents WHERE tier = ? AND active = 1",
            );
            if !excluded.is_empty() {
                sql.push_str(" AND id NOT IN (");
                sql.push_str(&vec!["?"; excluded.len()].join(", "));
                sql.push(')');
            }
            sql.push_str(
                " ORDER BY last_assigned_at IS NOT NULL, last_assigned_at ASC, id ASC",
            );

            let mut bindings: Vec<String> = Vec::with_capacity(1 + excluded.len());
            bindings.push(tier.to_string());
            bindings.extend(excluded);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(bindings), agent_from_row)?;
            let mut agents = Vec::new();
            for row in rows {
                agents.push(row?);
            }
            Ok(agents)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn agent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Agent> {
    let tier: String = row.get(2)?;
    Ok(Agent {
        id: row.get(0)?,
        name: row.get(1)?,
        tier: tier.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        active: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        service_area: row.get(6)?,
        last_assigned_at: row.get(7)?,
    })
}
