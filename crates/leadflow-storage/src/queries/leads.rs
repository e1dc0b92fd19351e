// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead CRUD operations.
//!
//! A lead is unique per `(buyer_id, property_id)`. Repeat interest updates the
//! existing row in place; the caller decides whether routing happens based on
//! the `created` flag returned by [`upsert_lead`].

use chrono::{DateTime, Utc};
use leadflow_core::types::{format_timestamp, ContactPreference, Lead};
use leadflow_core::LeadflowError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;

/// Input for registering buyer interest.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub buyer_id: String,
    pub property_id: String,
    pub contact_preference: ContactPreference,
    pub message: String,
    pub property_area: Option<String>,
}

/// Insert a new lead, or update the existing one for the same
/// `(buyer_id, property_id)` pair.
///
/// Returns the stored lead and `true` when a new row was created. A repeat
/// registration refreshes `message`, `contact_preference`, and `updated_at`
/// only — it never resets routing state.
pub async fn upsert_lead(
    db: &Database,
    new: NewLead,
    now: DateTime<Utc>,
) -> Result<(Lead, bool), LeadflowError> {
    let id = Uuid::new_v4().to_string();
    let now_s = format_timestamp(now);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(
                    "SELECT id, buyer_id, property_id, contact_preference, message,
                            property_area, created_at, updated_at
                     FROM leads WHERE buyer_id = ?1 AND property_id = ?2",
                )?;
                let result =
                    stmt.query_row(params![new.buyer_id, new.property_id], lead_from_row);
                match result {
                    Ok(lead) => Some(lead),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            match existing {
                Some(mut lead) => {
                    tx.execute(
                        "UPDATE leads SET contact_preference = ?1, message = ?2, updated_at = ?3
                         WHERE id = ?4",
                        params![
                            new.contact_preference.to_string(),
                            new.message,
                            now_s,
                            lead.id
                        ],
                    )?;
                    tx.commit()?;
                    lead.contact_preference = new.contact_preference;
                    lead.message = new.message;
                    lead.updated_at = now_s;
                    Ok((lead, false))
                }
                None => {
                    tx.execute(
                        "INSERT INTO leads (id, buyer_id, property_id, contact_preference,
                                            message, property_area, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            id,
                            new.buyer_id,
                            new.property_id,
                            new.contact_preference.to_string(),
                            new.message,
                            new.property_area,
                            now_s,
                            now_s
                        ],
                    )?;
                    tx.commit()?;
                    Ok((
                        Lead {
                            id,
                            buyer_id: new.buyer_id,
                            property_id: new.property_id,
                            contact_preference: new.contact_preference,
                            message: new.message,
                            property_area: new.property_area,
                            created_at: now_s.clone(),
                            updated_at: now_s,
                        },
                        true,
                    ))
                }
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a lead by ID.
pub async fn get_lead(db: &Database, id: &str) -> Result<Option<Lead>, LeadflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, buyer_id, property_id, contact_preference, message,
                        property_area, created_at, updated_at
                 FROM leads WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], lead_from_row);
            match result {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let preference: String = row.get(3)?;
    Ok(Lead {
        id: row.get(0)?,
        buyer_id: row.get(1)?,
        property_id: row.get(2)?,
        contact_preference: preference.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        message: row.get(4)?,
        property_area: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
