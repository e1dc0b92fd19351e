// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead intake: the boundary between interest capture and routing.
//!
//! The capture surface (web form, API) is out of scope; this module owns the
//! contract it must honor: one routing call per genuinely new lead, and none
//! on a repeat registration for the same `(buyer, property)` pair.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadflow_core::types::Lead;
use leadflow_core::LeadflowError;
use leadflow_storage::queries::leads::{self, NewLead};
use leadflow_storage::Database;
use tracing::{debug, info};

use crate::router::{LeadRouter, RouteOptions, RouteOutcome};

/// Result of an interest registration.
#[derive(Debug)]
pub struct IntakeOutcome {
    pub lead: Lead,
    /// Whether a new lead row was created.
    pub created: bool,
    /// The routing result; `None` on a repeat registration.
    pub routing: Option<RouteOutcome>,
}

/// Registers buyer interest and triggers the initial routing cycle.
pub struct LeadIntake {
    db: Arc<Database>,
    router: Arc<LeadRouter>,
}

impl LeadIntake {
    pub fn new(db: Arc<Database>, router: Arc<LeadRouter>) -> Self {
        Self { db, router }
    }

    /// Register a buyer's interest in a property.
    pub async fn register_interest(&self, new: NewLead) -> Result<IntakeOutcome, LeadflowError> {
        self.register_interest_at(new, Utc::now()).await
    }

    /// Register with an explicit clock, for deterministic tests.
    pub async fn register_interest_at(
        &self,
        new: NewLead,
        now: DateTime<Utc>,
    ) -> Result<IntakeOutcome, LeadflowError> {
        let (lead, created) = leads::upsert_lead(&self.db, new, now).await?;

        if !created {
            debug!(
                lead_id = %lead.id,
                buyer_id = %lead.buyer_id,
                property_id = %lead.property_id,
                "repeat interest -- lead updated in place, no routing"
            );
            return Ok(IntakeOutcome {
                lead,
                created: false,
                routing: None,
            });
        }

        info!(lead_id = %lead.id, property_id = %lead.property_id, "new lead registered");
        let routing = self
            .router
            .route_at(&lead.id, &[], RouteOptions::default(), now)
            .await?;

        Ok(IntakeOutcome {
            lead,
            created: true,
            routing: Some(routing),
        })
    }
}
