// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead routing for the Leadflow engine.
//!
//! Three layers, leaf first: [`tier::resolve_tier`] is the pure tier-policy
//! decision, [`selector::CandidateSelector`] picks one agent within a tier,
//! and [`router::LeadRouter`] orchestrates both into an assignment plus a
//! best-effort notification. [`intake::LeadIntake`] is the entry point for
//! newly registered buyer interest.

pub mod intake;
pub mod router;
pub mod selector;
pub mod tier;

pub use intake::{IntakeOutcome, LeadIntake};
pub use router::{LeadRouter, RouteOptions, RouteOutcome};
pub use selector::{CandidateFilter, CandidateSelector, ServiceAreaFilter};
pub use tier::resolve_tier;
