// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SLA escalation for the Leadflow routing engine.
//!
//! [`worker::EscalationWorker`] expires overdue assignments and re-routes
//! their leads through the tier progression; [`scheduler::EscalationScheduler`]
//! invokes it on a fixed interval with graceful shutdown.

pub mod scheduler;
pub mod worker;

pub use scheduler::EscalationScheduler;
pub use worker::{EscalationSummary, EscalationWorker};
