// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the engine's external collaborators.
//!
//! Both collaborators are best-effort from the engine's point of view: their
//! failures are logged and never affect assignment state. All traits use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod notify;
pub mod reputation;

pub use notify::NotificationChannel;
pub use reputation::ReputationService;
