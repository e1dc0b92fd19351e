// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadflow integration tests.
//!
//! Provides mock adapters and database fixtures for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockNotifier`] - Notification channel that captures messages and can fail on demand
//! - [`MockReputation`] - Reputation service that records penalized agents
//! - [`fixtures`] - Temp-file databases and seeded leads/agents

pub mod fixtures;
pub mod mock_notify;
pub mod mock_reputation;

pub use mock_notify::MockNotifier;
pub use mock_reputation::MockReputation;
