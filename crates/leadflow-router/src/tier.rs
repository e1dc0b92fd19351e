// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier resolution: which escalation class receives the next assignment.

use leadflow_config::model::RoutingConfig;
use leadflow_core::types::Tier;

/// Resolve the target tier for a lead's next assignment from its ordered
/// assignment history.
///
/// External is attempted exhaustively first, but the moment any Internal
/// attempt exists the engine commits to Internal/OnCall progression and never
/// returns to External. OnCall is the terminal safety net with no attempt
/// limit.
///
/// Counts are recomputed from history on every call instead of being carried
/// as denormalized counters; histories are bounded by
/// `limit_external + limit_internal + 1`.
pub fn resolve_tier(history: &[Tier], policy: &RoutingConfig) -> Tier {
    let external_attempts = history.iter().filter(|t| **t == Tier::External).count() as u32;
    let internal_attempts = history.iter().filter(|t| **t == Tier::Internal).count() as u32;

    if external_attempts < policy.limit_external && internal_attempts == 0 {
        Tier::External
    } else if internal_attempts < policy.limit_internal {
        Tier::Internal
    } else {
        Tier::OnCall
    }
}
