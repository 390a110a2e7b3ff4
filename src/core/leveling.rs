//! Applies a settlement to a player snapshot.
//!
//! This is the only place a [`PlayerSnapshot`] is mutated.

use chrono::{DateTime, Utc};

use super::constants::*;
use super::types::{PlayerSnapshot, SettlementResult};

/// Level implied by a cumulative experience total.
pub fn level_for_experience(experience: u64) -> u32 {
    let level = experience / XP_PER_LEVEL + 1;
    level.min(u32::MAX as u64).max(1) as u32
}

/// Adds the result's experience and gold to the snapshot, recomputes level and
/// stamps `last_active_at` so the same window cannot be settled twice.
///
/// Levels never go down. Each gained level adds max health and the player is
/// healed to full.
pub fn apply_settlement(
    snapshot: &mut PlayerSnapshot,
    mut result: SettlementResult,
    now: DateTime<Utc>,
) -> SettlementResult {
    let level_before = snapshot.level;

    snapshot.experience = snapshot.experience.saturating_add(result.total_experience);
    snapshot.gold = snapshot.gold.saturating_add(result.total_gold);

    let level_after = level_for_experience(snapshot.experience).max(level_before);
    if level_after > level_before {
        let delta = level_after - level_before;
        snapshot.level = level_after;
        snapshot.max_health = snapshot
            .max_health
            .saturating_add(delta.saturating_mul(MAX_HEALTH_PER_LEVEL));
        snapshot.health = snapshot.max_health;
    }
    snapshot.last_active_at = now;

    result.level_before = level_before;
    result.level_after = snapshot.level;
    result
}
