//! Closed-form throughput simulators for non-combat activities.

use crate::core::constants::*;
use crate::core::types::{RewardCategory, RewardEntry};

/// A fixed-rate activity: `floor(hours * rate)` actions, each worth a fixed reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateActivity {
    pub category: RewardCategory,
    pub label: &'static str,
    pub actions_per_hour: f64,
    pub xp_per_action: u64,
    pub gold_per_action: u64,
}

impl RateActivity {
    pub const GATHERING: RateActivity = RateActivity {
        category: RewardCategory::Gathering,
        label: "gathering runs",
        actions_per_hour: GATHERING_ACTIONS_PER_HOUR,
        xp_per_action: GATHERING_XP_PER_ACTION,
        gold_per_action: GATHERING_GOLD_PER_ACTION,
    };

    pub const CRAFTING: RateActivity = RateActivity {
        category: RewardCategory::Crafting,
        label: "items crafted",
        actions_per_hour: CRAFTING_ACTIONS_PER_HOUR,
        xp_per_action: CRAFTING_XP_PER_ACTION,
        gold_per_action: CRAFTING_GOLD_PER_ACTION,
    };

    pub fn actions(&self, hours: f64) -> u64 {
        (hours.max(0.0) * self.actions_per_hour).floor() as u64
    }

    pub fn simulate(&self, hours: f64) -> RewardEntry {
        let actions = self.actions(hours);
        RewardEntry::new(
            self.category,
            format!("{} {} over {:.1}h", actions, self.label, hours.max(0.0)),
            actions * self.xp_per_action,
            actions * self.gold_per_action,
        )
        .with_aux("actions", actions)
    }
}

/// Idle accrues half the combat experience baseline and the full gold baseline.
pub fn simulate_idle(hours: f64) -> RewardEntry {
    let hours = hours.max(0.0);
    let experience = (hours * BASE_XP_PER_HOUR * IDLE_XP_FACTOR).floor() as u64;
    let gold = (hours * BASE_GOLD_PER_HOUR).floor() as u64;
    RewardEntry::new(
        RewardCategory::Idle,
        format!("Rested for {:.1}h", hours),
        experience,
        gold,
    )
}
