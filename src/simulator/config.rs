//! Balance simulation configuration.

use crate::core::config::CombatParams;
use crate::core::constants::MAX_OFFLINE_HOURS;
use crate::core::types::{Activity, Profession};

/// Configuration for a batch of offline settlement runs.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of settlements to simulate
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Offline hours per run (clamped to the settlement window)
    pub hours: f64,

    /// Player level at disconnect
    pub level: u32,

    pub profession: Profession,

    pub activity: Activity,

    pub combat: CombatParams,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per run)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 1000,
            seed: None,
            hours: 8.0,
            level: 10,
            profession: Profession::Warrior,
            activity: Activity::Combat,
            combat: CombatParams::default(),
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Full 24 hour window for one level
    pub fn full_window(level: u32) -> Self {
        Self {
            num_runs: 200,
            hours: 24.0,
            level,
            ..Default::default()
        }
    }

    /// Quick config for comparing activities
    pub fn activity_comparison(activity: Activity, hours: f64) -> Self {
        Self {
            num_runs: 100,
            hours,
            activity,
            ..Default::default()
        }
    }

    /// Hours actually simulated: `hours` limited to the settlement window.
    pub fn effective_hours(&self) -> f64 {
        self.hours.clamp(0.0, MAX_OFFLINE_HOURS)
    }
}
