//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use super::constants::*;
use crate::utils::persistence::{load_json_file, save_json_file};

/// Tunables for the progressive combat loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatParams {
    /// Battles per hour before the fatigue penalty
    pub battles_per_hour: f64,

    /// Difficulty at wave 1 with no fatigue
    pub initial_difficulty: f64,

    /// Battle ceiling per session, on top of the hour clock
    pub max_battles: u32,
}

impl Default for CombatParams {
    fn default() -> Self {
        Self {
            battles_per_hour: BASE_BATTLES_PER_HOUR,
            initial_difficulty: BASE_DIFFICULTY,
            max_battles: MAX_BATTLES_PER_SESSION,
        }
    }
}

/// Configuration for a settlement engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum offline window that will be settled
    pub max_offline_hours: f64,

    /// Elapsed time below this settles to an empty result
    pub min_settle_seconds: i64,

    pub combat: CombatParams,

    /// Random seed for reproducibility (None = entropy per call)
    pub seed: Option<u64>,

    /// Yield to the async runtime after this many hour blocks (0 = never)
    pub yield_every_blocks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_offline_hours: MAX_OFFLINE_HOURS,
            min_settle_seconds: MIN_SETTLE_SECONDS,
            combat: CombatParams::default(),
            seed: None,
            yield_every_blocks: 1,
        }
    }
}

impl EngineConfig {
    /// Default config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Small battle cap for fast tests
    pub fn quick_test(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            combat: CombatParams {
                max_battles: 500,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn max_offline_seconds(&self) -> i64 {
        (self.max_offline_hours.max(0.0) * SECONDS_PER_HOUR) as i64
    }

    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> io::Result<Self> {
        load_json_file(path)
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        save_json_file(path, self)
    }
}
