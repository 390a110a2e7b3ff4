//! Core settlement records, configuration and leveling.

pub mod config;
pub mod constants;
pub mod leveling;
pub mod types;
pub mod window;

pub use config::{CombatParams, EngineConfig};
pub use leveling::{apply_settlement, level_for_experience};
pub use types::*;
pub use window::OfflineWindow;
