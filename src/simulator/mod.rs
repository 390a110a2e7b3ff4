//! Offline activity simulators.
//!
//! - `rate`: closed-form gathering, crafting and idle throughput
//! - `battle`: single battle resolution
//! - `combat`: the hour-stepped progressive combat session
//! - `activity`: strategy selection and the single-player pipeline
//!
//! `runner` and `report` drive the pipeline in bulk for balance analysis.

pub mod activity;
pub mod battle;
pub mod combat;
mod config;
pub mod rate;
mod report;
mod runner;

pub use activity::{select_strategy, simulate_offline, simulate_offline_yielding};
pub use battle::Combatant;
pub use combat::{simulate_combat, CombatRun, CombatSession, ProgressiveCombat};
pub use config::SimConfig;
pub use report::{RunStats, SimReport};
pub use runner::run_simulation;
