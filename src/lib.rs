//! Offline progression settlement for an idle game.
//!
//! When a player reconnects, the time since they were last active is turned
//! into experience, gold and a battle log for whatever they were doing. Teams
//! whose members were away for similar stretches fight together for a bonus.
//!
//! The entry point is [`SettlementService`]; everything it drives is public
//! for balance tooling and tests.

pub mod core;
pub mod error;
pub mod settlement;
pub mod simulator;
pub mod storage;
pub mod team;
pub mod utils;

pub use crate::core::{EngineConfig, OfflineWindow, PlayerSnapshot, SettlementResult, TeamSnapshot};
pub use error::{SettlementError, StoreError};
pub use settlement::{BatchItem, BatchSettlement, SettlementService, TeamSettlement};
pub use storage::{JsonStore, MemoryStore, SettlementRecord, SettlementStore};
