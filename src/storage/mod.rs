//! Storage collaborator interface.
//!
//! The engine never owns player state. Callers read snapshots through a
//! [`SettlementStore`], hand copies to the simulators, and write the mutated
//! copies and an audit record back.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{PlayerSnapshot, SettlementResult, TeamSnapshot};
use crate::error::StoreError;

/// Audit trail entry for one applied settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: Uuid,
    pub player_id: Uuid,
    /// Set when the settlement was part of a team settlement
    pub team_id: Option<Uuid>,
    pub settled_at: DateTime<Utc>,
    pub result: SettlementResult,
}

impl SettlementRecord {
    pub fn new(result: &SettlementResult, team_id: Option<Uuid>, settled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id: result.player_id,
            team_id,
            settled_at,
            result: result.clone(),
        }
    }
}

/// Persistence for players, teams and settlement records.
pub trait SettlementStore: Send + Sync {
    fn get_player(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, StoreError>;

    fn get_team(&self, team_id: Uuid) -> Result<Option<TeamSnapshot>, StoreError>;

    fn save_player(&self, snapshot: &PlayerSnapshot) -> Result<(), StoreError>;

    fn save_settlement_record(&self, record: &SettlementRecord) -> Result<(), StoreError>;
}
