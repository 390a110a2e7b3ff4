//! In-memory store for tests and batch tooling.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{SettlementRecord, SettlementStore};
use crate::core::types::{PlayerSnapshot, TeamSnapshot};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<Uuid, PlayerSnapshot>>,
    teams: RwLock<HashMap<Uuid, TeamSnapshot>>,
    records: Mutex<Vec<SettlementRecord>>,
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(err.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_player(&self, snapshot: PlayerSnapshot) -> Result<(), StoreError> {
        self.players
            .write()
            .map_err(poisoned)?
            .insert(snapshot.id, snapshot);
        Ok(())
    }

    pub fn insert_team(&self, team: TeamSnapshot) -> Result<(), StoreError> {
        self.teams.write().map_err(poisoned)?.insert(team.id, team);
        Ok(())
    }

    /// All records written so far, oldest first.
    pub fn records(&self) -> Result<Vec<SettlementRecord>, StoreError> {
        Ok(self.records.lock().map_err(poisoned)?.clone())
    }

    pub fn player_count(&self) -> Result<usize, StoreError> {
        Ok(self.players.read().map_err(poisoned)?.len())
    }
}

impl SettlementStore for MemoryStore {
    fn get_player(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, StoreError> {
        Ok(self.players.read().map_err(poisoned)?.get(&player_id).cloned())
    }

    fn get_team(&self, team_id: Uuid) -> Result<Option<TeamSnapshot>, StoreError> {
        Ok(self.teams.read().map_err(poisoned)?.get(&team_id).cloned())
    }

    fn save_player(&self, snapshot: &PlayerSnapshot) -> Result<(), StoreError> {
        self.insert_player(snapshot.clone())
    }

    fn save_settlement_record(&self, record: &SettlementRecord) -> Result<(), StoreError> {
        self.records.lock().map_err(poisoned)?.push(record.clone());
        Ok(())
    }
}
