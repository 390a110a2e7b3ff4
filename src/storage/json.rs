//! JSON file store.
//!
//! Layout under the root directory:
//! - `players/<id>.json`: one pretty-printed snapshot per player
//! - `teams/<id>.json`: one snapshot per team
//! - `settlements.jsonl`: append-only settlement records

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use super::{SettlementRecord, SettlementStore};
use crate::core::types::{PlayerSnapshot, TeamSnapshot};
use crate::error::StoreError;
use crate::utils::persistence::{append_json_line, data_dir, load_json_optional, save_json_file};

pub struct JsonStore {
    root: PathBuf,
    // Serializes appends to the record log
    log_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_lock: Mutex::new(()),
        }
    }

    /// Opens the store in ~/.offline-settle/.
    pub fn open_default() -> io::Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn player_path(&self, player_id: Uuid) -> PathBuf {
        self.root.join("players").join(format!("{}.json", player_id))
    }

    fn team_path(&self, team_id: Uuid) -> PathBuf {
        self.root.join("teams").join(format!("{}.json", team_id))
    }

    fn log_path(&self) -> PathBuf {
        self.root.join("settlements.jsonl")
    }

    pub fn save_team(&self, team: &TeamSnapshot) -> Result<(), StoreError> {
        save_json_file(&self.team_path(team.id), team)?;
        Ok(())
    }
}

impl SettlementStore for JsonStore {
    fn get_player(&self, player_id: Uuid) -> Result<Option<PlayerSnapshot>, StoreError> {
        Ok(load_json_optional(&self.player_path(player_id))?)
    }

    fn get_team(&self, team_id: Uuid) -> Result<Option<TeamSnapshot>, StoreError> {
        Ok(load_json_optional(&self.team_path(team_id))?)
    }

    fn save_player(&self, snapshot: &PlayerSnapshot) -> Result<(), StoreError> {
        save_json_file(&self.player_path(snapshot.id), snapshot)?;
        Ok(())
    }

    fn save_settlement_record(&self, record: &SettlementRecord) -> Result<(), StoreError> {
        let _guard = self
            .log_lock
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        append_json_line(&self.log_path(), record)?;
        Ok(())
    }
}
