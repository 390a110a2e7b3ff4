//! Error types for storage and settlement.

use thiserror::Error;
use uuid::Uuid;

/// Failures reported by a [`crate::storage::SettlementStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned: {0}")]
    Poisoned(String),
}

/// Typed settlement failures surfaced to callers.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("Player not found: {0}")]
    PlayerNotFound(Uuid),

    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    #[error("Team {0} has no resolvable members")]
    NoValidMembers(Uuid),

    #[error("Player {0} was last active in the future; nothing to settle")]
    AlreadyCurrent(Uuid),

    #[error("Player {0} appears more than once in the batch")]
    DuplicateInBatch(Uuid),

    #[error("Team {team_id} partially settled ({} members applied): {source}", .applied.len())]
    PartiallyApplied {
        team_id: Uuid,
        /// Members whose snapshot and record were written before the failure
        applied: Vec<Uuid>,
        #[source]
        source: Box<SettlementError>,
    },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Settlement task failed: {0}")]
    Internal(String),
}

impl SettlementError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SettlementError::PlayerNotFound(_) | SettlementError::TeamNotFound(_)
        )
    }
}
