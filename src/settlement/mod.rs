//! Player, team and batch settlement.

mod service;
pub mod summary;

pub use service::SettlementService;

use serde::Serialize;
use uuid::Uuid;

use crate::core::types::SettlementResult;
use crate::error::SettlementError;
use crate::team::{CooperativePlan, TeamBonusRates, TeamSyncInfo};

/// Outcome of settling one team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSettlement {
    pub team_id: Uuid,
    pub sync: TeamSyncInfo,
    pub plan: CooperativePlan,
    pub bonus_rates: TeamBonusRates,
    /// One result per resolvable member, in team order
    pub results: Vec<SettlementResult>,
}

impl TeamSettlement {
    pub fn total_experience(&self) -> u64 {
        self.results.iter().map(|r| r.total_experience).sum()
    }

    pub fn total_gold(&self) -> u64 {
        self.results.iter().map(|r| r.total_gold).sum()
    }

    pub fn result_for(&self, player_id: Uuid) -> Option<&SettlementResult> {
        self.results.iter().find(|r| r.player_id == player_id)
    }
}

#[derive(Debug)]
pub struct BatchItem {
    pub player_id: Uuid,
    pub outcome: Result<SettlementResult, SettlementError>,
}

/// Per-player outcomes of a batch, in input order.
#[derive(Debug)]
pub struct BatchSettlement {
    pub items: Vec<BatchItem>,
    pub success_count: usize,
    pub error_count: usize,
}

impl BatchSettlement {
    pub fn from_items(items: Vec<BatchItem>) -> Self {
        let success_count = items.iter().filter(|item| item.outcome.is_ok()).count();
        let error_count = items.len() - success_count;
        Self {
            items,
            success_count,
            error_count,
        }
    }

    pub fn get(&self, player_id: Uuid) -> Option<&Result<SettlementResult, SettlementError>> {
        self.items
            .iter()
            .find(|item| item.player_id == player_id)
            .map(|item| &item.outcome)
    }
}
