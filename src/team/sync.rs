//! Team synchronization analysis.
//!
//! Measures how closely team members' offline windows line up and classifies
//! the team into a cooperation mode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CooperationMode {
    Individual,
    LowSync,
    MediumSync,
    HighSync,
}

impl CooperationMode {
    pub fn from_sync_rate(sync_rate: f64) -> Self {
        if sync_rate >= HIGH_SYNC_THRESHOLD {
            CooperationMode::HighSync
        } else if sync_rate >= MEDIUM_SYNC_THRESHOLD {
            CooperationMode::MediumSync
        } else if sync_rate >= LOW_SYNC_THRESHOLD {
            CooperationMode::LowSync
        } else {
            CooperationMode::Individual
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CooperationMode::Individual => "Individual",
            CooperationMode::LowSync => "Low Sync",
            CooperationMode::MediumSync => "Medium Sync",
            CooperationMode::HighSync => "High Sync",
        }
    }

    pub fn is_cooperative(&self) -> bool {
        matches!(self, CooperationMode::HighSync | CooperationMode::MediumSync)
    }
}

/// Dispersion statistics over members' clamped offline durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSyncInfo {
    pub member_offline_seconds: BTreeMap<Uuid, i64>,
    pub mean_seconds: f64,
    pub min_seconds: i64,
    pub max_seconds: i64,
    /// Population standard deviation, in hours
    pub std_dev_hours: f64,
    /// 1.0 = identical offline windows
    pub sync_rate: f64,
    pub mode: CooperationMode,
}

impl TeamSyncInfo {
    pub fn team_size(&self) -> usize {
        self.member_offline_seconds.len()
    }

    pub fn mean_hours(&self) -> f64 {
        self.mean_seconds / SECONDS_PER_HOUR
    }
}

/// Analyzes members' offline durations (already clamped to the window).
pub fn analyze_team_sync(durations: &[(Uuid, i64)]) -> TeamSyncInfo {
    let member_offline_seconds: BTreeMap<Uuid, i64> = durations
        .iter()
        .map(|(id, secs)| (*id, (*secs).max(0)))
        .collect();

    if member_offline_seconds.is_empty() {
        return TeamSyncInfo {
            member_offline_seconds,
            mean_seconds: 0.0,
            min_seconds: 0,
            max_seconds: 0,
            std_dev_hours: 0.0,
            sync_rate: 0.0,
            mode: CooperationMode::Individual,
        };
    }

    let values: Vec<i64> = member_offline_seconds.values().copied().collect();
    let count = values.len() as f64;
    let min_seconds = values.iter().copied().min().unwrap_or(0);
    let max_seconds = values.iter().copied().max().unwrap_or(0);
    let mean_seconds = values.iter().map(|&s| s as f64).sum::<f64>() / count;

    let std_dev_hours = if min_seconds == max_seconds {
        0.0
    } else {
        let mean_hours = mean_seconds / SECONDS_PER_HOUR;
        let variance = values
            .iter()
            .map(|&s| {
                let deviation = s as f64 / SECONDS_PER_HOUR - mean_hours;
                deviation * deviation
            })
            .sum::<f64>()
            / count;
        variance.sqrt()
    };

    let sync_rate = (1.0 - std_dev_hours / SYNC_REFERENCE_SPREAD_HOURS).clamp(0.0, 1.0);

    TeamSyncInfo {
        member_offline_seconds,
        mean_seconds,
        min_seconds,
        max_seconds,
        std_dev_hours,
        sync_rate,
        mode: CooperationMode::from_sync_rate(sync_rate),
    }
}
