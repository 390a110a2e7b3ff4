//! Settlement service: the caller-facing entry points.
//!
//! Reads snapshots from the store, resolves offline windows, runs the
//! simulators, applies results and writes the snapshot plus an audit record.
//! Team members and batch players are settled as separate tokio tasks; a team
//! joins all member tasks before its team-wide bonus pass.

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{BatchItem, BatchSettlement, TeamSettlement};
use crate::core::config::EngineConfig;
use crate::core::leveling::apply_settlement;
use crate::core::types::{PlayerSnapshot, SettlementResult};
use crate::core::window::OfflineWindow;
use crate::error::SettlementError;
use crate::simulator::activity::simulate_offline_yielding;
use crate::storage::{SettlementRecord, SettlementStore};
use crate::team::{analyze_team_sync, apply_team_bonuses, settle_member, CooperativePlan};

pub struct SettlementService<S> {
    store: Arc<S>,
    config: Arc<EngineConfig>,
}

impl<S> Clone for SettlementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<S: SettlementStore + 'static> SettlementService<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// One generator per settlement call. With a configured seed the stream is
    /// derived from the seed and the entity id, so repeated calls repeat.
    fn rng_for(&self, entity_id: Uuid) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => {
                let (high, low) = entity_id.as_u64_pair();
                ChaCha8Rng::seed_from_u64(seed ^ high ^ low.rotate_left(32))
            }
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn persist(
        &self,
        player: &mut PlayerSnapshot,
        result: SettlementResult,
        team_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<SettlementResult, SettlementError> {
        let result = apply_settlement(player, result, now);
        self.store.save_player(player)?;
        self.store
            .save_settlement_record(&SettlementRecord::new(&result, team_id, now))?;
        Ok(result)
    }

    pub async fn settle_player(&self, player_id: Uuid) -> Result<SettlementResult, SettlementError> {
        self.settle_player_at(player_id, Utc::now()).await
    }

    /// Settles one player's offline time as of `now`.
    ///
    /// Windows shorter than the minimum return an empty result and nothing is
    /// persisted. A last-active time after `now` is [`SettlementError::AlreadyCurrent`].
    pub async fn settle_player_at(
        &self,
        player_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SettlementResult, SettlementError> {
        let mut player = self
            .store
            .get_player(player_id)?
            .ok_or(SettlementError::PlayerNotFound(player_id))?;

        let window = OfflineWindow::resolve(player.last_active_at, now, &self.config);
        if window.is_in_future() {
            return Err(SettlementError::AlreadyCurrent(player_id));
        }
        if !window.needs_settlement() {
            debug!(%player_id, elapsed = window.elapsed_seconds, "reconnect too short to settle");
            return Ok(SettlementResult::empty(player.id, player.activity, player.level));
        }

        let mut rng = self.rng_for(player_id);
        let result = simulate_offline_yielding(
            &player,
            window.effective_seconds,
            &self.config.combat,
            &mut rng,
            self.config.yield_every_blocks,
        )
        .await;

        let result = self.persist(&mut player, result, None, now)?;
        info!(
            %player_id,
            activity = result.activity.name(),
            hours = result.offline_hours(),
            clamped = window.was_clamped(),
            experience = result.total_experience,
            gold = result.total_gold,
            level = result.level_after,
            "player settled"
        );
        Ok(result)
    }

    pub async fn settle_team(&self, team_id: Uuid) -> Result<TeamSettlement, SettlementError> {
        self.settle_team_at(team_id, Utc::now()).await
    }

    /// Settles every resolvable member of a team together.
    ///
    /// Missing members are skipped with a warning; a team with none left is
    /// [`SettlementError::NoValidMembers`].
    pub async fn settle_team_at(
        &self,
        team_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TeamSettlement, SettlementError> {
        let team = self
            .store
            .get_team(team_id)?
            .ok_or(SettlementError::TeamNotFound(team_id))?;

        let mut seen = HashSet::new();
        let mut members: Vec<(PlayerSnapshot, OfflineWindow)> = Vec::new();
        for member_id in team.member_ids.iter().copied() {
            if !seen.insert(member_id) {
                continue;
            }
            match self.store.get_player(member_id) {
                Ok(Some(player)) => {
                    let window = OfflineWindow::resolve(player.last_active_at, now, &self.config);
                    members.push((player, window));
                }
                Ok(None) => warn!(%team_id, %member_id, "team member not found, skipping"),
                Err(e) => warn!(%team_id, %member_id, error = %e, "failed to load team member, skipping"),
            }
        }
        if members.is_empty() {
            return Err(SettlementError::NoValidMembers(team_id));
        }

        let durations: Vec<(Uuid, i64)> = members
            .iter()
            .map(|(player, window)| (player.id, window.effective_seconds))
            .collect();
        let sync = analyze_team_sync(&durations);
        let plan = CooperativePlan::from_sync(&sync);
        info!(
            %team_id,
            members = members.len(),
            mode = sync.mode.name(),
            sync_rate = sync.sync_rate,
            team_bonus = plan.team_bonus,
            "team cooperation resolved"
        );

        let mut team_rng = self.rng_for(team_id);
        let mut tasks = JoinSet::new();
        for (index, (player, window)) in members.iter().enumerate() {
            let player = player.clone();
            let config = Arc::clone(&self.config);
            let seconds = if window.needs_settlement() {
                window.effective_seconds
            } else {
                0
            };
            let mut rng = ChaCha8Rng::seed_from_u64(team_rng.gen());
            tasks.spawn(async move {
                let result = settle_member(&player, seconds, &plan, &config, &mut rng).await;
                (index, result)
            });
        }

        // Barrier: every member must finish before team bonuses are computed
        let mut slots: Vec<Option<SettlementResult>> = members.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    error!(%team_id, error = %e, "team member settlement task failed");
                    return Err(SettlementError::Internal(e.to_string()));
                }
            }
        }
        let mut results: Vec<SettlementResult> = slots.into_iter().flatten().collect();
        if results.len() != members.len() {
            return Err(SettlementError::Internal(
                "team member settlement did not complete".to_string(),
            ));
        }

        let bonus_rates = apply_team_bonuses(&mut results, &sync);

        let mut settled = Vec::with_capacity(results.len());
        let mut applied: Vec<Uuid> = Vec::new();
        for ((mut player, _), result) in members.into_iter().zip(results) {
            if result.is_empty() {
                settled.push(result);
                continue;
            }
            match self.persist(&mut player, result, Some(team_id), now) {
                Ok(result) => {
                    applied.push(player.id);
                    settled.push(result);
                }
                Err(e) if applied.is_empty() => return Err(e),
                Err(e) => {
                    error!(
                        %team_id,
                        failed_member = %player.id,
                        applied = ?applied,
                        error = %e,
                        "team settlement stopped after partial persistence"
                    );
                    return Err(SettlementError::PartiallyApplied {
                        team_id,
                        applied,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!(
            %team_id,
            experience = settled.iter().map(|r| r.total_experience).sum::<u64>(),
            gold = settled.iter().map(|r| r.total_gold).sum::<u64>(),
            "team settled"
        );

        Ok(TeamSettlement {
            team_id,
            sync,
            plan,
            bonus_rates,
            results: settled,
        })
    }

    pub async fn settle_batch(&self, player_ids: &[Uuid]) -> BatchSettlement {
        self.settle_batch_at(player_ids, Utc::now()).await
    }

    /// Settles each player independently. A failure for one id, including a
    /// panic inside its task, is reported on that item only.
    ///
    /// Each distinct id is settled once; later repeats of an id are reported as
    /// [`SettlementError::DuplicateInBatch`].
    pub async fn settle_batch_at(&self, player_ids: &[Uuid], now: DateTime<Utc>) -> BatchSettlement {
        let mut slots: Vec<Option<Result<SettlementResult, SettlementError>>> =
            player_ids.iter().map(|_| None).collect();

        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();
        for (index, player_id) in player_ids.iter().copied().enumerate() {
            if !seen.insert(player_id) {
                slots[index] = Some(Err(SettlementError::DuplicateInBatch(player_id)));
                continue;
            }
            let service = self.clone();
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(service.settle_player_at(player_id, now))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        Err(SettlementError::Internal(panic_message(payload.as_ref())))
                    });
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => error!(error = %e, "batch settlement task aborted"),
            }
        }

        let items: Vec<BatchItem> = player_ids
            .iter()
            .copied()
            .zip(slots)
            .map(|(player_id, slot)| {
                let outcome = slot.unwrap_or_else(|| {
                    Err(SettlementError::Internal("settlement task aborted".to_string()))
                });
                if let Err(e) = &outcome {
                    warn!(%player_id, error = %e, "batch item failed");
                }
                BatchItem { player_id, outcome }
            })
            .collect();

        let batch = BatchSettlement::from_items(items);
        info!(
            total = batch.items.len(),
            succeeded = batch.success_count,
            failed = batch.error_count,
            "batch settled"
        );
        batch
    }
}
