//! Cooperative team settlement.
//!
//! Each member's offline time is split into a shared cooperative segment,
//! fought as team combat with a bonus multiplier, and an individual remainder
//! settled through the single-player pipeline. A post-pass then grants the
//! team-wide level and loyalty bonuses.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sync::{CooperationMode, TeamSyncInfo};
use crate::core::config::EngineConfig;
use crate::core::constants::*;
use crate::core::types::{PlayerSnapshot, RewardCategory, RewardEntry, SettlementResult};
use crate::simulator::activity::{
    absorb_combat_run, combatant_for, seconds_to_hours, simulate_offline_yielding,
};
use crate::simulator::combat::ProgressiveCombat;

/// How a team's offline time is shared out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooperativePlan {
    pub mode: CooperationMode,
    pub sync_rate: f64,
    pub team_size: usize,
    /// Multiplier on cooperative-segment rewards (1.0 when not cooperating)
    pub team_bonus: f64,
    /// Length of the shared segment before per-member capping
    pub segment_seconds: i64,
}

/// `1 + (n - 1) * 0.15 + sync * 0.3`
pub fn full_team_bonus(team_size: usize, sync_rate: f64) -> f64 {
    1.0 + team_size.saturating_sub(1) as f64 * TEAM_BONUS_PER_EXTRA_MEMBER
        + sync_rate.clamp(0.0, 1.0) * TEAM_BONUS_SYNC_WEIGHT
}

impl CooperativePlan {
    pub fn from_sync(sync: &TeamSyncInfo) -> Self {
        let team_size = sync.team_size();
        let (team_bonus, segment_seconds) = match sync.mode {
            CooperationMode::HighSync => (full_team_bonus(team_size, sync.sync_rate), sync.min_seconds),
            CooperationMode::MediumSync => (
                full_team_bonus(team_size, sync.sync_rate) * MEDIUM_SYNC_BONUS_SCALE,
                (sync.mean_seconds * MEDIUM_SYNC_SEGMENT_FRACTION).floor() as i64,
            ),
            CooperationMode::LowSync | CooperationMode::Individual => (1.0, 0),
        };

        Self {
            mode: sync.mode,
            sync_rate: sync.sync_rate,
            team_size,
            team_bonus,
            segment_seconds: segment_seconds.max(0),
        }
    }

    /// A member never cooperates for longer than they were offline.
    pub fn cooperative_seconds_for(&self, member_offline_seconds: i64) -> i64 {
        if !self.mode.is_cooperative() {
            return 0;
        }
        self.segment_seconds.min(member_offline_seconds).max(0)
    }
}

/// Settles one member: cooperative combat for their share of the segment,
/// then their own activity for whatever time is left.
pub async fn settle_member<R: Rng + Send>(
    player: &PlayerSnapshot,
    offline_seconds: i64,
    plan: &CooperativePlan,
    config: &EngineConfig,
    rng: &mut R,
) -> SettlementResult {
    let offline_seconds = offline_seconds.max(0);
    let mut result = SettlementResult::empty(player.id, player.activity, player.level);
    result.offline_seconds = offline_seconds;

    let cooperative_seconds = plan.cooperative_seconds_for(offline_seconds);
    if cooperative_seconds > 0 {
        let hours = seconds_to_hours(cooperative_seconds);
        let run = ProgressiveCombat::new(combatant_for(player), hours, config.combat.clone())
            .run_yielding(rng, config.yield_every_blocks)
            .await
            .scaled(plan.team_bonus);
        let description = format!(
            "Team combat for {:.1}h ({} battles, x{:.2} team bonus)",
            hours, run.summary.battles, plan.team_bonus
        );
        absorb_combat_run(&mut result, run, RewardCategory::TeamCooperation, description);
        if let Some(entry) = result.rewards.last_mut() {
            entry.aux.insert("team_bonus".to_string(), plan.team_bonus.into());
            entry.aux.insert("team_size".to_string(), plan.team_size.into());
            entry.aux.insert("sync_rate".to_string(), plan.sync_rate.into());
        }
    }

    let remainder = offline_seconds - cooperative_seconds;
    if remainder >= config.min_settle_seconds {
        let individual = simulate_offline_yielding(
            player,
            remainder,
            &config.combat,
            rng,
            config.yield_every_blocks,
        )
        .await;
        result.merge(individual);
    }

    result
}

/// Team-wide bonus rates derived from the joined member results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamBonusRates {
    pub average_experience: f64,
    /// Extra experience fraction, at most 20%
    pub level_rate: f64,
    /// Extra gold fraction, at most 15%
    pub loyalty_rate: f64,
}

impl TeamBonusRates {
    pub fn compute(results: &[SettlementResult], sync_rate: f64) -> Self {
        let average_experience = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.total_experience as f64).sum::<f64>() / results.len() as f64
        };
        Self {
            average_experience,
            level_rate: (average_experience * TEAM_LEVEL_BONUS_PER_XP).clamp(0.0, TEAM_LEVEL_BONUS_CAP),
            loyalty_rate: (sync_rate * TEAM_LOYALTY_BONUS_CAP).clamp(0.0, TEAM_LOYALTY_BONUS_CAP),
        }
    }
}

/// Applies the team level and loyalty bonuses to every member's result.
///
/// Must run after all member results are joined. Zero-valued bonuses are not
/// recorded.
pub fn apply_team_bonuses(results: &mut [SettlementResult], sync: &TeamSyncInfo) -> TeamBonusRates {
    let rates = TeamBonusRates::compute(results, sync.sync_rate);

    for result in results.iter_mut() {
        let bonus_xp = (result.total_experience as f64 * rates.level_rate).floor() as u64;
        if bonus_xp > 0 {
            result.push_reward(
                RewardEntry::new(
                    RewardCategory::TeamBonus,
                    format!("Team level bonus (+{:.1}% experience)", rates.level_rate * 100.0),
                    bonus_xp,
                    0,
                )
                .with_aux("bonus_rate", rates.level_rate)
                .with_aux("team_average_experience", rates.average_experience)
                .with_aux("team_size", sync.team_size()),
            );
        }

        let bonus_gold = (result.total_gold as f64 * rates.loyalty_rate).floor() as u64;
        if bonus_gold > 0 {
            result.push_reward(
                RewardEntry::new(
                    RewardCategory::TeamBonus,
                    format!("Team loyalty bonus (+{:.1}% gold)", rates.loyalty_rate * 100.0),
                    0,
                    bonus_gold,
                )
                .with_aux("bonus_rate", rates.loyalty_rate)
                .with_aux("sync_rate", sync.sync_rate)
                .with_aux("team_size", sync.team_size()),
            );
        }
    }

    rates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{aux_number, Activity, Profession};
    use crate::team::sync::analyze_team_sync;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn sync_for(hours: &[f64]) -> TeamSyncInfo {
        let durations: Vec<(Uuid, i64)> = hours
            .iter()
            .map(|h| (Uuid::new_v4(), (h * SECONDS_PER_HOUR) as i64))
            .collect();
        analyze_team_sync(&durations)
    }

    fn member(activity: Activity) -> PlayerSnapshot {
        let mut p = PlayerSnapshot::new("Member".to_string(), activity, Profession::Mage);
        p.level = 8;
        p
    }

    #[test]
    fn test_high_sync_plan_for_identical_team() {
        let plan = CooperativePlan::from_sync(&sync_for(&[5.0, 5.0, 5.0]));
        assert_eq!(plan.mode, CooperationMode::HighSync);
        assert_eq!(plan.segment_seconds, 5 * 3600);
        assert!((plan.team_bonus - 1.6).abs() < 1e-9);
        assert_eq!(plan.cooperative_seconds_for(5 * 3600), 5 * 3600);
    }

    #[test]
    fn test_medium_sync_plan_scales_segment_and_bonus() {
        let sync = sync_for(&[4.0, 12.0]);
        let plan = CooperativePlan::from_sync(&sync);
        assert_eq!(plan.mode, CooperationMode::MediumSync);
        // 0.6 * 8h
        assert_eq!(plan.segment_seconds, (0.6 * 8.0 * 3600.0) as i64);
        let expected = full_team_bonus(2, sync.sync_rate) * 0.7;
        assert!((plan.team_bonus - expected).abs() < 1e-9);
        // The 4h member cooperates for their whole window, not 4.8h
        assert_eq!(plan.cooperative_seconds_for(4 * 3600), 4 * 3600);
    }

    #[test]
    fn test_individual_plan_has_no_segment() {
        let plan = CooperativePlan::from_sync(&sync_for(&[1.0, 1.0, 23.0]));
        assert_eq!(plan.mode, CooperationMode::Individual);
        assert_eq!(plan.team_bonus, 1.0);
        assert_eq!(plan.cooperative_seconds_for(23 * 3600), 0);
    }

    #[tokio::test]
    async fn test_member_settlement_is_cooperative_then_individual() {
        let sync = sync_for(&[5.0, 5.0, 6.0]);
        let plan = CooperativePlan::from_sync(&sync);
        assert_eq!(plan.mode, CooperationMode::HighSync);

        let player = member(Activity::Gathering);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let result =
            settle_member(&player, 6 * 3600, &plan, &EngineConfig::default(), &mut rng).await;

        assert_eq!(result.offline_seconds, 6 * 3600);
        assert!(!result.battles.is_empty());
        assert_eq!(result.rewards[0].category, RewardCategory::TeamCooperation);
        let gathering = result
            .rewards
            .iter()
            .find(|r| r.category == RewardCategory::Gathering)
            .expect("remaining hour is settled as gathering");
        // One leftover hour: 5 actions
        assert_eq!(gathering.experience, 100);
        let reward_xp: u64 = result.rewards.iter().map(|r| r.experience).sum();
        assert_eq!(reward_xp, result.total_experience);
    }

    #[tokio::test]
    async fn test_medium_sync_member_settlement() {
        // std dev ~3.74h -> sync ~0.69, mean 10h -> 6h shared segment
        let sync = sync_for(&[5.0, 11.0, 14.0]);
        let plan = CooperativePlan::from_sync(&sync);
        assert_eq!(plan.mode, CooperationMode::MediumSync);
        assert_eq!(plan.segment_seconds, 6 * 3600);
        let expected_bonus = full_team_bonus(3, sync.sync_rate) * MEDIUM_SYNC_BONUS_SCALE;
        assert!((plan.team_bonus - expected_bonus).abs() < 1e-9);
        let config = EngineConfig::default();

        // Short member: shared segment capped at their own 5h, nothing left over
        let short = member(Activity::Combat);
        let result = settle_member(
            &short,
            5 * 3600,
            &plan,
            &config,
            &mut ChaCha8Rng::seed_from_u64(31),
        )
        .await;
        let expected = ProgressiveCombat::new(combatant_for(&short), 5.0, config.combat.clone())
            .run(&mut ChaCha8Rng::seed_from_u64(31))
            .scaled(plan.team_bonus);
        assert_eq!(result.rewards.len(), 1);
        assert_eq!(result.rewards[0].category, RewardCategory::TeamCooperation);
        assert_eq!(result.battles, expected.battles, "battles carry the scaled bonus");
        assert_eq!(result.total_experience, expected.experience);
        assert_eq!(
            aux_number(&result.rewards[0].aux, "team_bonus"),
            Some(plan.team_bonus)
        );

        // Long member: 6h together, then 8h of their own gathering
        let long = member(Activity::Gathering);
        let result = settle_member(
            &long,
            14 * 3600,
            &plan,
            &config,
            &mut ChaCha8Rng::seed_from_u64(32),
        )
        .await;
        let expected = ProgressiveCombat::new(combatant_for(&long), 6.0, config.combat.clone())
            .run(&mut ChaCha8Rng::seed_from_u64(32))
            .scaled(plan.team_bonus);
        assert_eq!(result.battles, expected.battles);
        let gathering = result
            .rewards
            .iter()
            .find(|r| r.category == RewardCategory::Gathering)
            .expect("remainder is settled individually");
        // 8h * 5 actions
        assert_eq!(gathering.experience, 800);
        assert_eq!(gathering.gold, 200);
        assert_eq!(result.total_experience, expected.experience + 800);
    }

    #[tokio::test]
    async fn test_individual_mode_matches_single_player_pipeline() {
        let sync = sync_for(&[1.0, 1.0, 23.0]);
        let plan = CooperativePlan::from_sync(&sync);
        let player = member(Activity::Crafting);
        let mut rng = ChaCha8Rng::seed_from_u64(22);

        let result =
            settle_member(&player, 23 * 3600, &plan, &EngineConfig::default(), &mut rng).await;

        // 23h * 3/h = 69 items
        assert_eq!(result.total_experience, 69 * 50);
        assert_eq!(result.total_gold, 69 * 15);
        assert!(result.battles.is_empty());
    }

    #[test]
    fn test_team_bonuses_are_capped() {
        let sync = sync_for(&[5.0, 5.0]);
        let mut results: Vec<SettlementResult> = (0..2)
            .map(|_| {
                let mut r = SettlementResult::empty(Uuid::new_v4(), Activity::Combat, 1);
                r.total_experience = 50_000;
                r.total_gold = 10_000;
                r
            })
            .collect();

        let rates = apply_team_bonuses(&mut results, &sync);

        assert_eq!(rates.level_rate, TEAM_LEVEL_BONUS_CAP);
        assert_eq!(rates.loyalty_rate, TEAM_LOYALTY_BONUS_CAP);
        for result in &results {
            assert_eq!(result.total_experience, 60_000);
            assert_eq!(result.total_gold, 11_500);
            assert_eq!(
                result
                    .rewards
                    .iter()
                    .filter(|r| r.category == RewardCategory::TeamBonus)
                    .count(),
                2
            );
        }
    }

    #[test]
    fn test_zero_bonuses_are_not_recorded() {
        let sync = sync_for(&[1.0, 1.0, 23.0]);
        let mut results = vec![SettlementResult::empty(Uuid::new_v4(), Activity::Idle, 1)];
        apply_team_bonuses(&mut results, &sync);
        assert!(results[0].rewards.is_empty());
    }
}
