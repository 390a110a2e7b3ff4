//! Single-player offline pipeline: pick the strategy for the player's last
//! activity and run it over the settled duration.

use rand::Rng;

use super::battle::Combatant;
use super::combat::{CombatRun, ProgressiveCombat};
use super::rate::{simulate_idle, RateActivity};
use crate::core::config::CombatParams;
use crate::core::constants::SECONDS_PER_HOUR;
use crate::core::types::{Activity, PlayerSnapshot, RewardCategory, SettlementResult};

/// Maps a raw activity tag to the strategy that settles it.
///
/// Total: unrecognized tags settle as idle time.
pub fn select_strategy(activity_tag: &str) -> Activity {
    Activity::parse(activity_tag)
}

pub fn combatant_for(player: &PlayerSnapshot) -> Combatant {
    Combatant {
        level: player.level,
        profession: player.profession,
    }
}

fn empty_result(player: &PlayerSnapshot, offline_seconds: i64) -> SettlementResult {
    let mut result = SettlementResult::empty(player.id, player.activity, player.level);
    result.offline_seconds = offline_seconds.max(0);
    result
}

/// Folds a combat run into a result: the battle log, an itemized entry and
/// the session summary. Totals are taken from the entry.
pub fn absorb_combat_run(
    result: &mut SettlementResult,
    run: CombatRun,
    category: RewardCategory,
    description: String,
) {
    let entry = run.reward_entry(category, description);
    result.push_reward(entry);
    result.battles.extend(run.battles);
    result.combat_summary = Some(match result.combat_summary.take() {
        Some(earlier) => earlier.combine(&run.summary),
        None => run.summary,
    });
}

fn combat_description(run: &CombatRun, hours: f64) -> String {
    format!(
        "Fought {} battles over {:.1}h ({} won, reached wave {}, {})",
        run.summary.battles,
        hours,
        run.summary.victories,
        run.summary.max_wave,
        run.summary.rating.name()
    )
}

fn settle_non_combat(result: &mut SettlementResult, activity: Activity, hours: f64) {
    let entry = match activity {
        Activity::Gathering => RateActivity::GATHERING.simulate(hours),
        Activity::Crafting => RateActivity::CRAFTING.simulate(hours),
        Activity::Idle | Activity::Combat => simulate_idle(hours),
    };
    result.push_reward(entry);
}

/// Settles `offline_seconds` of the player's current activity.
pub fn simulate_offline<R: Rng + ?Sized>(
    player: &PlayerSnapshot,
    offline_seconds: i64,
    params: &CombatParams,
    rng: &mut R,
) -> SettlementResult {
    let mut result = empty_result(player, offline_seconds);
    let hours = result.offline_hours();

    match player.activity {
        Activity::Combat => {
            let run = ProgressiveCombat::new(combatant_for(player), hours, params.clone()).run(rng);
            let description = combat_description(&run, hours);
            absorb_combat_run(&mut result, run, RewardCategory::Combat, description);
        }
        other => settle_non_combat(&mut result, other, hours),
    }
    result
}

/// Async twin of [`simulate_offline`] that yields during long combat runs.
pub async fn simulate_offline_yielding<R: Rng + Send>(
    player: &PlayerSnapshot,
    offline_seconds: i64,
    params: &CombatParams,
    rng: &mut R,
    yield_every: u32,
) -> SettlementResult {
    let mut result = empty_result(player, offline_seconds);
    let hours = result.offline_hours();

    match player.activity {
        Activity::Combat => {
            let run = ProgressiveCombat::new(combatant_for(player), hours, params.clone())
                .run_yielding(rng, yield_every)
                .await;
            let description = combat_description(&run, hours);
            absorb_combat_run(&mut result, run, RewardCategory::Combat, description);
        }
        other => settle_non_combat(&mut result, other, hours),
    }
    result
}

/// Hours represented by a second count.
pub fn seconds_to_hours(seconds: i64) -> f64 {
    seconds.max(0) as f64 / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CombatRating, Profession};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player(activity: Activity, level: u32) -> PlayerSnapshot {
        let mut p = PlayerSnapshot::new("Sim".to_string(), activity, Profession::Warrior);
        p.level = level;
        p
    }

    #[test]
    fn test_select_strategy_buckets() {
        assert_eq!(select_strategy("Combat"), Activity::Combat);
        assert_eq!(select_strategy("BATTLE"), Activity::Combat);
        assert_eq!(select_strategy("Gathering"), Activity::Gathering);
        assert_eq!(select_strategy("crafting"), Activity::Crafting);
        assert_eq!(select_strategy("meditating"), Activity::Idle);
    }

    #[test]
    fn test_gathering_three_hours_settles_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = simulate_offline(
            &player(Activity::Gathering, 5),
            3 * 3600,
            &CombatParams::default(),
            &mut rng,
        );

        assert_eq!(result.total_experience, 300);
        assert_eq!(result.total_gold, 75);
        assert!(result.battles.is_empty());
        assert_eq!(result.rewards.len(), 1);
        assert_eq!(result.rewards[0].category, RewardCategory::Gathering);
    }

    #[test]
    fn test_combat_two_hours_at_level_ten() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = simulate_offline(
            &player(Activity::Combat, 10),
            2 * 3600,
            &CombatParams::default(),
            &mut rng,
        );

        assert!(!result.battles.is_empty());
        assert!(result.total_experience > 0);
        let summary = result.combat_summary.expect("combat produces a summary");
        assert!(CombatRating::all().contains(&summary.rating));

        let battle_xp: u64 = result.battles.iter().map(|b| b.experience).sum();
        assert_eq!(battle_xp, result.total_experience);
    }

    #[test]
    fn test_idle_has_no_battles() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = simulate_offline(
            &player(Activity::Idle, 1),
            2 * 3600,
            &CombatParams::default(),
            &mut rng,
        );
        assert!(result.battles.is_empty());
        assert!(result.combat_summary.is_none());
        assert_eq!(result.total_experience, 100);
        assert_eq!(result.total_gold, 40);
    }

    #[test]
    fn test_seconds_to_hours_ignores_negative() {
        assert_eq!(seconds_to_hours(-10), 0.0);
        assert_eq!(seconds_to_hours(5400), 1.5);
    }
}
