//! Single offline battle resolution.

use rand::Rng;
use uuid::{Builder, Uuid};

use crate::core::constants::*;
use crate::core::types::{AuxMap, BattleOutcome, EnemyTier, Profession};

/// The parts of a player that matter to offline combat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combatant {
    pub level: u32,
    pub profession: Profession,
}

impl Combatant {
    pub fn efficiency(&self) -> f64 {
        1.0 + self.level as f64 * EFFICIENCY_PER_LEVEL * self.profession.efficiency_multiplier()
    }

    pub fn base_experience(&self) -> f64 {
        BATTLE_XP_BASE + self.level as f64 * BATTLE_XP_PER_LEVEL
    }

    pub fn base_gold(&self) -> f64 {
        BATTLE_GOLD_BASE + self.level as f64 * BATTLE_GOLD_PER_LEVEL
    }
}

/// Session state a battle is fought under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BattleConditions {
    pub wave: u32,
    pub difficulty: f64,
    pub fatigue: f64,
}

pub fn win_probability(efficiency: f64, difficulty: f64, fatigue: f64) -> f64 {
    let raw = BASE_WIN_RATE
        * efficiency
        * (1.0 - difficulty * DIFFICULTY_WIN_PENALTY)
        * (1.0 - fatigue * FATIGUE_WIN_PENALTY);
    raw.clamp(WIN_RATE_MIN, WIN_RATE_MAX)
}

pub fn wave_multiplier(wave: u32) -> f64 {
    1.0 + wave.saturating_sub(1) as f64 * WAVE_REWARD_STEP
}

fn battle_duration_secs(conditions: &BattleConditions) -> u32 {
    let secs = BATTLE_BASE_DURATION_SECS
        * (1.0 + conditions.wave.saturating_sub(1) as f64 * BATTLE_DURATION_PER_WAVE)
        * (1.0 + conditions.difficulty.max(0.0) * BATTLE_DURATION_PER_DIFFICULTY);
    secs.round() as u32
}

/// Battle ids come from the injected generator so seeded runs repeat exactly.
fn battle_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Resolves one battle. Victory pays the wave-scaled baseline with ±20% jitter;
/// defeat still pays a small flat share of the baseline.
pub fn resolve_battle<R: Rng + ?Sized>(
    fighter: &Combatant,
    conditions: &BattleConditions,
    rng: &mut R,
) -> BattleOutcome {
    let win_rate = win_probability(fighter.efficiency(), conditions.difficulty, conditions.fatigue);
    let victory = rng.gen::<f64>() < win_rate;
    let multiplier = wave_multiplier(conditions.wave);

    let (experience, gold) = if victory {
        let xp_jitter = rng.gen_range(REWARD_JITTER_MIN..=REWARD_JITTER_MAX);
        let gold_jitter = rng.gen_range(REWARD_JITTER_MIN..=REWARD_JITTER_MAX);
        (
            (fighter.base_experience() * multiplier * xp_jitter).round() as u64,
            (fighter.base_gold() * multiplier * gold_jitter).round() as u64,
        )
    } else {
        (
            (fighter.base_experience() * DEFEAT_REWARD_FRACTION).floor() as u64,
            (fighter.base_gold() * DEFEAT_REWARD_FRACTION).floor() as u64,
        )
    };

    let mut aux = AuxMap::new();
    aux.insert("wave".to_string(), conditions.wave.into());
    aux.insert("difficulty".to_string(), conditions.difficulty.into());
    aux.insert("win_rate".to_string(), win_rate.into());
    aux.insert("fatigue".to_string(), conditions.fatigue.into());
    aux.insert("wave_multiplier".to_string(), multiplier.into());

    BattleOutcome {
        battle_id: battle_id(rng),
        victory,
        experience,
        gold,
        duration_secs: battle_duration_secs(conditions),
        enemy: EnemyTier::for_wave(conditions.wave),
        aux,
    }
}
