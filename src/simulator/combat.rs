//! Progressive offline combat.
//!
//! An hour-stepped loop that fights a series of battles while the session's
//! wave and fatigue evolve. Winning streaks push the wave up, losing streaks
//! knock it back, and fatigue slows the battle rate until a forced rest.
//!
//! The loop always terminates: every battle advances the clock by
//! `1 / battles_per_hour` with `battles_per_hour` finite and at least 1, and a
//! hard battle cap bounds the session independently of the clock.

use rand::Rng;
use tracing::{debug, trace};

use super::battle::{resolve_battle, BattleConditions, Combatant};
use crate::core::config::CombatParams;
use crate::core::constants::*;
use crate::core::types::{AuxValue, BattleOutcome, CombatSummary, RewardCategory, RewardEntry};

/// Transient state of one combat run.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatSession {
    pub current_hour: f64,
    pub total_hours: f64,
    pub wave: u32,
    pub fatigue: f64,
    pub consecutive_victories: u32,
    pub consecutive_defeats: u32,
    pub battles: u32,
    pub victories: u32,
    pub max_wave: u32,
    pub rests: u32,
}

impl CombatSession {
    pub fn new(total_hours: f64) -> Self {
        Self {
            current_hour: 0.0,
            total_hours: total_hours.max(0.0),
            wave: 1,
            fatigue: 0.0,
            consecutive_victories: 0,
            consecutive_defeats: 0,
            battles: 0,
            victories: 0,
            max_wave: 1,
            rests: 0,
        }
    }

    pub fn difficulty(&self, initial: f64) -> f64 {
        initial
            + self.wave.saturating_sub(1) as f64 * DIFFICULTY_PER_WAVE
            + self.fatigue * FATIGUE_DIFFICULTY_WEIGHT
    }

    pub fn battles_per_hour(&self, speed: f64) -> u32 {
        let rate = (speed * (1.0 - self.fatigue * FATIGUE_SPEED_PENALTY)).floor();
        // NaN and sub-1 rates both fall back to one battle per hour
        rate.max(1.0).min(u32::MAX as f64) as u32
    }

    fn add_fatigue(&mut self, amount: f64) {
        self.fatigue = (self.fatigue + amount).clamp(0.0, FATIGUE_MAX);
    }

    /// Records a win. Returns the streak bonus fraction to apply, if any.
    fn record_victory(&mut self) -> Option<f64> {
        self.victories += 1;
        self.consecutive_victories += 1;
        self.consecutive_defeats = 0;

        let bonus = (self.consecutive_victories % STREAK_BONUS_INTERVAL == 0)
            .then_some(STREAK_BONUS_FRACTION);

        if self.consecutive_victories % VICTORIES_PER_WAVE == 0 {
            self.wave += 1;
            self.max_wave = self.max_wave.max(self.wave);
        }
        self.add_fatigue(-FATIGUE_VICTORY_RECOVERY);
        bonus
    }

    fn record_defeat(&mut self) {
        self.consecutive_defeats += 1;
        self.consecutive_victories = 0;

        if self.consecutive_defeats >= DEFEATS_PER_WAVE_DROP {
            self.wave = self.wave.saturating_sub(1).max(1);
            self.consecutive_defeats = 0;
        }
        self.add_fatigue(FATIGUE_DEFEAT_GAIN);
    }

    pub fn summary(&self) -> CombatSummary {
        CombatSummary::new(
            self.battles,
            self.victories,
            self.max_wave,
            self.wave,
            self.fatigue,
            self.rests,
        )
    }
}

/// Everything a finished combat run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatRun {
    pub battles: Vec<BattleOutcome>,
    pub experience: u64,
    pub gold: u64,
    pub summary: CombatSummary,
}

impl CombatRun {
    /// Itemized reward entry summarizing the run.
    pub fn reward_entry(&self, category: RewardCategory, description: String) -> RewardEntry {
        RewardEntry::new(category, description, self.experience, self.gold)
            .with_aux("battles", self.summary.battles)
            .with_aux("victories", self.summary.victories)
            .with_aux("max_wave", self.summary.max_wave)
            .with_aux("win_rate", self.summary.win_rate)
            .with_aux("rating", AuxValue::Text(self.summary.rating.name().to_string()))
    }

    /// Scales every battle's rewards by `factor` (floored) and re-totals.
    pub fn scaled(mut self, factor: f64) -> CombatRun {
        let factor = factor.max(0.0);
        for battle in &mut self.battles {
            battle.experience = (battle.experience as f64 * factor).floor() as u64;
            battle.gold = (battle.gold as f64 * factor).floor() as u64;
        }
        self.experience = self.battles.iter().map(|b| b.experience).sum();
        self.gold = self.battles.iter().map(|b| b.gold).sum();
        self
    }
}

/// Drives a [`CombatSession`] one hour block at a time.
#[derive(Debug, Clone)]
pub struct ProgressiveCombat {
    fighter: Combatant,
    params: CombatParams,
    session: CombatSession,
    outcomes: Vec<BattleOutcome>,
    experience: u64,
    gold: u64,
}

impl ProgressiveCombat {
    pub fn new(fighter: Combatant, total_hours: f64, params: CombatParams) -> Self {
        Self {
            fighter,
            params,
            session: CombatSession::new(total_hours),
            outcomes: Vec::new(),
            experience: 0,
            gold: 0,
        }
    }

    pub fn session(&self) -> &CombatSession {
        &self.session
    }

    pub fn outcomes(&self) -> &[BattleOutcome] {
        &self.outcomes
    }

    fn at_battle_cap(&self) -> bool {
        self.session.battles >= self.params.max_battles
    }

    pub fn is_finished(&self) -> bool {
        self.session.current_hour >= self.session.total_hours || self.at_battle_cap()
    }

    /// Simulates one hour block: a burst of battles, hourly fatigue, and a
    /// forced rest when fatigue runs too high.
    pub fn step_block<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_finished() {
            return;
        }

        let battles_per_hour = self.session.battles_per_hour(self.params.battles_per_hour);
        let step = 1.0 / battles_per_hour as f64;

        for _ in 0..battles_per_hour {
            if self.is_finished() {
                break;
            }
            self.fight(rng);
            self.session.current_hour += step;
        }

        self.session.add_fatigue(FATIGUE_HOURLY_GAIN);

        if self.session.fatigue > FATIGUE_REST_THRESHOLD {
            self.session.current_hour += REST_HOURS;
            self.session.add_fatigue(-FATIGUE_REST_RECOVERY);
            self.session.rests += 1;
        }

        trace!(
            hour = self.session.current_hour,
            wave = self.session.wave,
            fatigue = self.session.fatigue,
            "combat block finished"
        );
    }

    fn fight<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let conditions = BattleConditions {
            wave: self.session.wave,
            difficulty: self.session.difficulty(self.params.initial_difficulty),
            fatigue: self.session.fatigue,
        };
        let mut outcome = resolve_battle(&self.fighter, &conditions, rng);
        self.session.battles += 1;

        if outcome.victory {
            if let Some(fraction) = self.session.record_victory() {
                let bonus = (outcome.experience as f64 * fraction).floor() as u64;
                outcome.experience += bonus;
                outcome.aux.insert("streak_bonus".to_string(), bonus.into());
            }
        } else {
            self.session.record_defeat();
        }

        self.experience += outcome.experience;
        self.gold += outcome.gold;
        self.outcomes.push(outcome);
    }

    pub fn finish(self) -> CombatRun {
        let summary = self.session.summary();
        debug!(
            battles = summary.battles,
            victories = summary.victories,
            max_wave = summary.max_wave,
            rating = summary.rating.name(),
            "combat session finished"
        );
        CombatRun {
            battles: self.outcomes,
            experience: self.experience,
            gold: self.gold,
            summary,
        }
    }

    /// Runs the whole session synchronously.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> CombatRun {
        while !self.is_finished() {
            self.step_block(rng);
        }
        self.finish()
    }

    /// Runs the session, yielding to the runtime every `yield_every` blocks
    /// (never when zero) so long sessions do not starve other tasks.
    pub async fn run_yielding<R: Rng + Send>(mut self, rng: &mut R, yield_every: u32) -> CombatRun {
        let mut blocks: u32 = 0;
        while !self.is_finished() {
            self.step_block(rng);
            blocks = blocks.wrapping_add(1);
            if yield_every > 0 && blocks % yield_every == 0 {
                tokio::task::yield_now().await;
            }
        }
        self.finish()
    }
}

/// Convenience wrapper: simulate `hours` of combat for a fighter.
pub fn simulate_combat<R: Rng + ?Sized>(
    fighter: Combatant,
    hours: f64,
    params: &CombatParams,
    rng: &mut R,
) -> CombatRun {
    ProgressiveCombat::new(fighter, hours, params.clone()).run(rng)
}
