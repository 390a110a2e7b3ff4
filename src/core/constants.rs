//! Balance constants for offline settlement.
//!
//! These are tuned for offline pacing and are deliberately independent of the
//! live combat numbers. Change once, test everywhere.

// =============================================================================
// SETTLEMENT WINDOW
// =============================================================================

/// Longest offline stretch that will ever be simulated.
pub const MAX_OFFLINE_HOURS: f64 = 24.0;

/// Reconnects shorter than this settle to an empty result.
pub const MIN_SETTLE_SECONDS: i64 = 60;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

// =============================================================================
// RATE-BASED ACTIVITIES
// =============================================================================

pub const GATHERING_ACTIONS_PER_HOUR: f64 = 5.0;
pub const GATHERING_XP_PER_ACTION: u64 = 20;
pub const GATHERING_GOLD_PER_ACTION: u64 = 5;

pub const CRAFTING_ACTIONS_PER_HOUR: f64 = 3.0;
pub const CRAFTING_XP_PER_ACTION: u64 = 50;
pub const CRAFTING_GOLD_PER_ACTION: u64 = 15;

/// Combat baseline experience per hour. Idle earns half of it.
pub const BASE_XP_PER_HOUR: f64 = 100.0;
pub const BASE_GOLD_PER_HOUR: f64 = 20.0;
pub const IDLE_XP_FACTOR: f64 = 0.5;

// =============================================================================
// PROGRESSIVE COMBAT
// =============================================================================

/// Battles fought per hour with zero fatigue.
pub const BASE_BATTLES_PER_HOUR: f64 = 4.0;
pub const BASE_DIFFICULTY: f64 = 1.0;

/// Hard ceiling on battles in one session, independent of the hour clock.
pub const MAX_BATTLES_PER_SESSION: u32 = 5_000;

pub const FATIGUE_MAX: f64 = 0.9;
pub const FATIGUE_SPEED_PENALTY: f64 = 0.3;
pub const FATIGUE_DIFFICULTY_WEIGHT: f64 = 0.2;
pub const FATIGUE_VICTORY_RECOVERY: f64 = 0.02;
pub const FATIGUE_DEFEAT_GAIN: f64 = 0.05;
pub const FATIGUE_HOURLY_GAIN: f64 = 0.01;
pub const FATIGUE_REST_THRESHOLD: f64 = 0.6;
pub const FATIGUE_REST_RECOVERY: f64 = 0.3;
pub const REST_HOURS: f64 = 0.5;

pub const DIFFICULTY_PER_WAVE: f64 = 0.1;
pub const WAVE_REWARD_STEP: f64 = 0.15;
pub const VICTORIES_PER_WAVE: u32 = 3;
pub const DEFEATS_PER_WAVE_DROP: u32 = 3;
pub const STREAK_BONUS_INTERVAL: u32 = 5;
pub const STREAK_BONUS_FRACTION: f64 = 0.2;

// Single battle resolution
pub const BASE_WIN_RATE: f64 = 0.7;
pub const WIN_RATE_MIN: f64 = 0.10;
pub const WIN_RATE_MAX: f64 = 0.95;
pub const EFFICIENCY_PER_LEVEL: f64 = 0.1;
pub const DIFFICULTY_WIN_PENALTY: f64 = 0.1;
pub const FATIGUE_WIN_PENALTY: f64 = 0.2;
pub const REWARD_JITTER_MIN: f64 = 0.8;
pub const REWARD_JITTER_MAX: f64 = 1.2;
pub const DEFEAT_REWARD_FRACTION: f64 = 0.2;

// Per-battle baseline: base + level * step
pub const BATTLE_XP_BASE: f64 = 20.0;
pub const BATTLE_XP_PER_LEVEL: f64 = 2.0;
pub const BATTLE_GOLD_BASE: f64 = 5.0;
pub const BATTLE_GOLD_PER_LEVEL: f64 = 1.0;

pub const BATTLE_BASE_DURATION_SECS: f64 = 45.0;
pub const BATTLE_DURATION_PER_WAVE: f64 = 0.1;
pub const BATTLE_DURATION_PER_DIFFICULTY: f64 = 0.2;

// Profession efficiency multipliers
pub const WARRIOR_MULTIPLIER: f64 = 1.2;
pub const RANGER_MULTIPLIER: f64 = 1.15;
pub const MAGE_MULTIPLIER: f64 = 1.1;

// Combat rating: win_rate*100 + max_wave*10 + min(battles, cap)*0.5
pub const RATING_WIN_RATE_WEIGHT: f64 = 100.0;
pub const RATING_WAVE_WEIGHT: f64 = 10.0;
pub const RATING_BATTLE_WEIGHT: f64 = 0.5;
pub const RATING_BATTLE_CAP: u32 = 100;

// =============================================================================
// TEAM COOPERATION
// =============================================================================

/// Standard deviation (hours) at which the sync rate reaches zero.
pub const SYNC_REFERENCE_SPREAD_HOURS: f64 = 12.0;

pub const HIGH_SYNC_THRESHOLD: f64 = 0.8;
pub const MEDIUM_SYNC_THRESHOLD: f64 = 0.5;
pub const LOW_SYNC_THRESHOLD: f64 = 0.2;

pub const TEAM_BONUS_PER_EXTRA_MEMBER: f64 = 0.15;
pub const TEAM_BONUS_SYNC_WEIGHT: f64 = 0.3;
pub const MEDIUM_SYNC_SEGMENT_FRACTION: f64 = 0.6;
pub const MEDIUM_SYNC_BONUS_SCALE: f64 = 0.7;

/// Level bonus rate per point of average team experience gained.
pub const TEAM_LEVEL_BONUS_PER_XP: f64 = 0.0001;
pub const TEAM_LEVEL_BONUS_CAP: f64 = 0.20;
pub const TEAM_LOYALTY_BONUS_CAP: f64 = 0.15;

// =============================================================================
// LEVELING
// =============================================================================

pub const XP_PER_LEVEL: u64 = 100;
pub const MAX_HEALTH_PER_LEVEL: u32 = 10;
pub const BASE_MAX_HEALTH: u32 = 100;
