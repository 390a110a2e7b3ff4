//! Plain data records exchanged between the settlement components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::constants::*;

/// What the player was doing when they disconnected.
///
/// Parsed case-insensitively; anything unrecognized settles as [`Activity::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Activity {
    Combat,
    Gathering,
    Crafting,
    Idle,
}

impl Activity {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "combat" | "battle" => Activity::Combat,
            "gathering" => Activity::Gathering,
            "crafting" => Activity::Crafting,
            _ => Activity::Idle,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activity::Combat => "Combat",
            Activity::Gathering => "Gathering",
            Activity::Crafting => "Crafting",
            Activity::Idle => "Idle",
        }
    }
}

impl From<String> for Activity {
    fn from(tag: String) -> Self {
        Activity::parse(&tag)
    }
}

impl From<Activity> for String {
    fn from(activity: Activity) -> Self {
        activity.name().to_lowercase()
    }
}

/// Battle profession archetype. Unknown tags map to [`Profession::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Profession {
    /// Strength archetype
    Warrior,
    /// Finesse archetype
    Ranger,
    /// Casting archetype
    Mage,
    Other,
}

impl Profession {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "warrior" => Profession::Warrior,
            "ranger" => Profession::Ranger,
            "mage" => Profession::Mage,
            _ => Profession::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profession::Warrior => "Warrior",
            Profession::Ranger => "Ranger",
            Profession::Mage => "Mage",
            Profession::Other => "Other",
        }
    }

    /// Multiplier applied to level-based combat efficiency.
    pub fn efficiency_multiplier(&self) -> f64 {
        match self {
            Profession::Warrior => WARRIOR_MULTIPLIER,
            Profession::Ranger => RANGER_MULTIPLIER,
            Profession::Mage => MAGE_MULTIPLIER,
            Profession::Other => 1.0,
        }
    }
}

impl From<String> for Profession {
    fn from(tag: String) -> Self {
        Profession::parse(&tag)
    }
}

impl From<Profession> for String {
    fn from(profession: Profession) -> Self {
        profession.name().to_lowercase()
    }
}

/// A copy of the stored player record. The engine mutates only its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub gold: u64,
    pub health: u32,
    pub max_health: u32,
    pub activity: Activity,
    pub profession: Profession,
    pub last_active_at: DateTime<Utc>,
}

impl PlayerSnapshot {
    /// Creates a fresh level 1 player.
    pub fn new(name: String, activity: Activity, profession: Profession) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            level: 1,
            experience: 0,
            gold: 0,
            health: BASE_MAX_HEALTH,
            max_health: BASE_MAX_HEALTH,
            activity,
            profession,
            last_active_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub id: Uuid,
    pub name: String,
    pub member_ids: Vec<Uuid>,
    pub captain_id: Uuid,
}

/// Auxiliary audit value attached to outcomes and reward entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxValue {
    Number(f64),
    Text(String),
}

impl From<f64> for AuxValue {
    fn from(value: f64) -> Self {
        AuxValue::Number(value)
    }
}

impl From<u32> for AuxValue {
    fn from(value: u32) -> Self {
        AuxValue::Number(value as f64)
    }
}

impl From<u64> for AuxValue {
    fn from(value: u64) -> Self {
        AuxValue::Number(value as f64)
    }
}

impl From<usize> for AuxValue {
    fn from(value: usize) -> Self {
        AuxValue::Number(value as f64)
    }
}

impl From<&str> for AuxValue {
    fn from(value: &str) -> Self {
        AuxValue::Text(value.to_string())
    }
}

/// Ordered map so serialized outcomes are stable for a given seed.
pub type AuxMap = BTreeMap<String, AuxValue>;

pub fn aux_number(aux: &AuxMap, key: &str) -> Option<f64> {
    match aux.get(key) {
        Some(AuxValue::Number(n)) => Some(*n),
        _ => None,
    }
}

/// Enemy category, derived from the wave a battle was fought at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyTier {
    Minion,
    Veteran,
    Elite,
    Champion,
    Warlord,
}

impl EnemyTier {
    pub fn for_wave(wave: u32) -> Self {
        match wave {
            0..=2 => EnemyTier::Minion,
            3..=5 => EnemyTier::Veteran,
            6..=9 => EnemyTier::Elite,
            10..=14 => EnemyTier::Champion,
            _ => EnemyTier::Warlord,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub battle_id: Uuid,
    pub victory: bool,
    pub experience: u64,
    pub gold: u64,
    pub duration_secs: u32,
    pub enemy: EnemyTier,
    pub aux: AuxMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardCategory {
    Combat,
    Gathering,
    Crafting,
    Idle,
    TeamCooperation,
    TeamBonus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub category: RewardCategory,
    pub description: String,
    pub experience: u64,
    pub gold: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aux: AuxMap,
}

impl RewardEntry {
    pub fn new(category: RewardCategory, description: String, experience: u64, gold: u64) -> Self {
        Self {
            category,
            description,
            experience,
            gold,
            aux: AuxMap::new(),
        }
    }

    pub fn with_aux(mut self, key: &str, value: impl Into<AuxValue>) -> Self {
        self.aux.insert(key.to_string(), value.into());
        self
    }
}

/// Qualitative label for one combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CombatRating {
    Beginner,
    Average,
    Good,
    Excellent,
    Epic,
    Legendary,
}

impl CombatRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 200.0 {
            CombatRating::Legendary
        } else if score >= 150.0 {
            CombatRating::Epic
        } else if score >= 100.0 {
            CombatRating::Excellent
        } else if score >= 80.0 {
            CombatRating::Good
        } else if score >= 60.0 {
            CombatRating::Average
        } else {
            CombatRating::Beginner
        }
    }

    pub fn all() -> [CombatRating; 6] {
        [
            CombatRating::Beginner,
            CombatRating::Average,
            CombatRating::Good,
            CombatRating::Excellent,
            CombatRating::Epic,
            CombatRating::Legendary,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            CombatRating::Beginner => "Beginner",
            CombatRating::Average => "Average",
            CombatRating::Good => "Good",
            CombatRating::Excellent => "Excellent",
            CombatRating::Epic => "Epic",
            CombatRating::Legendary => "Legendary",
        }
    }
}

/// Totals for a finished combat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSummary {
    pub battles: u32,
    pub victories: u32,
    pub max_wave: u32,
    pub final_wave: u32,
    pub final_fatigue: f64,
    pub rests: u32,
    pub win_rate: f64,
    pub score: f64,
    pub rating: CombatRating,
}

impl CombatSummary {
    pub fn new(
        battles: u32,
        victories: u32,
        max_wave: u32,
        final_wave: u32,
        final_fatigue: f64,
        rests: u32,
    ) -> Self {
        let win_rate = if battles > 0 {
            victories as f64 / battles as f64
        } else {
            0.0
        };
        let score = win_rate * RATING_WIN_RATE_WEIGHT
            + max_wave as f64 * RATING_WAVE_WEIGHT
            + battles.min(RATING_BATTLE_CAP) as f64 * RATING_BATTLE_WEIGHT;

        Self {
            battles,
            victories,
            max_wave,
            final_wave,
            final_fatigue,
            rests,
            win_rate,
            score,
            rating: CombatRating::from_score(score),
        }
    }

    pub fn defeats(&self) -> u32 {
        self.battles - self.victories
    }

    /// Folds a later session into this one, re-rating the combined totals.
    pub fn combine(&self, later: &CombatSummary) -> CombatSummary {
        CombatSummary::new(
            self.battles + later.battles,
            self.victories + later.victories,
            self.max_wave.max(later.max_wave),
            later.final_wave,
            later.final_fatigue,
            self.rests + later.rests,
        )
    }
}

/// Outcome of settling one player's offline time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub player_id: Uuid,
    pub activity: Activity,
    pub offline_seconds: i64,
    pub total_experience: u64,
    pub total_gold: u64,
    pub battles: Vec<BattleOutcome>,
    pub rewards: Vec<RewardEntry>,
    pub combat_summary: Option<CombatSummary>,
    pub level_before: u32,
    pub level_after: u32,
}

impl SettlementResult {
    /// A zero-valued result: nothing simulated, nothing granted.
    pub fn empty(player_id: Uuid, activity: Activity, level: u32) -> Self {
        Self {
            player_id,
            activity,
            offline_seconds: 0,
            total_experience: 0,
            total_gold: 0,
            battles: Vec::new(),
            rewards: Vec::new(),
            combat_summary: None,
            level_before: level,
            level_after: level,
        }
    }

    pub fn offline_hours(&self) -> f64 {
        self.offline_seconds as f64 / SECONDS_PER_HOUR
    }

    pub fn is_empty(&self) -> bool {
        self.total_experience == 0
            && self.total_gold == 0
            && self.battles.is_empty()
            && self.rewards.is_empty()
    }

    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    /// Adds another segment's rewards onto this result.
    pub fn merge(&mut self, other: SettlementResult) {
        self.total_experience += other.total_experience;
        self.total_gold += other.total_gold;
        self.battles.extend(other.battles);
        self.rewards.extend(other.rewards);
        self.combat_summary = match (self.combat_summary.take(), other.combat_summary) {
            (Some(first), Some(later)) => Some(first.combine(&later)),
            (first, later) => first.or(later),
        };
    }

    pub fn push_reward(&mut self, entry: RewardEntry) {
        self.total_experience += entry.experience;
        self.total_gold += entry.gold;
        self.rewards.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_parse_is_case_insensitive() {
        assert_eq!(Activity::parse("COMBAT"), Activity::Combat);
        assert_eq!(Activity::parse("Battle"), Activity::Combat);
        assert_eq!(Activity::parse("gathering"), Activity::Gathering);
        assert_eq!(Activity::parse("CrAfTiNg"), Activity::Crafting);
        assert_eq!(Activity::parse("fishing"), Activity::Idle);
        assert_eq!(Activity::parse(""), Activity::Idle);
    }

    #[test]
    fn test_activity_deserializes_from_any_case() {
        let activity: Activity = serde_json::from_str("\"BATTLE\"").unwrap();
        assert_eq!(activity, Activity::Combat);
        let json = serde_json::to_string(&Activity::Crafting).unwrap();
        assert_eq!(json, "\"crafting\"");
    }

    #[test]
    fn test_unknown_profession_is_other() {
        assert_eq!(Profession::parse("Warrior"), Profession::Warrior);
        assert_eq!(Profession::parse("bard"), Profession::Other);
        assert_eq!(Profession::Other.efficiency_multiplier(), 1.0);
    }

    #[test]
    fn test_rating_buckets() {
        assert_eq!(CombatRating::from_score(250.0), CombatRating::Legendary);
        assert_eq!(CombatRating::from_score(200.0), CombatRating::Legendary);
        assert_eq!(CombatRating::from_score(150.0), CombatRating::Epic);
        assert_eq!(CombatRating::from_score(120.0), CombatRating::Excellent);
        assert_eq!(CombatRating::from_score(80.0), CombatRating::Good);
        assert_eq!(CombatRating::from_score(60.0), CombatRating::Average);
        assert_eq!(CombatRating::from_score(59.9), CombatRating::Beginner);
    }

    #[test]
    fn test_summary_without_battles_has_zero_win_rate() {
        let summary = CombatSummary::new(0, 0, 1, 1, 0.0, 0);
        assert_eq!(summary.win_rate, 0.0);
        // 0 + 1*10 + 0
        assert!((summary.score - 10.0).abs() < 1e-9);
        assert_eq!(summary.rating, CombatRating::Beginner);
    }

    #[test]
    fn test_summary_score_caps_battle_count() {
        let summary = CombatSummary::new(400, 200, 3, 2, 0.1, 4);
        // 0.5*100 + 3*10 + 100*0.5
        assert!((summary.score - 130.0).abs() < 1e-9);
        assert_eq!(summary.defeats(), 200);
    }

    #[test]
    fn test_merge_adds_totals_and_combines_summaries() {
        let id = Uuid::new_v4();
        let mut first = SettlementResult::empty(id, Activity::Combat, 3);
        first.total_experience = 100;
        first.total_gold = 10;
        first.combat_summary = Some(CombatSummary::new(4, 3, 2, 2, 0.1, 0));

        let mut second = SettlementResult::empty(id, Activity::Combat, 3);
        second.total_experience = 50;
        second.total_gold = 5;
        second.combat_summary = Some(CombatSummary::new(2, 1, 4, 3, 0.2, 1));

        first.merge(second);
        assert_eq!(first.total_experience, 150);
        assert_eq!(first.total_gold, 15);
        let summary = first.combat_summary.unwrap();
        assert_eq!(summary.battles, 6);
        assert_eq!(summary.victories, 4);
        assert_eq!(summary.max_wave, 4);
        assert_eq!(summary.rests, 1);
    }

    #[test]
    fn test_enemy_tier_follows_wave() {
        assert_eq!(EnemyTier::for_wave(1), EnemyTier::Minion);
        assert_eq!(EnemyTier::for_wave(4), EnemyTier::Veteran);
        assert_eq!(EnemyTier::for_wave(20), EnemyTier::Warlord);
    }
}
