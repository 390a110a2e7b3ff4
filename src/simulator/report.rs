//! Simulation report generation.

use std::collections::HashMap;

use super::config::SimConfig;
use crate::core::types::{Activity, CombatRating};

/// Statistics for a single settlement run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub experience: u64,
    pub gold: u64,
    pub battles: u32,
    pub victories: u32,
    pub max_wave: u32,
    pub rests: u32,
    /// None for non-combat activities
    pub rating: Option<CombatRating>,
}

/// Aggregated results from multiple settlement runs.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub num_runs: u32,
    pub hours: f64,
    pub level: u32,
    pub activity: Activity,

    // Aggregated stats
    pub avg_experience: f64,
    pub avg_gold: f64,
    pub avg_battles: f64,
    pub avg_win_rate: f64,
    pub avg_max_wave: f64,
    pub avg_rests: f64,

    // Distribution data
    pub experience_distribution: Vec<u64>,
    pub rating_distribution: HashMap<CombatRating, u32>,

    // Individual run stats for detailed analysis
    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>, config: &SimConfig) -> Self {
        let num_runs = runs.len() as u32;
        let divisor = num_runs.max(1) as f64;

        let avg_experience = runs.iter().map(|r| r.experience as f64).sum::<f64>() / divisor;
        let avg_gold = runs.iter().map(|r| r.gold as f64).sum::<f64>() / divisor;
        let avg_battles = runs.iter().map(|r| r.battles as f64).sum::<f64>() / divisor;
        let avg_max_wave = runs.iter().map(|r| r.max_wave as f64).sum::<f64>() / divisor;
        let avg_rests = runs.iter().map(|r| r.rests as f64).sum::<f64>() / divisor;
        let avg_win_rate = runs
            .iter()
            .map(|r| {
                if r.battles > 0 {
                    r.victories as f64 / r.battles as f64
                } else {
                    0.0
                }
            })
            .sum::<f64>()
            / divisor;

        let mut experience_distribution: Vec<u64> = runs.iter().map(|r| r.experience).collect();
        experience_distribution.sort_unstable();

        let mut rating_distribution = HashMap::new();
        for rating in runs.iter().filter_map(|r| r.rating) {
            *rating_distribution.entry(rating).or_insert(0) += 1;
        }

        Self {
            num_runs,
            hours: config.effective_hours(),
            level: config.level,
            activity: config.activity,
            avg_experience,
            avg_gold,
            avg_battles,
            avg_win_rate,
            avg_max_wave,
            avg_rests,
            experience_distribution,
            rating_distribution,
            run_stats: runs,
        }
    }

    pub fn experience_per_hour(&self) -> f64 {
        if self.hours > 0.0 {
            self.avg_experience / self.hours
        } else {
            0.0
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                OFFLINE SETTLEMENT REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} | Activity: {} | Level {} | {:.1}h offline\n\n",
            self.num_runs,
            self.activity.name(),
            self.level,
            self.hours
        ));

        report.push_str("── REWARDS ──────────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Experience:      {:.0}\n",
            self.avg_experience
        ));
        report.push_str(&format!(
            "  Experience / Hour:   {:.1}\n",
            self.experience_per_hour()
        ));
        report.push_str(&format!("  Avg Gold:            {:.0}\n", self.avg_gold));
        let min_xp = self.experience_distribution.first().copied().unwrap_or(0);
        let max_xp = self.experience_distribution.last().copied().unwrap_or(0);
        let median_xp = self
            .experience_distribution
            .get(self.experience_distribution.len() / 2)
            .copied()
            .unwrap_or(0);
        report.push_str(&format!(
            "  Experience Range:    {} / {} / {} (min/median/max)\n\n",
            min_xp, median_xp, max_xp
        ));

        if self.activity == Activity::Combat {
            report.push_str("── COMBAT ───────────────────────────────────────────────────────\n");
            report.push_str(&format!("  Avg Battles:         {:.1}\n", self.avg_battles));
            report.push_str(&format!(
                "  Avg Win Rate:        {:.1}%\n",
                self.avg_win_rate * 100.0
            ));
            report.push_str(&format!("  Avg Max Wave:        {:.1}\n", self.avg_max_wave));
            report.push_str(&format!("  Avg Forced Rests:    {:.1}\n\n", self.avg_rests));

            report.push_str("── RATINGS ──────────────────────────────────────────────────────\n");
            for rating in CombatRating::all() {
                let count = self.rating_distribution.get(&rating).copied().unwrap_or(0);
                let pct = (count as f64 / self.num_runs.max(1) as f64) * 100.0;
                let bar: String = "█".repeat((pct / 5.0) as usize);
                report.push_str(&format!(
                    "  {:<10} {:>5.1}% {}\n",
                    rating.name(),
                    pct,
                    bar
                ));
            }
            report.push('\n');

            if self.avg_win_rate > 0.9 {
                report.push_str("  ⚠️  Win rate pinned near the cap - difficulty too low?\n");
            }
            if self.avg_rests > self.hours / 2.0 {
                report.push_str("  ⚠️  Frequent forced rests - fatigue too punishing?\n");
            }
        }

        report.push_str("═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl serde::Serialize for SimReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let ratings: HashMap<&str, u32> = self
            .rating_distribution
            .iter()
            .map(|(rating, count)| (rating.name(), *count))
            .collect();

        let mut state = serializer.serialize_struct("SimReport", 11)?;
        state.serialize_field("num_runs", &self.num_runs)?;
        state.serialize_field("hours", &self.hours)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("activity", &self.activity)?;
        state.serialize_field("avg_experience", &self.avg_experience)?;
        state.serialize_field("avg_gold", &self.avg_gold)?;
        state.serialize_field("avg_battles", &self.avg_battles)?;
        state.serialize_field("avg_win_rate", &self.avg_win_rate)?;
        state.serialize_field("avg_max_wave", &self.avg_max_wave)?;
        state.serialize_field("avg_rests", &self.avg_rests)?;
        state.serialize_field("rating_distribution", &ratings)?;
        state.end()
    }
}
