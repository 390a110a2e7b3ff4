//! Plain-text "welcome back" summaries for settled players and teams.

use crate::core::types::{RewardCategory, SettlementResult};

use super::TeamSettlement;

/// Format a number with abbreviated suffixes (K, M, B, T, Q).
pub fn format_number_short(n: u64) -> String {
    // (threshold, divisor, suffix)
    const TIERS: &[(u64, f64, &str)] = &[
        (1_000_000_000_000_000, 1e15, "Q"),
        (1_000_000_000_000, 1e12, "T"),
        (1_000_000_000, 1e9, "B"),
        (1_000_000, 1e6, "M"),
        (10_000, 1e3, "K"),
    ];

    for &(threshold, divisor, suffix) in TIERS {
        if n >= threshold {
            return format!("{:.1}{}", n as f64 / divisor, suffix);
        }
    }
    n.to_string()
}

/// "3h 12m" or "45m".
pub fn format_away(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn category_icon(category: RewardCategory) -> &'static str {
    match category {
        RewardCategory::Combat => "⚔️ ",
        RewardCategory::Gathering => "🌿",
        RewardCategory::Crafting => "🔨",
        RewardCategory::Idle => "💤",
        RewardCategory::TeamCooperation => "🤝",
        RewardCategory::TeamBonus => "⭐",
    }
}

/// Lines shown to a player on reconnect.
pub fn player_summary(result: &SettlementResult) -> Vec<String> {
    let mut lines = vec![format!("  Away for: {}", format_away(result.offline_seconds))];

    if result.is_empty() {
        lines.push("  Nothing happened while you were away.".to_string());
        return lines;
    }

    lines.push(String::new());
    for entry in &result.rewards {
        lines.push(format!(
            "  {} {} (+{} XP, +{} gold)",
            category_icon(entry.category),
            entry.description,
            format_number_short(entry.experience),
            format_number_short(entry.gold)
        ));
    }

    if let Some(summary) = &result.combat_summary {
        lines.push(String::new());
        lines.push(format!(
            "  Battles: {} won / {} lost, {:.0}% win rate, rated {}",
            summary.victories,
            summary.defeats(),
            summary.win_rate * 100.0,
            summary.rating.name()
        ));
        if summary.rests > 0 {
            lines.push(format!("  Forced rests: {}", summary.rests));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "  XP Gained:   {:>10}",
        format_number_short(result.total_experience)
    ));
    lines.push(format!(
        "  Gold Gained: {:>10}",
        format_number_short(result.total_gold)
    ));
    if result.leveled_up() {
        lines.push(format!(
            "  📈 Levels:   {:>10}",
            format!(
                "+{} ({} → {})",
                result.level_after - result.level_before,
                result.level_before,
                result.level_after
            )
        ));
    }

    lines
}

/// Lines describing a whole team settlement.
pub fn team_summary(team: &TeamSettlement) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  Team sync: {:.0}% ({}), {} members",
            team.sync.sync_rate * 100.0,
            team.sync.mode.name(),
            team.results.len()
        ),
        format!(
            "  Offline spread: {} to {} (σ {:.1}h)",
            format_away(team.sync.min_seconds),
            format_away(team.sync.max_seconds),
            team.sync.std_dev_hours
        ),
    ];

    if team.plan.mode.is_cooperative() {
        lines.push(format!(
            "  Fought together for up to {} at x{:.2}",
            format_away(team.plan.segment_seconds),
            team.plan.team_bonus
        ));
    }
    if team.bonus_rates.level_rate > 0.0 || team.bonus_rates.loyalty_rate > 0.0 {
        lines.push(format!(
            "  Team bonuses: +{:.1}% XP, +{:.1}% gold",
            team.bonus_rates.level_rate * 100.0,
            team.bonus_rates.loyalty_rate * 100.0
        ));
    }

    lines.push(String::new());
    for result in &team.results {
        lines.push(format!(
            "  {}  {:>8} XP  {:>8} gold  Lv {}",
            result.player_id,
            format_number_short(result.total_experience),
            format_number_short(result.total_gold),
            result.level_after
        ));
    }
    lines.push(format!(
        "  Total: {} XP, {} gold",
        format_number_short(team.total_experience()),
        format_number_short(team.total_gold())
    ));

    lines
}
