//! Per-chat rankings

use super::escape;
use crate::error::BotError;
use crate::profile::PlayerProfile;
use std::cmp::Ordering;
use std::str::FromStr;

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardMetric {
    #[default]
    Wins,
    Streak,
}

impl LeaderboardMetric {
    fn label(self) -> &'static str {
        match self {
            LeaderboardMetric::Wins => "wins",
            LeaderboardMetric::Streak => "best streak",
        }
    }

    fn value(self, profile: &PlayerProfile) -> u32 {
        match self {
            LeaderboardMetric::Wins => profile.wins,
            LeaderboardMetric::Streak => profile.best_streak,
        }
    }

    fn other(self) -> Self {
        match self {
            LeaderboardMetric::Wins => LeaderboardMetric::Streak,
            LeaderboardMetric::Streak => LeaderboardMetric::Wins,
        }
    }
}

impl FromStr for LeaderboardMetric {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "wins" | "win" => Ok(LeaderboardMetric::Wins),
            "streak" | "streaks" | "best" => Ok(LeaderboardMetric::Streak),
            other => Err(BotError::InvalidCommand(format!(
                "unknown leaderboard '{}', use wins or streak",
                other
            ))),
        }
    }
}

/// Higher metric first; ties go to fewer attempts, then the other metric,
/// then the older account id.
fn compare(metric: LeaderboardMetric, a: &PlayerProfile, b: &PlayerProfile) -> Ordering {
    metric
        .value(b)
        .cmp(&metric.value(a))
        .then_with(|| a.total_predictions.cmp(&b.total_predictions))
        .then_with(|| metric.other().value(b).cmp(&metric.other().value(a)))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Top players by `metric`; players who never predicted are left out
pub fn rank(profiles: Vec<PlayerProfile>, metric: LeaderboardMetric) -> Vec<PlayerProfile> {
    let mut ranked: Vec<PlayerProfile> = profiles
        .into_iter()
        .filter(|p| p.total_predictions > 0)
        .collect();
    ranked.sort_by(|a, b| compare(metric, a, b));
    ranked.truncate(LEADERBOARD_SIZE);
    ranked
}

pub fn leaderboard(profiles: Vec<PlayerProfile>, metric: LeaderboardMetric) -> String {
    let ranked = rank(profiles, metric);
    if ranked.is_empty() {
        return "🏆 No predictions in this chat yet. Be the first with /predict!".to_string();
    }

    let mut text = format!("🏆 <b>LEADERBOARD</b> (by {})\n\n", metric.label());
    for (i, profile) in ranked.iter().enumerate() {
        let medal = match i {
            0 => "🥇".to_string(),
            1 => "🥈".to_string(),
            2 => "🥉".to_string(),
            n => format!("{}.", n + 1),
        };
        text.push_str(&format!(
            "{} {}{} - {} wins | best {}🔥 | {:.0}%\n",
            medal,
            escape(&profile.display_name),
            if profile.og { " 👑" } else { "" },
            profile.wins,
            profile.best_streak,
            profile.win_rate(),
        ));
    }
    text
}
