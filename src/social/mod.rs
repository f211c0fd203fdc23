//! Chat-facing messages and leaderboard ranking
//!
//! Everything here is formatting: no state is read back from this layer.
//! Messages use Telegram HTML parse mode.

mod leaderboard;

pub use leaderboard::{leaderboard, rank, LeaderboardMetric, LEADERBOARD_SIZE};

use crate::config::GameConfig;
use crate::profile::PlayerProfile;
use crate::progression::{levels, Achievement, DailyChallenge};
use crate::round::{PowerUpCost, PredictionRound, RoundRecord, RoundReport, RoundStatus};
use crate::types::{ApiTier, Direction, PowerUp, Symbol};
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;

const WIN_RESPONSES: &[&str] = &[
    "🚀 WAGMI! You just went to the moon!",
    "💎 Diamond hands paid off! Shard tokens incoming!",
    "🦍 Ape strong! Your streak is pumping!",
    "⚡ Lightning prediction! The market can't stop you!",
    "🔥 Absolutely based! You're built different!",
];

const LOSE_RESPONSES: &[&str] = &[
    "😵 REKT! The market humbled you this time",
    "📉 Oof, that's a rug pull on your streak",
    "🤡 Paper hands move right there, anon",
    "💸 The market gods demand sacrifice",
];

const TAUNTS: &[&str] = &[
    "🚨 {name} just hit a {streak} streak! Who thinks they can beat this legend? 🏆",
    "⚡ {name} is absolutely dominating with {streak} wins! Step up or step aside! 💎",
    "🔥 {name} is on fire! {streak} predictions in a row! Anyone brave enough to challenge? 🎯",
    "👑 All hail {name}! {streak} streak achieved! The markets bow to your wisdom! 🧠",
];

const FUD_EVENTS: &[&str] = &[
    "📰 BREAKING: Elon tweets about your prediction!",
    "🏛️ Government FUD incoming! Difficulty raised!",
    "🐋 Whale movement detected! Market volatility high!",
    "📊 Technical analysis says you're wrong (probably)",
    "🌙 Lunar eclipse affecting crypto vibes!",
];

const MILESTONES: &[(u32, &str)] = &[
    (5, "🎉 First milestone! You're getting the hang of this!"),
    (10, "🔥 Double digits! The market is starting to fear you!"),
    (15, "⚡ Absolute unit! You're in the top 1% of predictors!"),
    (20, "🏆 LEGEND STATUS! Your prediction game is otherworldly!"),
    (25, "👑 CRYPTO ORACLE! The blockchain itself bows to you!"),
    (50, "🚀 TO THE MOON! You've transcended human prediction limits!"),
    (100, "💎 DIAMOND DEITY! You ARE the market!"),
];

fn pick(options: &[&'static str]) -> &'static str {
    options.choose(&mut rand::rng()).copied().unwrap_or_default()
}

/// Escape text for HTML parse mode
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn og_badge(profile: &PlayerProfile) -> &'static str {
    if profile.og {
        " 👑"
    } else {
        ""
    }
}

fn format_price(price: Decimal) -> String {
    if price >= Decimal::ONE_HUNDRED {
        format!("${:.2}", price)
    } else {
        format!("${:.4}", price)
    }
}

pub fn help_text() -> String {
    "🎮 <b>CRYPTO CLASH</b> 🎮\n\n\
    Predict if a coin moves 1%+ UP ⬆️ or DOWN ⬇️ within 60 seconds.\n\n\
    <b>Play</b>\n\
    /predict [coin] up|down [whale] - Start a round (coin random if omitted)\n\
    /results - Your recent rounds\n\
    /check - Resolve an overdue round\n\n\
    <b>Progress</b>\n\
    /profile - Level, XP, tokens and achievements\n\
    /leaderboard [wins|streak] - Chat rankings\n\
    /daily - Claim airdrop and see today's challenge\n\
    /shop [whale|shield] - Buy power-ups\n\n\
    /challenge - Group battles\n\
    /test_api - Price oracle status\n\
    /help - Show this message\n\n\
    Coins: BTC, ETH, BNB, ADA, SOL"
        .to_string()
}

pub fn welcome(profile: &PlayerProfile) -> String {
    let og_line = if profile.og {
        "\n👑 Congratulations! You're an OG in this group!\n"
    } else {
        ""
    };
    format!(
        "🎮 <b>CRYPTO CLASH</b> 🎮\n\
        GM {}! Ready to prove your diamond hands? 💎\n\n\
        🎯 <b>How to Play:</b>\n\
        • Predict if crypto goes UP ⬆️ or DOWN ⬇️ in 60 seconds\n\
        • Need a 1%+ move to win\n\
        • Build streaks for bigger rewards\n\
        • Earn Shard Tokens 💎\n\n\
        💰 <b>Your Stats:</b>\n\
        • Shard Tokens: {} 💎\n\
        • Level: {} ({})\n\
        • Best Streak: {} 🔥\n{}\n\
        Use /predict to start or /help for all commands. WAGMI! 🚀",
        escape(&profile.display_name),
        profile.tokens,
        profile.level,
        levels::title(profile.level),
        profile.best_streak,
        og_line,
    )
}

pub fn round_started(round: &PredictionRound, profile: &PlayerProfile, round_secs: u64) -> String {
    let mut text = format!(
        "✅ <b>PREDICTION LOCKED</b>{}\n\n\
        💰 {} {} {}\n\
        💵 Entry: {}\n\
        🎯 Needs {}{}% within {}s\n",
        og_badge(profile),
        round.symbol,
        round.direction.emoji(),
        round.direction,
        format_price(round.start_price),
        if round.direction == Direction::Up { "+" } else { "-" },
        round.threshold_pct,
        round_secs,
    );
    if round.whale_mode {
        text.push_str("🐋 WHALE MODE ACTIVE (3x)\n");
    }
    if round.fud {
        text.push_str(&format!("🚨 <b>FUD EVENT:</b> {}\n", pick(FUD_EVENTS)));
    }
    text.push_str(&format!(
        "\n💎 Tokens: {} | Streak: {}🔥\n🤞 HODL tight!",
        profile.tokens, profile.streak
    ));
    text
}

pub fn round_result(report: &RoundReport) -> String {
    let profile = &report.progression.profile;
    let round = &report.round;
    let outcome = &report.outcome;
    let sign = if round.direction == Direction::Up { "+" } else { "-" };

    let header = if outcome.won {
        format!("🎉 <b>PREDICTION WON!</b> 🎉\n\n{}", pick(WIN_RESPONSES))
    } else {
        format!("💸 <b>PREDICTION LOST</b> 💸\n\n{}", pick(LOSE_RESPONSES))
    };

    let mut text = format!(
        "{}\n\n📊 <b>{}</b>: {} → {}\n{} Change: {:+.2}% (needed {}{}%)\n\n",
        header,
        round.symbol,
        format_price(outcome.start_price),
        format_price(outcome.end_price),
        if outcome.change_pct >= Decimal::ZERO { "📈" } else { "📉" },
        outcome.change_pct,
        sign,
        round.threshold_pct,
    );

    if outcome.won {
        text.push_str(&format!(
            "💎 +{} Shard Tokens{}\n⭐ +{} XP\n🔥 Streak: {}\n",
            report.settlement.tokens,
            if round.whale_mode { " (🐋 3x)" } else { "" },
            report.settlement.xp,
            profile.streak,
        ));
    } else {
        text.push_str(&format!("⭐ +{} XP\n", report.settlement.xp));
        if report.settlement.shield_used {
            text.push_str(&format!("🛡 Streak Shield absorbed the loss! Streak: {}🔥\n", profile.streak));
        } else if report.settlement.streak_lost > 0 {
            text.push_str(&format!("💔 Streak of {} reset to 0\n", report.settlement.streak_lost));
        }
    }

    text.push_str(&format!(
        "\n💰 Total: {} 💎 | Level {}\n\nUse /predict for another round! 🚀",
        profile.tokens, profile.level
    ));
    text
}

pub fn round_failed(round: &PredictionRound) -> String {
    let refund = match round.power_up_cost {
        PowerUpCost::None => String::new(),
        PowerUpCost::Inventory => "\n🐋 Your Whale power-up was returned.".to_string(),
        PowerUpCost::Tokens(t) => format!("\n🐋 {} tokens refunded.", t),
    };
    format!(
        "🔧 <b>ERROR</b>\n\nPrice oracle failed for {}, prediction cancelled!\n\
        Your tokens and streak are safe! 💎{}\n\nUse /predict to try again!",
        round.symbol, refund
    )
}

pub fn achievement_unlocked(name: &str, achievement: &Achievement) -> String {
    format!(
        "🏅 <b>ACHIEVEMENT UNLOCKED</b>\n\n{} earned <b>{}</b>: {}\n💎 +{} Shard Tokens",
        escape(name),
        achievement.name,
        achievement.description,
        achievement.reward
    )
}

pub fn level_up(name: &str, level: u8) -> String {
    format!(
        "⬆️ <b>LEVEL UP!</b> {} reached level {}: <i>{}</i>",
        escape(name),
        level,
        levels::title(level)
    )
}

pub fn challenge_completed(name: &str, challenge: &DailyChallenge) -> String {
    format!(
        "🎯 <b>DAILY CHALLENGE COMPLETE</b>\n\n{} finished \"{}\"\n💎 +{} Shard Tokens",
        escape(name),
        challenge.description(),
        challenge.reward
    )
}

pub fn is_taunt_milestone(streak: u32, every: u32) -> bool {
    every > 0 && streak > 0 && streak % every == 0
}

pub fn milestone_celebration(streak: u32) -> Option<&'static str> {
    MILESTONES.iter().find(|(s, _)| *s == streak).map(|(_, text)| *text)
}

pub fn streak_taunt(name: &str, streak: u32) -> String {
    let mut text = pick(TAUNTS)
        .replace("{name}", &escape(name))
        .replace("{streak}", &streak.to_string());
    if let Some(celebration) = milestone_celebration(streak) {
        text.push_str("\n🎊 MILESTONE: ");
        text.push_str(celebration);
    }
    text
}

pub fn profile_card(profile: &PlayerProfile) -> String {
    let next = match profile.xp_to_next_level() {
        Some(xp) => format!("{} XP to next level", xp),
        None => "max level".to_string(),
    };
    let achievements = if profile.achievements.is_empty() {
        "none yet".to_string()
    } else {
        profile
            .achievements
            .iter()
            .filter_map(|id| crate::progression::achievements::find(*id))
            .map(|a| a.name)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "📊 <b>{}'s STATS</b>{}\n\n\
        ⭐ Level {} ({}) | {} XP, {}\n\n\
        🎯 <b>Performance:</b>\n\
        • Total Predictions: {}\n\
        • Wins: {}\n\
        • Win Rate: {:.1}%\n\
        • Current Streak: {}🔥\n\
        • Best Streak: {}🏆\n\n\
        💰 <b>Assets:</b>\n\
        • Shard Tokens: {}💎\n\
        • Whale Mode: {}🐋\n\
        • Streak Shield: {}🛡\n\n\
        🏅 <b>Achievements:</b> {}",
        escape(&profile.display_name),
        og_badge(profile),
        profile.level,
        levels::title(profile.level),
        profile.xp,
        next,
        profile.total_predictions,
        profile.wins,
        profile.win_rate(),
        profile.streak,
        profile.best_streak,
        profile.tokens,
        profile.power_up_count(PowerUp::WhaleMode),
        profile.power_up_count(PowerUp::StreakShield),
        achievements,
    )
}

pub fn shop_menu(profile: &PlayerProfile, config: &GameConfig) -> String {
    let mut text = String::from("🛒 <b>POWER-UP SHOP</b>\n\n");
    for item in PowerUp::ALL {
        let blurb = match item {
            PowerUp::WhaleMode => "3x tokens on a win, spent when the round starts",
            PowerUp::StreakShield => "Keeps your streak through one loss",
        };
        text.push_str(&format!(
            "{} <b>{}</b>: {} 💎 (owned: {})\n   {}\n",
            item.emoji(),
            item.name(),
            config.price_of(item),
            profile.power_up_count(item),
            blurb
        ));
    }
    text.push_str(&format!(
        "\n💰 Balance: {} 💎\nBuy with /shop whale or /shop shield",
        profile.tokens
    ));
    text
}

pub fn purchase_receipt(profile: &PlayerProfile, item: PowerUp, price: u64) -> String {
    format!(
        "✅ Bought {} {} for {} 💎\nOwned: {} | Balance: {} 💎",
        item.emoji(),
        item.name(),
        price,
        profile.power_up_count(item),
        profile.tokens
    )
}

pub fn airdrop_claimed(amount: u64, total: u64) -> String {
    format!(
        "🪂 <b>DAILY AIRDROP</b> 🪂\n\nGM anon! You received {} Shard Tokens! 💎\n💰 Total: {} tokens",
        amount, total
    )
}

pub fn daily_challenge(challenge: &DailyChallenge) -> String {
    let status = if challenge.completed {
        "✅ Completed".to_string()
    } else {
        format!("{}/{}", challenge.progress, challenge.target)
    };
    format!(
        "🎯 <b>Today's challenge:</b> {}\nProgress: {} | Reward: {} 💎\nResets {}",
        challenge.description(),
        status,
        challenge.reward,
        challenge.expires_at().format("%Y-%m-%d %H:%M UTC"),
    )
}

fn record_line(index: usize, record: &RoundRecord) -> String {
    let status = match &record.status {
        RoundStatus::Won { tokens } => format!("✅ WON (+{} tokens)", tokens),
        RoundStatus::Lost => "❌ LOST".to_string(),
        RoundStatus::Failed => "🔧 ERROR".to_string(),
    };
    match (record.end_price, record.change_pct) {
        (Some(end), Some(change)) => format!(
            "{}. {} {} {}→{} ({:+.2}%) - {}{}\n",
            index,
            record.symbol,
            record.direction,
            format_price(record.start_price),
            format_price(end),
            change,
            status,
            if record.whale_mode { " 🐋" } else { "" },
        ),
        _ => format!(
            "{}. {} {} {} - {}\n",
            index,
            record.symbol,
            record.direction,
            format_price(record.start_price),
            status
        ),
    }
}

pub fn results(profile: &PlayerProfile, active: Option<&PredictionRound>, now: DateTime<Utc>) -> String {
    if active.is_none() && profile.history.is_empty() {
        return "📊 <b>NO PREDICTIONS YET</b>\n\nUse /predict to start your first prediction! 🚀"
            .to_string();
    }

    let mut text = format!("📊 <b>{}'s RECENT PREDICTIONS</b>\n\n", escape(&profile.display_name));
    if let Some(round) = active {
        if round.is_due(now) {
            text.push_str(&format!(
                "🔄 {} {} {} - ⏰ PENDING RESULT (try /check)\n",
                round.symbol,
                round.direction,
                format_price(round.start_price)
            ));
        } else {
            text.push_str(&format!(
                "🔄 {} {} {} - ACTIVE ({}s left)\n",
                round.symbol,
                round.direction,
                format_price(round.start_price),
                round.remaining_secs(now)
            ));
        }
    }
    for (i, record) in profile.history.iter().take(5).enumerate() {
        text.push_str(&record_line(i + 1, record));
    }
    text.push_str("\nUse /predict to make a new prediction! 🎯");
    text
}

pub fn battles_coming_soon() -> String {
    "🔥 <b>GROUP BATTLES COMING SOON!</b> 🔥\n\n\
    Soon you'll be able to challenge other Telegram groups!\n\
    For now, dominate your local leaderboard with /predict 💪"
        .to_string()
}

pub fn oracle_status(tier: ApiTier, result: Result<Decimal, String>, elapsed_ms: u128, cooldown_secs: u64) -> String {
    match result {
        Ok(price) => format!(
            "✅ <b>API TEST SUCCESSFUL</b>\n\n\
            • Tier: {} API\n\
            • Response Time: {}ms\n\
            • Test Price: {} = {}\n\
            • Cooldown: {}s between predictions\n\n\
            🚀 Ready for predictions!",
            tier,
            elapsed_ms,
            Symbol::Btc,
            format_price(price),
            cooldown_secs
        ),
        Err(reason) => format!(
            "❌ <b>API TEST FAILED</b>\n\n\
            • Tier: {} API\n\
            • Issue: {}\n\n\
            Try /test_api again in a few minutes ⏰",
            tier,
            escape(&reason)
        ),
    }
}
