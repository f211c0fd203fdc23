//! XP leveling table

/// XP required to reach levels 1..=10
pub const LEVEL_THRESHOLDS: [u64; 10] = [0, 100, 250, 500, 1000, 1750, 2750, 4000, 6000, 9000];

pub const MAX_LEVEL: u8 = LEVEL_THRESHOLDS.len() as u8;

/// Level reached at a given XP total
pub fn level_for_xp(xp: u64) -> u8 {
    LEVEL_THRESHOLDS.iter().take_while(|&&t| xp >= t).count() as u8
}

/// XP needed for the next level, `None` at max level
pub fn xp_to_next(level: u8, xp: u64) -> Option<u64> {
    LEVEL_THRESHOLDS
        .get(level as usize)
        .map(|next| next.saturating_sub(xp))
}

/// Walk from `level` up to what `xp` allows, one step per threshold.
///
/// Returns every level entered, in order. Never moves down.
pub fn climb(level: u8, xp: u64) -> Vec<u8> {
    let mut current = level.max(1);
    let mut reached = Vec::new();
    while current < MAX_LEVEL && xp >= LEVEL_THRESHOLDS[current as usize] {
        current += 1;
        reached.push(current);
    }
    reached
}

/// Title shown next to the level number
pub fn title(level: u8) -> &'static str {
    match level {
        0..=1 => "Paper Hands",
        2 => "Degen Apprentice",
        3 => "Chart Watcher",
        4 => "HODLer",
        5 => "Diamond Hands",
        6 => "Market Mover",
        7 => "Whale Spotter",
        8 => "Alpha Caller",
        9 => "Crypto Oracle",
        _ => "Diamond Deity",
    }
}
