//! Achievement catalogue

use crate::profile::PlayerProfile;
use crate::round::{RoundRecord, RoundStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstBlood,
    HatTrick,
    OnFire,
    Unstoppable,
    WhaleRider,
    Veteran,
    Sharpshooter,
    ComebackKid,
}

/// Unlock predicate over the updated profile and the round just settled
pub type UnlockCheck = fn(&PlayerProfile, &RoundRecord) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub reward: u64,
    pub check: UnlockCheck,
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.description)
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: AchievementId::FirstBlood,
        name: "First Blood",
        description: "Win your first prediction",
        reward: 100,
        check: |p, _| p.wins >= 1,
    },
    Achievement {
        id: AchievementId::HatTrick,
        name: "Hat Trick",
        description: "Reach a 3 win streak",
        reward: 150,
        check: |p, _| p.streak >= 3,
    },
    Achievement {
        id: AchievementId::OnFire,
        name: "On Fire",
        description: "Reach a 5 win streak",
        reward: 300,
        check: |p, _| p.streak >= 5,
    },
    Achievement {
        id: AchievementId::Unstoppable,
        name: "Unstoppable",
        description: "Reach a 10 win streak",
        reward: 1000,
        check: |p, _| p.streak >= 10,
    },
    Achievement {
        id: AchievementId::WhaleRider,
        name: "Whale Rider",
        description: "Win a round in Whale Mode",
        reward: 250,
        check: |_, r| r.whale_mode && r.is_win(),
    },
    Achievement {
        id: AchievementId::Veteran,
        name: "Veteran",
        description: "Make 50 predictions",
        reward: 200,
        check: |p, _| p.total_predictions >= 50,
    },
    Achievement {
        id: AchievementId::Sharpshooter,
        name: "Sharpshooter",
        description: "Win 25 predictions",
        reward: 500,
        check: |p, _| p.wins >= 25,
    },
    Achievement {
        id: AchievementId::ComebackKid,
        name: "Comeback Kid",
        description: "Win right after losing a streak of 3+",
        reward: 150,
        check: comeback,
    },
];

fn comeback(profile: &PlayerProfile, latest: &RoundRecord) -> bool {
    if !latest.is_win() {
        return false;
    }
    // history[0] is the round being settled
    profile
        .history
        .iter()
        .skip(1)
        .find(|r| r.status != RoundStatus::Failed)
        .map(|prev| prev.status == RoundStatus::Lost && prev.streak_lost >= 3)
        .unwrap_or(false)
}

pub fn find(id: AchievementId) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}
