//! Level progression and feature unlocks.
//!
//! | Level | Unlocks                     |
//! |-------|-----------------------------|
//! | 1     | Sad1, Happy1                |
//! | 2     | Excited                     |
//! | 3     | idle jitter                 |
//! | 4     | Angry1                      |
//! | 5     | idle giggle                 |
//! | 7     | Love                        |
//! | 10    | idle judging                |
//! | 12    | fast idle look speed        |

use log::info;

use crate::app::ports::FeatureGate;

const BASE_XP: u32 = 50;
const STEP_XP: u32 = 25;

/// Features gated behind a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    EmoSad1,
    EmoHappy1,
    EmoExcited,
    IdleJitter,
    EmoAngry1,
    IdleGiggle,
    EmoLove,
    IdleJudging,
    IdleSpeedFast,
}

impl Feature {
    /// Level at which this feature becomes available.
    pub const fn unlock_level(self) -> u16 {
        match self {
            Self::EmoSad1 | Self::EmoHappy1 => 1,
            Self::EmoExcited => 2,
            Self::IdleJitter => 3,
            Self::EmoAngry1 => 4,
            Self::IdleGiggle => 5,
            Self::EmoLove => 7,
            Self::IdleJudging => 10,
            Self::IdleSpeedFast => 12,
        }
    }
}

/// Level and XP counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    level: u16,
    xp: u32,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self { level: 1, xp: 0 }
    }
}

impl LevelProgress {
    pub fn new(level: u16, xp: u32) -> Self {
        Self {
            level: level.max(1),
            xp,
        }
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// XP needed to leave the current level.
    pub fn xp_for_next_level(&self) -> u32 {
        BASE_XP + u32::from(self.level) * STEP_XP
    }

    /// Add XP, levelling up as many times as it covers.  Returns `true`
    /// if at least one level was gained.
    pub fn add_xp(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        self.xp += amount;
        let mut levelled = false;
        while self.xp >= self.xp_for_next_level() {
            self.xp -= self.xp_for_next_level();
            self.level = self.level.saturating_add(1);
            levelled = true;
            info!("LEVEL UP | reached level {}", self.level);
        }
        levelled
    }
}

impl FeatureGate for LevelProgress {
    fn is_unlocked(&self, feature: Feature) -> bool {
        self.level >= feature.unlock_level()
    }
}
