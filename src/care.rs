//! Care statistics: hunger, mood, energy, cleanliness.
//!
//! Each statistic lives in 0..=100 and decays by one point every N minutes
//! of monotonic time.  Positive changes that actually raise a statistic
//! award XP (one point per ten recovered); the XP itself is handed back to
//! the caller so that [`PetState`](crate::pet::PetState) can route it into
//! the level tracker.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::timing::elapsed;

pub const STAT_MAX: u8 = 100;

/// Starting value for a pet with no stored snapshot.
pub const DEFAULT_STAT_VALUE: u8 = 30;

const ATTENTION_BAND: core::ops::RangeInclusive<u8> = 20..=39;
const DECAY_TICK_MS: u32 = 60 * 1000;

/// One of the four care statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stat {
    Hunger = 0,
    Mood = 1,
    Energy = 2,
    Cleanliness = 3,
}

impl Stat {
    pub const COUNT: usize = 4;
    pub const ALL: [Stat; Self::COUNT] = [Self::Hunger, Self::Mood, Self::Energy, Self::Cleanliness];

    /// Stat for a panel index; wraps modulo [`Self::COUNT`].
    pub fn from_index(idx: usize) -> Self {
        Self::ALL[idx % Self::COUNT]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for Stat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Hunger => "hunger",
            Self::Mood => "mood",
            Self::Energy => "energy",
            Self::Cleanliness => "cleanliness",
        };
        f.write_str(name)
    }
}

/// A point-in-time copy of all four statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareReading {
    pub hunger: u8,
    pub mood: u8,
    pub energy: u8,
    pub cleanliness: u8,
}

impl CareReading {
    pub const fn uniform(v: u8) -> Self {
        Self {
            hunger: v,
            mood: v,
            energy: v,
            cleanliness: v,
        }
    }

    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hunger => self.hunger,
            Stat::Mood => self.mood,
            Stat::Energy => self.energy,
            Stat::Cleanliness => self.cleanliness,
        }
    }

    pub fn min(&self) -> u8 {
        self.hunger.min(self.mood).min(self.energy).min(self.cleanliness)
    }

    pub fn all_at_least(&self, threshold: u8) -> bool {
        self.min() >= threshold
    }

    pub fn all_above(&self, threshold: u8) -> bool {
        self.min() > threshold
    }
}

/// In-memory care statistics with minute-granular decay.
#[derive(Debug, Clone)]
pub struct CareState {
    values: [u8; Stat::COUNT],
    decay_minutes: [u16; Stat::COUNT],
    /// Minutes accumulated toward each stat's next decay step.
    accumulated: [u32; Stat::COUNT],
    last_decay_at: Option<u32>,
    decay_suspended: bool,
}

impl CareState {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_reading(config, CareReading::uniform(DEFAULT_STAT_VALUE))
    }

    pub fn with_reading(config: &EngineConfig, reading: CareReading) -> Self {
        let mut values = [0; Stat::COUNT];
        for stat in Stat::ALL {
            values[stat.index()] = reading.get(stat).min(STAT_MAX);
        }
        Self {
            values,
            decay_minutes: [
                config.hunger_decay_min,
                config.mood_decay_min,
                config.energy_decay_min,
                config.cleanliness_decay_min,
            ],
            accumulated: [0; Stat::COUNT],
            last_decay_at: None,
            decay_suspended: false,
        }
    }

    pub fn get(&self, stat: Stat) -> u8 {
        self.values[stat.index()]
    }

    pub fn reading(&self) -> CareReading {
        CareReading {
            hunger: self.get(Stat::Hunger),
            mood: self.get(Stat::Mood),
            energy: self.get(Stat::Energy),
            cleanliness: self.get(Stat::Cleanliness),
        }
    }

    /// Apply `delta` with clamping.  Returns the XP earned (0 for
    /// decreases or when the stat was already full).
    pub fn add(&mut self, stat: Stat, delta: i16) -> u32 {
        let old = self.values[stat.index()];
        let new = (i16::from(old) + delta).clamp(0, i16::from(STAT_MAX)) as u8;
        self.values[stat.index()] = new;
        if delta > 0 && old < STAT_MAX {
            u32::from(new - old) / 10
        } else {
            0
        }
    }

    /// Advance decay to `now_ms`.  Whole minutes only; the remainder
    /// carries over to the next call.
    pub fn decay(&mut self, now_ms: u32) {
        let Some(last) = self.last_decay_at else {
            self.last_decay_at = Some(now_ms);
            return;
        };
        if self.decay_suspended {
            self.last_decay_at = Some(now_ms);
            return;
        }

        let minutes = elapsed(now_ms, last) / DECAY_TICK_MS;
        if minutes == 0 {
            return;
        }
        self.last_decay_at = Some(last.wrapping_add(minutes * DECAY_TICK_MS));

        for stat in Stat::ALL {
            let i = stat.index();
            let per_point = u32::from(self.decay_minutes[i]);
            if per_point == 0 {
                continue;
            }
            self.accumulated[i] += minutes;
            let steps = self.accumulated[i] / per_point;
            if steps > 0 {
                self.accumulated[i] -= steps * per_point;
                self.values[i] = self.values[i].saturating_sub(steps.min(255) as u8);
            }
        }
    }

    /// Freeze decay (e.g. while hatching).  Time spent suspended is not
    /// charged when decay resumes.
    pub fn set_decay_suspended(&mut self, suspended: bool, now_ms: u32) {
        if self.decay_suspended != suspended {
            self.decay_suspended = suspended;
            self.last_decay_at = Some(now_ms);
        }
    }

    /// Any statistic in the "needs attention" band.
    pub fn needs_attention(&self) -> bool {
        self.values.iter().any(|v| ATTENTION_BAND.contains(v))
    }

    /// Any statistic fully depleted.
    pub fn is_critical(&self) -> bool {
        self.values.contains(&0)
    }
}
