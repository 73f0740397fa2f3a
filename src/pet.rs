//! The pet's persistent condition: care statistics plus level progress.
//!
//! [`PetState`] is the production implementation of both
//! [`CareStats`] and [`FeatureGate`]; XP earned by care rewards flows
//! straight into the level tracker.  [`PetSnapshot`] is the serialisable
//! form written to NVS.

use serde::{Deserialize, Serialize};

use crate::app::ports::{CareStats, FeatureGate, PetRecord};
use crate::care::{CareReading, CareState, Stat};
use crate::config::EngineConfig;
use crate::level::{Feature, LevelProgress};

/// Persisted pet record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSnapshot {
    pub stats: CareReading,
    pub level: u16,
    pub xp: u32,
    pub hatched: bool,
}

pub struct PetState {
    care: CareState,
    level: LevelProgress,
    hatched: bool,
}

impl PetState {
    /// A brand-new, unhatched pet.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            care: CareState::new(config),
            level: LevelProgress::default(),
            hatched: false,
        }
    }

    pub fn from_snapshot(config: &EngineConfig, snap: &PetSnapshot) -> Self {
        Self {
            care: CareState::with_reading(config, snap.stats),
            level: LevelProgress::new(snap.level, snap.xp),
            hatched: snap.hatched,
        }
    }

    pub fn snapshot(&self) -> PetSnapshot {
        PetSnapshot {
            stats: self.care.reading(),
            level: self.level.level(),
            xp: self.level.xp(),
            hatched: self.hatched,
        }
    }

    pub fn care(&self) -> &CareState {
        &self.care
    }

    pub fn level(&self) -> &LevelProgress {
        &self.level
    }
}

impl CareStats for PetState {
    fn stat(&self, stat: Stat) -> u8 {
        self.care.get(stat)
    }

    fn add(&mut self, stat: Stat, delta: i16) {
        let xp = self.care.add(stat, delta);
        self.level.add_xp(xp);
    }
}

impl FeatureGate for PetState {
    fn is_unlocked(&self, feature: Feature) -> bool {
        self.level.is_unlocked(feature)
    }
}

impl PetRecord for PetState {
    fn is_hatched(&self) -> bool {
        self.hatched
    }

    fn mark_hatched(&mut self) {
        self.hatched = true;
    }

    fn decay(&mut self, now_ms: u32) {
        self.care.decay(now_ms);
    }

    fn set_decay_suspended(&mut self, suspended: bool, now_ms: u32) {
        self.care.set_decay_suspended(suspended, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn care_rewards_feed_level_progress() {
        let cfg = EngineConfig::default();
        let mut pet = PetState::new(&cfg);
        pet.add_mood(50); // 30 -> 80: 5 XP
        assert_eq!(pet.mood(), 80);
        assert_eq!(pet.level().xp(), 5);
    }

    #[test]
    fn snapshot_roundtrip_through_postcard() {
        let cfg = EngineConfig::default();
        let mut pet = PetState::new(&cfg);
        pet.add_hunger(40);
        pet.mark_hatched();
        let bytes = postcard::to_allocvec(&pet.snapshot()).unwrap();
        let snap: PetSnapshot = postcard::from_bytes(&bytes).unwrap();
        let restored = PetState::from_snapshot(&cfg, &snap);
        assert_eq!(restored.hunger(), 70);
        assert!(restored.is_hatched());
        assert_eq!(restored.level().xp(), 4);
    }

    #[test]
    fn feature_gate_delegates_to_level() {
        let cfg = EngineConfig::default();
        let snap = PetSnapshot {
            stats: CareReading::uniform(50),
            level: 7,
            xp: 0,
            hatched: true,
        };
        let pet = PetState::from_snapshot(&cfg, &snap);
        assert!(pet.is_unlocked(Feature::EmoLove));
        assert!(!pet.is_unlocked(Feature::IdleJudging));
    }
}
