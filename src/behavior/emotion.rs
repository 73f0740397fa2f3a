//! Emotion scheduler.
//!
//! One emotion is current at a time.  Every emotion other than `Idle` is
//! timed: it plays for a fixed duration and then reverts to `Idle`, after
//! which the next pick is scheduled 7–15 s out.  When a pick is due and
//! the idle scheduler is quiet, the next emotion comes from the mood
//! snapshot's forced list (round-robin) or, failing that, a weighted draw
//! that skips suppressed entries.

use log::info;

use crate::config::EngineConfig;
use crate::mood::{Emotion, MoodSnapshot};
use crate::random::{RandomSource, weighted_pick};
use crate::timing::reached;

/// Default pick weights indexed by [`Emotion`] discriminant.
const DEFAULT_WEIGHTS: [u16; Emotion::COUNT] = [
    1, // Idle
    0, // Curious
    0, // Angry1
    0, // Love
    1, // Tired
    0, // Excited
    0, // Angry2
    0, // Angry3
    0, // Worried1
    0, // Curious1
    0, // Curious2
    0, // Sad1
    0, // Sad2
    1, // Happy1
    1, // Happy2
];

/// The timed emotion currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEmotion {
    pub kind: Emotion,
    pub expires_at: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionChange {
    pub from: Emotion,
    pub to: Emotion,
}

pub struct EmotionScheduler {
    current: Emotion,
    active: Option<ActiveEmotion>,
    weights: [u16; Emotion::COUNT],
    /// `None` means a pick is due now.
    next_pick_at: Option<u32>,
    forced_cursor: usize,
    duration_ms: u32,
    pick_interval_ms: (u32, u32),
}

impl EmotionScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            current: Emotion::Idle,
            active: None,
            weights: DEFAULT_WEIGHTS,
            next_pick_at: None,
            forced_cursor: 0,
            duration_ms: config.emotion_duration_ms,
            pick_interval_ms: (config.emotion_pick_min_ms, config.emotion_pick_max_ms),
        }
    }

    pub fn current(&self) -> Emotion {
        self.current
    }

    pub fn active(&self) -> Option<ActiveEmotion> {
        self.active
    }

    pub fn weight(&self, emotion: Emotion) -> u16 {
        self.weights[emotion.index()]
    }

    pub fn next_pick_at(&self) -> Option<u32> {
        self.next_pick_at
    }

    /// A timed emotion is still playing.
    pub fn is_active(&self, now_ms: u32) -> bool {
        self.active.is_some_and(|a| !reached(now_ms, a.expires_at))
    }

    /// Nothing is playing and the next pick is due.
    pub fn is_ready(&self, now_ms: u32) -> bool {
        !self.is_active(now_ms) && self.next_pick_at.is_none_or(|at| reached(now_ms, at))
    }

    /// Make `emotion` current, replacing whatever was playing.
    pub fn set_emotion(&mut self, emotion: Emotion, now_ms: u32) -> EmotionChange {
        let change = EmotionChange {
            from: self.current,
            to: emotion,
        };
        self.active = (emotion != Emotion::Idle).then(|| ActiveEmotion {
            kind: emotion,
            expires_at: now_ms.wrapping_add(self.duration_ms),
        });
        self.current = emotion;
        if change.from != change.to {
            info!("EMOTION | {:?} -> {:?}", change.from, change.to);
        }
        change
    }

    pub fn set_weight(&mut self, emotion: Emotion, weight: u16) {
        self.weights[emotion.index()] = weight;
    }

    /// Choose the next emotion without applying it.
    pub fn pick_next_weighted(&mut self, snapshot: &MoodSnapshot, rng: &mut impl RandomSource) -> Emotion {
        if !snapshot.forced.is_empty() {
            if self.forced_cursor >= snapshot.forced.len() {
                self.forced_cursor = 0;
            }
            let chosen = snapshot.forced[self.forced_cursor];
            self.forced_cursor = (self.forced_cursor + 1) % snapshot.forced.len();
            return chosen;
        }

        let table: [(Emotion, u16); Emotion::COUNT] =
            core::array::from_fn(|i| (Emotion::from_index(i), self.weights[i]));
        weighted_pick(&table, |e| snapshot.is_suppressed(e), rng).unwrap_or(Emotion::Idle)
    }

    pub fn schedule_next_pick(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        let (lo, hi) = self.pick_interval_ms;
        self.next_pick_at = Some(now_ms.wrapping_add(rng.range_u32(lo, hi)));
    }

    /// Pick, apply and reschedule in one step.
    pub fn trigger_now(
        &mut self,
        now_ms: u32,
        snapshot: &MoodSnapshot,
        rng: &mut impl RandomSource,
    ) -> EmotionChange {
        let next = self.pick_next_weighted(snapshot, rng);
        let change = self.set_emotion(next, now_ms);
        self.schedule_next_pick(now_ms, rng);
        change
    }

    /// Expire the playing emotion and, when due and `idle_busy` is false,
    /// pick the next one.  Only call while the eyes own the screen.
    pub fn tick(
        &mut self,
        now_ms: u32,
        snapshot: &MoodSnapshot,
        idle_busy: bool,
        rng: &mut impl RandomSource,
    ) -> Option<EmotionChange> {
        if let Some(a) = self.active {
            if !reached(now_ms, a.expires_at) {
                return None;
            }
            self.active = None;
            let change = self.set_emotion(Emotion::Idle, now_ms);
            self.schedule_next_pick(now_ms, rng);
            return Some(change);
        }

        if idle_busy || !self.is_ready(now_ms) {
            return None;
        }
        Some(self.trigger_now(now_ms, snapshot, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::EmotionSet;
    use crate::random::Mulberry32;

    fn sched() -> EmotionScheduler {
        EmotionScheduler::new(&EngineConfig::default())
    }

    #[test]
    fn timed_emotion_reverts_and_reschedules() {
        let mut s = sched();
        let mut rng = Mulberry32::new(1);
        s.set_emotion(Emotion::Sad1, 1000);
        assert!(s.is_active(2999));
        assert!(s.tick(2999, &MoodSnapshot::default(), false, &mut rng).is_none());

        let change = s.tick(3000, &MoodSnapshot::default(), false, &mut rng);
        assert_eq!(
            change,
            Some(EmotionChange {
                from: Emotion::Sad1,
                to: Emotion::Idle
            })
        );
        let at = s.next_pick_at().unwrap();
        assert!((10_000..=18_000).contains(&at), "{at}");
        assert!(!s.is_ready(3001));
    }

    #[test]
    fn setting_new_emotion_replaces_active() {
        let mut s = sched();
        s.set_emotion(Emotion::Angry1, 0);
        s.set_emotion(Emotion::Happy2, 500);
        let a = s.active().unwrap();
        assert_eq!(a.kind, Emotion::Happy2);
        assert_eq!(a.expires_at, 2500);
        s.set_emotion(Emotion::Idle, 600);
        assert!(s.active().is_none());
        assert!(!s.is_active(600));
    }

    #[test]
    fn forced_list_round_robins() {
        let mut s = sched();
        let mut rng = Mulberry32::new(1);
        let mut snap = MoodSnapshot::default();
        snap.forced.extend_from_slice(&[Emotion::Sad1, Emotion::Sad2, Emotion::Tired]).unwrap();
        let picks: Vec<_> = (0..5).map(|_| s.pick_next_weighted(&snap, &mut rng)).collect();
        assert_eq!(
            picks,
            [Emotion::Sad1, Emotion::Sad2, Emotion::Tired, Emotion::Sad1, Emotion::Sad2]
        );
    }

    #[test]
    fn shorter_forced_list_resets_cursor() {
        let mut s = sched();
        let mut rng = Mulberry32::new(1);
        let mut snap = MoodSnapshot::default();
        snap.forced.extend_from_slice(&[Emotion::Sad1, Emotion::Sad2, Emotion::Tired]).unwrap();
        s.pick_next_weighted(&snap, &mut rng);
        s.pick_next_weighted(&snap, &mut rng);
        let mut short = MoodSnapshot::default();
        short.forced.push(Emotion::Angry1).unwrap();
        assert_eq!(s.pick_next_weighted(&short, &mut rng), Emotion::Angry1);
    }

    #[test]
    fn weighted_pick_respects_suppression() {
        let mut s = sched();
        let mut rng = Mulberry32::new(99);
        let snap = MoodSnapshot {
            suppressed: [Emotion::Idle, Emotion::Tired, Emotion::Happy1].into_iter().collect::<EmotionSet>(),
            ..MoodSnapshot::default()
        };
        for _ in 0..50 {
            assert_eq!(s.pick_next_weighted(&snap, &mut rng), Emotion::Happy2);
        }
    }

    #[test]
    fn everything_suppressed_defaults_to_idle() {
        let mut s = sched();
        let mut rng = Mulberry32::new(5);
        let snap = MoodSnapshot {
            suppressed: Emotion::ALL.into_iter().collect(),
            ..MoodSnapshot::default()
        };
        assert_eq!(s.pick_next_weighted(&snap, &mut rng), Emotion::Idle);
    }

    #[test]
    fn busy_idle_defers_pick() {
        let mut s = sched();
        let mut rng = Mulberry32::new(5);
        assert!(s.is_ready(0));
        assert!(s.tick(0, &MoodSnapshot::default(), true, &mut rng).is_none());
        assert!(s.tick(0, &MoodSnapshot::default(), false, &mut rng).is_some());
        assert!(s.next_pick_at().is_some());
    }

    #[test]
    fn set_weight_changes_distribution() {
        let mut s = sched();
        let mut rng = Mulberry32::new(7);
        for e in Emotion::ALL {
            s.set_weight(e, 0);
        }
        s.set_weight(Emotion::Love, 3);
        assert_eq!(s.weight(Emotion::Love), 3);
        assert_eq!(s.pick_next_weighted(&MoodSnapshot::default(), &mut rng), Emotion::Love);
    }
}
