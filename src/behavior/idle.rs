//! Idle look and idle behavior scheduler.
//!
//! ```text
//!                  blocked / emotion busy
//!              ┌───────────────────────────┐
//!              ▼                           │
//!   ┌──────┐ interval ┌──────────┐ reached ┌────────────┐ done ┌──────┐
//!   │ Wait │ ───────▶ │ Looking  │ ──────▶ │ Behavior   │ ───▶ │ Wait │
//!   └──────┘          └──────────┘         └────────────┘      └──────┘
//! ```
//!
//! The scheduler first picks a small random look destination and waits
//! for the interpolator to bring the body there.  Only then does it draw a
//! weighted idle behavior.  At most one behavior is live; its procedural
//! animation owns the motion state until it finishes, at which point the
//! motion state is settled back to neutral.

use log::debug;

use crate::app::ports::{AudioCue, FeatureGate};
use crate::config::EngineConfig;
use crate::level::Feature;
use crate::mood::MoodSnapshot;
use crate::motion::{BLINK_BOTH, BLINK_LEFT, BLINK_RIGHT, JitterTarget, MotionState, MoveSpeed};
use crate::random::{RandomSource, weighted_pick};
use crate::timing::{elapsed, reached};

const BLINK_CLOSE_MS: u32 = 60;
const BLINK_HOLD_MS: u32 = 40;
const BLINK_OPEN_MS: u32 = 120;
const BLINK_OFFSET_PX: f32 = 50.0;

const JITTER_DURATION_MS: u32 = 420;
const JITTER_AMP_PX: u8 = 5;

const BOUNCE_PERIOD_MS: f32 = 2000.0;
const BOUNCE_FREQ_HZ: f32 = 2.0;
const BOUNCE_AMP_PX: f32 = 8.0;
const HAPPY_SCALE: f32 = 1.15;

const GIGGLE_DURATION_MS: u32 = 1000;
const GIGGLE_OFFSET_PX: i16 = 35;
const GIGGLE_JITTER_AMP: u8 = 6;

const EXCITED_SCALE: f32 = 1.2;
const EXCITED_JITTER_AMP: u8 = 10;
const EXCITED_JITTER_MS: u32 = 120;

/// Swoosh strength is normalised to the longest possible hop.
const SWOOSH_FULL_DIST: f32 = 28.0;

// ═══════════════════════════════════════════════════════════════
//  Behavior kinds
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdleBehaviorKind {
    Blink,
    Wink,
    JitterLeft,
    JitterRight,
    JitterBoth,
    HappyBounce,
    Judging,
    Excited1,
    Giggle,
}

/// Weighted pick table, in draw order.
const IDLE_WEIGHTS: [(IdleBehaviorKind, u16); 9] = [
    (IdleBehaviorKind::Blink, 8),
    (IdleBehaviorKind::Wink, 8),
    (IdleBehaviorKind::JitterLeft, 1),
    (IdleBehaviorKind::JitterRight, 1),
    (IdleBehaviorKind::JitterBoth, 1),
    (IdleBehaviorKind::HappyBounce, 8),
    (IdleBehaviorKind::Judging, 8),
    (IdleBehaviorKind::Excited1, 8),
    (IdleBehaviorKind::Giggle, 1),
];

impl IdleBehaviorKind {
    pub fn default_duration_ms(self) -> u32 {
        match self {
            Self::Blink | Self::Wink => BLINK_CLOSE_MS + BLINK_HOLD_MS + BLINK_OPEN_MS,
            Self::JitterLeft | Self::JitterRight | Self::JitterBoth => JITTER_DURATION_MS,
            Self::HappyBounce | Self::Judging | Self::Excited1 => 2000,
            Self::Giggle => GIGGLE_DURATION_MS,
        }
    }

    pub fn is_jitter(self) -> bool {
        matches!(self, Self::JitterLeft | Self::JitterRight | Self::JitterBoth)
    }

    pub fn required_feature(self) -> Option<Feature> {
        match self {
            Self::JitterLeft | Self::JitterRight | Self::JitterBoth => Some(Feature::IdleJitter),
            Self::Giggle => Some(Feature::IdleGiggle),
            Self::Judging => Some(Feature::IdleJudging),
            _ => None,
        }
    }

    /// Mood gating: playful behaviors need a content pet, jitter needs
    /// an energetic and clean one.
    pub fn is_suppressed(self, snap: &MoodSnapshot) -> bool {
        let sub = &snap.sub;
        let playful = matches!(
            self,
            Self::HappyBounce | Self::Excited1 | Self::Giggle | Self::Judging
        );
        (playful && (sub.depressed || sub.irritable))
            || (self.is_jitter() && (sub.uncomfortable || sub.sluggish))
    }
}

/// The one live behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveBehavior {
    pub kind: IdleBehaviorKind,
    pub started_at: u32,
    pub duration_ms: u32,
}

/// Reported to the caller when the live behavior changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTransition {
    Started(IdleBehaviorKind),
    Finished(IdleBehaviorKind),
}

/// Per-tick inputs decided by the caller.
#[derive(Debug, Clone, Copy)]
pub struct IdleContext {
    pub now_ms: u32,
    /// A menu, game, clock or sequence owns the screen.
    pub blocked: bool,
    /// An emotion is playing or about to be picked.
    pub emotion_busy: bool,
}

/// Private animation bookkeeping, reset with every new behavior.
#[derive(Debug, Clone, Copy, Default)]
struct AnimState {
    kicked: bool,
    blink_mask: u8,
    clink_played: bool,
    pip_played: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct IdleLook {
    active: bool,
    dest: (i16, i16),
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct IdleScheduler {
    look: IdleLook,
    next_look_at: Option<u32>,
    active: Option<ActiveBehavior>,
    anim: AnimState,
    look_interval_ms: (u32, u32),
    look_range_px: i16,
}

impl IdleScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            look: IdleLook::default(),
            next_look_at: None,
            active: None,
            anim: AnimState::default(),
            look_interval_ms: (config.look_interval_min_ms, config.look_interval_max_ms),
            look_range_px: config.look_range_px,
        }
    }

    pub fn active_behavior(&self) -> Option<ActiveBehavior> {
        self.active
    }

    pub fn is_look_active(&self) -> bool {
        self.look.active
    }

    /// Current look destination, if a look is in flight.
    pub fn look_destination(&self) -> Option<(i16, i16)> {
        self.look.active.then_some(self.look.dest)
    }

    /// Behavior running, or a look still travelling.
    pub fn is_busy(&self) -> bool {
        self.active.is_some() || self.look.active
    }

    /// Advance the look and the live behavior by one tick.
    pub fn tick(
        &mut self,
        ctx: IdleContext,
        motion: &mut MotionState,
        snapshot: &MoodSnapshot,
        gate: &impl FeatureGate,
        audio: &mut impl AudioCue,
        rng: &mut impl RandomSource,
    ) -> Option<IdleTransition> {
        let started = if self.active.is_none() {
            self.update_look(ctx, motion, snapshot, gate, audio, rng)
        } else {
            None
        };
        let finished = self.update_behavior(ctx.now_ms, motion, audio, rng);
        finished.or(started)
    }

    /// Start `kind` now, preempting whatever is live.  Sequences use this
    /// to run a happy bounce for a custom duration.
    pub fn start_behavior(
        &mut self,
        kind: IdleBehaviorKind,
        now_ms: u32,
        duration_ms: u32,
        motion: &mut MotionState,
        rng: &mut impl RandomSource,
    ) {
        self.cancel(motion);
        self.begin(kind, now_ms, duration_ms, rng);
    }

    /// Preempt the live behavior and any in-flight look.  Performs the
    /// neutral reset inline.  Returns the preempted kind.
    pub fn cancel(&mut self, motion: &mut MotionState) -> Option<IdleBehaviorKind> {
        let preempted = self.active.take().map(|b| b.kind);
        if let Some(kind) = preempted {
            debug!("IDLE | {:?} preempted", kind);
        }
        self.look.active = false;
        self.anim = AnimState::default();
        motion.reset_neutral();
        preempted
    }

    // ── Look ──────────────────────────────────────────────────

    fn update_look(
        &mut self,
        ctx: IdleContext,
        motion: &mut MotionState,
        snapshot: &MoodSnapshot,
        gate: &impl FeatureGate,
        audio: &mut impl AudioCue,
        rng: &mut impl RandomSource,
    ) -> Option<IdleTransition> {
        let now = ctx.now_ms;

        // Targets stay put while blocked; only the timer keeps running.
        if ctx.blocked {
            self.look.active = false;
            if self.next_look_at.is_none() {
                self.schedule_look(now, rng);
            }
            return None;
        }

        if ctx.emotion_busy {
            if self.look.active && motion.reached_target() {
                self.look.active = false;
                self.schedule_look(now, rng);
            }
            return None;
        }

        if !self.look.active {
            if self.next_look_at.is_none_or(|at| reached(now, at)) {
                self.pick_destination(motion, snapshot, audio, rng);
            }
            return None;
        }

        if !motion.reached_target() {
            return None;
        }

        self.look.active = false;
        self.schedule_look(now, rng);

        let kind = weighted_pick(
            &IDLE_WEIGHTS,
            |k| k.is_suppressed(snapshot) || k.required_feature().is_some_and(|f| !gate.is_unlocked(f)),
            rng,
        )
        .unwrap_or(IdleBehaviorKind::Blink);
        self.begin(kind, now, kind.default_duration_ms(), rng);
        Some(IdleTransition::Started(kind))
    }

    fn schedule_look(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        let (lo, hi) = self.look_interval_ms;
        self.next_look_at = Some(now_ms.wrapping_add(rng.range_u32(lo, hi)));
    }

    fn pick_destination(
        &mut self,
        motion: &mut MotionState,
        snapshot: &MoodSnapshot,
        audio: &mut impl AudioCue,
        rng: &mut impl RandomSource,
    ) {
        let r = i32::from(self.look_range_px);
        let dx = rng.range_i32(-r, r) as i16;
        let dy = rng.range_i32(-r, r) as i16;
        self.look = IdleLook {
            active: true,
            dest: (dx, dy),
        };
        motion.global.target_off_x = f32::from(dx);
        motion.global.target_off_y = f32::from(dy);
        motion.speed = pick_speed(snapshot, rng);

        if motion.speed != MoveSpeed::Slow {
            let dist = f32::from(dx).hypot(f32::from(dy));
            let mut strength = (dist / SWOOSH_FULL_DIST).min(1.0);
            if motion.speed == MoveSpeed::Normal {
                strength *= 0.45;
            }
            audio.swoosh(strength);
        }
        debug!("IDLE | look -> ({}, {}) {:?}", dx, dy, motion.speed);
    }

    // ── Behaviors ─────────────────────────────────────────────

    fn begin(
        &mut self,
        kind: IdleBehaviorKind,
        now_ms: u32,
        duration_ms: u32,
        rng: &mut impl RandomSource,
    ) {
        let blink_mask = match kind {
            IdleBehaviorKind::Blink => BLINK_BOTH,
            IdleBehaviorKind::Wink if rng.below(2) == 0 => BLINK_LEFT,
            IdleBehaviorKind::Wink => BLINK_RIGHT,
            _ => 0,
        };
        self.anim = AnimState {
            blink_mask,
            ..AnimState::default()
        };
        self.active = Some(ActiveBehavior {
            kind,
            started_at: now_ms,
            duration_ms,
        });
        debug!("IDLE | {:?} started ({} ms)", kind, duration_ms);
    }

    fn update_behavior(
        &mut self,
        now_ms: u32,
        motion: &mut MotionState,
        audio: &mut impl AudioCue,
        rng: &mut impl RandomSource,
    ) -> Option<IdleTransition> {
        let b = self.active?;
        let t = elapsed(now_ms, b.started_at);

        let done = match b.kind {
            IdleBehaviorKind::Blink | IdleBehaviorKind::Wink => self.animate_blink(t, motion, audio),
            IdleBehaviorKind::JitterLeft | IdleBehaviorKind::JitterRight | IdleBehaviorKind::JitterBoth => {
                if !self.anim.kicked {
                    let target = match b.kind {
                        IdleBehaviorKind::JitterLeft => JitterTarget::Left,
                        IdleBehaviorKind::JitterRight => JitterTarget::Right,
                        _ => JitterTarget::Both,
                    };
                    motion.global.kick_jitter(JITTER_AMP_PX, JITTER_DURATION_MS, target, now_ms, rng);
                    audio.jitter_noise(0.5);
                    self.anim.kicked = true;
                }
                t >= b.duration_ms
            }
            IdleBehaviorKind::HappyBounce => {
                let phase = bounce_phase(t);
                let pos = phase.sin();
                motion.global.anim_y = BOUNCE_AMP_PX * pos;
                motion.top_offset = (phase.cos() * 6.0) as i16;
                motion.scale = HAPPY_SCALE;
                if !self.anim.pip_played && pos > 0.92 {
                    audio.happy_pip(0.7);
                    self.anim.pip_played = true;
                }
                if pos < 0.2 {
                    self.anim.pip_played = false;
                }
                t >= b.duration_ms
            }
            IdleBehaviorKind::Judging => {
                let phase = bounce_phase(t);
                motion.global.anim_x = BOUNCE_AMP_PX * phase.sin();
                motion.scale = HAPPY_SCALE;
                let stretch = phase.cos().abs();
                for eye in &mut motion.eyes {
                    eye.scale_x = 1.0 + stretch * 0.10;
                    eye.scale_y = 1.0 - stretch * 0.06;
                    eye.target_scale_x = eye.scale_x;
                    eye.target_scale_y = eye.scale_y;
                }
                t >= b.duration_ms
            }
            IdleBehaviorKind::Excited1 => {
                motion.scale = match t {
                    0..150 => 1.0 + (t as f32 / 150.0) * (EXCITED_SCALE - 1.0),
                    1650..2000 => EXCITED_SCALE - ((t - 1650) as f32 / 350.0) * (EXCITED_SCALE - 1.0),
                    _ => EXCITED_SCALE,
                };
                if (1150..1300).contains(&t) && !self.anim.kicked {
                    motion.global.kick_jitter(
                        EXCITED_JITTER_AMP,
                        EXCITED_JITTER_MS,
                        JitterTarget::Both,
                        now_ms,
                        rng,
                    );
                    self.anim.kicked = true;
                }
                t >= b.duration_ms
            }
            IdleBehaviorKind::Giggle => {
                if !self.anim.kicked {
                    motion.top_offset = GIGGLE_OFFSET_PX;
                    motion.global.kick_jitter(
                        GIGGLE_JITTER_AMP,
                        GIGGLE_DURATION_MS,
                        JitterTarget::VerticalOnly,
                        now_ms,
                        rng,
                    );
                    self.anim.kicked = true;
                }
                t >= b.duration_ms
            }
        };

        if !done {
            return None;
        }
        self.active = None;
        self.anim = AnimState::default();
        motion.settle();
        debug!("IDLE | {:?} finished", b.kind);
        Some(IdleTransition::Finished(b.kind))
    }

    fn animate_blink(&mut self, t: u32, motion: &mut MotionState, audio: &mut impl AudioCue) -> bool {
        motion.blink_mask = self.anim.blink_mask;
        let offset = if t < BLINK_CLOSE_MS {
            BLINK_OFFSET_PX * (t as f32 / BLINK_CLOSE_MS as f32)
        } else if t < BLINK_CLOSE_MS + BLINK_HOLD_MS {
            if !self.anim.clink_played {
                audio.blink();
                self.anim.clink_played = true;
            }
            BLINK_OFFSET_PX
        } else if t < BLINK_CLOSE_MS + BLINK_HOLD_MS + BLINK_OPEN_MS {
            let p = (t - BLINK_CLOSE_MS - BLINK_HOLD_MS) as f32 / BLINK_OPEN_MS as f32;
            BLINK_OFFSET_PX * (1.0 - p)
        } else {
            return true;
        };
        motion.top_offset = offset as i16;
        false
    }
}

fn bounce_phase(t_ms: u32) -> f32 {
    2.0 * core::f32::consts::PI * BOUNCE_FREQ_HZ * (t_ms as f32 / BOUNCE_PERIOD_MS)
}

/// Uniform choice among the speeds the mood allows; Normal if none are.
fn pick_speed(snapshot: &MoodSnapshot, rng: &mut impl RandomSource) -> MoveSpeed {
    let allowed: heapless::Vec<MoveSpeed, 3> = [MoveSpeed::Slow, MoveSpeed::Normal, MoveSpeed::Fast]
        .into_iter()
        .filter(|s| snapshot.speed_allowed(*s))
        .collect();
    if allowed.is_empty() {
        return MoveSpeed::Normal;
    }
    allowed[rng.below(allowed.len() as u32) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::SubStates;
    use crate::random::Mulberry32;

    struct AllUnlocked;
    impl FeatureGate for AllUnlocked {
        fn is_unlocked(&self, _f: Feature) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct CountingAudio {
        blinks: u32,
        swooshes: u32,
        jitters: u32,
        pips: u32,
    }
    impl AudioCue for CountingAudio {
        fn blink(&mut self) {
            self.blinks += 1;
        }
        fn swoosh(&mut self, _s: f32) {
            self.swooshes += 1;
        }
        fn jitter_noise(&mut self, _s: f32) {
            self.jitters += 1;
        }
        fn happy_pip(&mut self, _s: f32) {
            self.pips += 1;
        }
    }

    fn setup() -> (IdleScheduler, MotionState) {
        let cfg = EngineConfig::default();
        (IdleScheduler::new(&cfg), MotionState::new(&cfg))
    }

    /// Run `kind` from a neutral state to completion.
    fn run_to_completion(kind: IdleBehaviorKind) -> (MotionState, CountingAudio, u32) {
        let (mut s, mut m) = setup();
        let mut rng = Mulberry32::new(42);
        let mut audio = CountingAudio::default();
        s.start_behavior(kind, 0, kind.default_duration_ms(), &mut m, &mut rng);
        let ctx = |now| IdleContext {
            now_ms: now,
            blocked: true,
            emotion_busy: false,
        };
        let mut finishes = 0;
        let mut now = 0;
        while now <= 3000 {
            m.global.update_jitter(now, &mut rng);
            if let Some(IdleTransition::Finished(k)) =
                s.tick(ctx(now), &mut m, &MoodSnapshot::default(), &AllUnlocked, &mut audio, &mut rng)
            {
                assert_eq!(k, kind);
                finishes += 1;
            }
            now += 10;
        }
        (m, audio, finishes)
    }

    #[test]
    fn every_behavior_returns_to_neutral_exactly_once() {
        for (kind, _) in IDLE_WEIGHTS {
            let (m, _, finishes) = run_to_completion(kind);
            assert_eq!(finishes, 1, "{kind:?}");
            assert!(m.is_neutral(), "{kind:?} left motion dirty: {m:?}");
        }
    }

    #[test]
    fn blink_clinks_once() {
        let (_, audio, _) = run_to_completion(IdleBehaviorKind::Blink);
        assert_eq!(audio.blinks, 1);
    }

    #[test]
    fn jitter_kicks_once_with_noise() {
        let (_, audio, _) = run_to_completion(IdleBehaviorKind::JitterBoth);
        assert_eq!(audio.jitters, 1);
    }

    #[test]
    fn happy_bounce_pips_on_each_crest() {
        let (_, audio, _) = run_to_completion(IdleBehaviorKind::HappyBounce);
        // 2 Hz over 2 s: four crests.
        assert_eq!(audio.pips, 4);
    }

    #[test]
    fn blink_closes_eyes_at_hold() {
        let (mut s, mut m) = setup();
        let mut rng = Mulberry32::new(1);
        let mut audio = CountingAudio::default();
        s.start_behavior(IdleBehaviorKind::Blink, 0, 220, &mut m, &mut rng);
        let ctx = IdleContext {
            now_ms: 80,
            blocked: true,
            emotion_busy: false,
        };
        s.tick(ctx, &mut m, &MoodSnapshot::default(), &AllUnlocked, &mut audio, &mut rng);
        assert_eq!(m.top_offset, 50);
        assert_eq!(m.blink_mask, BLINK_BOTH);
    }

    #[test]
    fn look_then_behavior() {
        let cfg = EngineConfig::default();
        let (mut s, mut m) = setup();
        let interp = crate::motion::Interpolator::new(&cfg);
        let mut rng = Mulberry32::new(9);
        let mut audio = CountingAudio::default();
        let snap = MoodSnapshot::default();

        let mut started = None;
        let mut now = 0;
        while now < 10_000 && started.is_none() {
            let ctx = IdleContext {
                now_ms: now,
                blocked: false,
                emotion_busy: false,
            };
            if let Some(IdleTransition::Started(k)) =
                s.tick(ctx, &mut m, &snap, &AllUnlocked, &mut audio, &mut rng)
            {
                started = Some(k);
                assert!(!s.is_look_active());
            }
            interp.tick(&mut m, 16);
            now += 16;
        }
        assert!(started.is_some());
        assert!(s.active_behavior().is_some());
    }

    #[test]
    fn blocked_scheduler_never_starts_anything() {
        let (mut s, mut m) = setup();
        let mut rng = Mulberry32::new(3);
        let mut audio = CountingAudio::default();
        for now in (0..20_000).step_by(16) {
            let ctx = IdleContext {
                now_ms: now,
                blocked: true,
                emotion_busy: false,
            };
            assert!(s.tick(ctx, &mut m, &MoodSnapshot::default(), &AllUnlocked, &mut audio, &mut rng).is_none());
        }
        assert!(!s.is_busy());
        assert!(m.is_neutral());
    }

    #[test]
    fn busy_emotion_holds_the_look() {
        let (mut s, mut m) = setup();
        let mut rng = Mulberry32::new(5);
        let mut audio = CountingAudio::default();
        for now in (0..20_000).step_by(16) {
            let ctx = IdleContext {
                now_ms: now,
                blocked: false,
                emotion_busy: true,
            };
            assert!(s.tick(ctx, &mut m, &MoodSnapshot::default(), &AllUnlocked, &mut audio, &mut rng).is_none());
            assert!(!s.is_look_active());
        }
        assert!(!s.is_busy());
    }

    #[test]
    fn cancel_resets_inline() {
        let (mut s, mut m) = setup();
        let mut rng = Mulberry32::new(3);
        s.start_behavior(IdleBehaviorKind::Giggle, 0, 1000, &mut m, &mut rng);
        let mut audio = CountingAudio::default();
        let ctx = IdleContext {
            now_ms: 10,
            blocked: true,
            emotion_busy: false,
        };
        s.tick(ctx, &mut m, &MoodSnapshot::default(), &AllUnlocked, &mut audio, &mut rng);
        assert!(!m.is_neutral());
        assert_eq!(s.cancel(&mut m), Some(IdleBehaviorKind::Giggle));
        assert!(m.is_neutral());
        assert!(s.active_behavior().is_none());
    }

    #[test]
    fn depressed_excludes_playful_behaviors() {
        let snap = MoodSnapshot {
            sub: SubStates {
                depressed: true,
                ..SubStates::default()
            },
            ..MoodSnapshot::default()
        };
        for kind in [
            IdleBehaviorKind::HappyBounce,
            IdleBehaviorKind::Excited1,
            IdleBehaviorKind::Giggle,
            IdleBehaviorKind::Judging,
        ] {
            assert!(kind.is_suppressed(&snap));
        }
        assert!(!IdleBehaviorKind::Blink.is_suppressed(&snap));
        assert!(!IdleBehaviorKind::JitterBoth.is_suppressed(&snap));
    }

    #[test]
    fn all_speeds_suppressed_falls_back_to_normal() {
        let snap = MoodSnapshot {
            suppress_slow: true,
            suppress_normal: true,
            suppress_fast: true,
            ..MoodSnapshot::default()
        };
        let mut rng = Mulberry32::new(0);
        for _ in 0..10 {
            assert_eq!(pick_speed(&snap, &mut rng), MoveSpeed::Normal);
        }
    }
}
