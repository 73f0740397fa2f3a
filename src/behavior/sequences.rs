//! Timed full-screen sequences: feeding, cleaning, sleep, and the
//! first-run hatch.
//!
//! Each sequence is a small owned state struct.  The service decides when
//! to start and end them and applies the care rewards; these types only
//! track time and drive the motion fields they own.

use core::f32::consts::{PI, TAU};

use log::info;

use crate::motion::{EYE_SIZE, MotionState, SCREEN_SIZE};
use crate::random::RandomSource;
use crate::timing::{elapsed, reached};

// ═══════════════════════════════════════════════════════════════
//  Feed / Clean
// ═══════════════════════════════════════════════════════════════

/// A fixed-length sequence with a deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedSequence {
    ends_at: Option<u32>,
}

impl TimedSequence {
    pub fn start(&mut self, now_ms: u32, duration_ms: u32) {
        self.ends_at = Some(now_ms.wrapping_add(duration_ms));
    }

    pub fn is_active(&self) -> bool {
        self.ends_at.is_some()
    }

    /// `true` exactly once, on the tick the deadline passes.
    pub fn poll_finished(&mut self, now_ms: u32) -> bool {
        match self.ends_at {
            Some(end) if reached(now_ms, end) => {
                self.ends_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.ends_at = None;
    }
}

/// Cleaning remembers where it was launched from.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanSequence {
    timer: TimedSequence,
    return_to_stats: bool,
}

impl CleanSequence {
    pub fn start(&mut self, now_ms: u32, duration_ms: u32, return_to_stats: bool) -> bool {
        if self.timer.is_active() {
            return false;
        }
        self.timer.start(now_ms, duration_ms);
        self.return_to_stats = return_to_stats;
        true
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    /// `Some(return_to_stats)` on the tick cleaning finishes.
    pub fn poll_finished(&mut self, now_ms: u32) -> Option<bool> {
        self.timer.poll_finished(now_ms).then_some(self.return_to_stats)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Sleep
// ═══════════════════════════════════════════════════════════════

const SLEEP_EYE_HEIGHT_PX: i16 = 10;
const SLEEP_BOB_AMPLITUDE_PX: f32 = 10.0;
const SLEEP_BOB_PERIOD_MS: f32 = 4000.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SleepSequence {
    started_at: Option<u32>,
}

impl SleepSequence {
    pub fn start(&mut self, now_ms: u32, motion: &mut MotionState) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now_ms);
        motion.reset_neutral();
        info!("SLEEP | started");
        true
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Eyes shut to a slit, body bobbing slowly.
    pub fn update(&self, now_ms: u32, motion: &mut MotionState) {
        let Some(start) = self.started_at else {
            return;
        };
        let t = elapsed(now_ms, start) as f32;
        let bob = ((t / SLEEP_BOB_PERIOD_MS) * TAU).sin() * SLEEP_BOB_AMPLITUDE_PX;
        motion.top_offset = EYE_SIZE - SLEEP_EYE_HEIGHT_PX;
        motion.scale = 1.0;
        motion.global.off_x = 0.0;
        motion.global.target_off_x = 0.0;
        motion.global.anim_y = bob.round();
    }

    /// Wake up.  Returns `false` if not asleep.
    pub fn wake(&mut self, motion: &mut MotionState) -> bool {
        if self.started_at.take().is_none() {
            return false;
        }
        motion.reset_neutral();
        info!("SLEEP | woke");
        true
    }
}

// ═══════════════════════════════════════════════════════════════
//  Hatch
// ═══════════════════════════════════════════════════════════════

/// Phase lengths in milliseconds, in order.
pub const HATCH_PHASE_MS: [u32; 4] = [60_000, 90_000, 120_000, 30_000];
pub const HATCH_TOTAL_MS: u32 = 300_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchUpdate {
    Running,
    PhaseChanged(u8),
    Finished,
}

#[derive(Debug, Clone, Copy, Default)]
struct Pulse {
    started_at: u32,
    duration_ms: u32,
    /// Bob amplitude, or twitch x.
    a: f32,
    /// Twitch y.
    b: f32,
}

impl Pulse {
    /// Progress in `[0, 1)` while running.
    fn progress(&self, now_ms: u32) -> Option<f32> {
        if self.duration_ms == 0 {
            return None;
        }
        let e = elapsed(now_ms, self.started_at);
        (e < self.duration_ms).then(|| e as f32 / self.duration_ms as f32)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Wander {
    moving: bool,
    started_at: u32,
    duration_ms: u32,
    stop_until: u32,
    from: (f32, f32),
    to: (f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct HatchSequence {
    active: bool,
    started_at: u32,
    phase: u8,
    bob: Pulse,
    twitch: Pulse,
    boost_until: Option<u32>,
    pos: (f32, f32),
    wander: Wander,
}

fn screen_centre() -> (f32, f32) {
    let c = f32::from(SCREEN_SIZE) / 2.0;
    (c, c)
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn random_range(lo: f32, hi: f32, rng: &mut impl RandomSource) -> f32 {
    lo + (hi - lo) * rng.unit_f32()
}

impl HatchSequence {
    pub fn start(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        *self = Self {
            active: true,
            started_at: now_ms,
            pos: screen_centre(),
            ..Self::default()
        };
        self.enter_phase(1, now_ms, rng);
        info!("HATCH | started");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current phase, 1 to 4 (0 when idle).
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Egg centre in screen pixels.
    pub fn position(&self) -> (f32, f32) {
        self.pos
    }

    pub fn is_boosted(&self, now_ms: u32) -> bool {
        self.boost_until.is_some_and(|until| !reached(now_ms, until))
    }

    /// Vertical offset of the egg from the last tap.
    pub fn bob_offset(&self, now_ms: u32) -> f32 {
        self.bob.progress(now_ms).map_or(0.0, |t| (t * PI).sin() * self.bob.a)
    }

    /// Twitch displacement from the last phase-3 tap.
    pub fn twitch_offset(&self, now_ms: u32) -> (f32, f32) {
        self.twitch.progress(now_ms).map_or((0.0, 0.0), |t| {
            let fade = 1.0 - t;
            (self.twitch.a * fade, self.twitch.b * fade)
        })
    }

    pub fn update(&mut self, now_ms: u32, rng: &mut impl RandomSource) -> HatchUpdate {
        if !self.active {
            return HatchUpdate::Running;
        }
        let e = elapsed(now_ms, self.started_at);
        if e >= HATCH_TOTAL_MS {
            self.active = false;
            info!("HATCH | finished");
            return HatchUpdate::Finished;
        }

        let mut bound = 0;
        let mut next = 4;
        for (i, len) in HATCH_PHASE_MS.iter().take(3).enumerate() {
            bound += len;
            if e < bound {
                next = i as u8 + 1;
                break;
            }
        }

        let mut result = HatchUpdate::Running;
        if next != self.phase {
            self.enter_phase(next, now_ms, rng);
            result = HatchUpdate::PhaseChanged(next);
        }

        if self.phase == 3 {
            self.update_wander(now_ms, rng);
        } else {
            self.pos = screen_centre();
        }
        result
    }

    pub fn handle_tap(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        let (duration_ms, amp) = match self.phase {
            1 => (600, 4.0),
            2 => (650, 5.5),
            3 => (500, 6.0),
            _ => return,
        };
        self.bob = Pulse {
            started_at: now_ms,
            duration_ms,
            a: amp,
            b: 0.0,
        };
        if self.phase == 2 {
            self.boost_until = Some(now_ms.wrapping_add(3500));
        }
        if self.phase == 3 {
            self.twitch = Pulse {
                started_at: now_ms,
                duration_ms: 280,
                a: random_range(-5.0, 5.0, rng),
                b: random_range(-4.0, 4.0, rng),
            };
        }
    }

    fn enter_phase(&mut self, phase: u8, now_ms: u32, rng: &mut impl RandomSource) {
        self.phase = phase;
        self.bob = Pulse::default();
        self.twitch = Pulse::default();
        self.boost_until = None;
        if phase == 3 {
            self.wander.moving = false;
            self.wander.stop_until = now_ms.wrapping_add(rng.range_u32(600, 1200));
        }
        info!("HATCH | phase {}", phase);
    }

    fn update_wander(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        let w = &mut self.wander;
        if w.moving {
            let t = if w.duration_ms > 0 {
                elapsed(now_ms, w.started_at) as f32 / w.duration_ms as f32
            } else {
                1.0
            };
            if t >= 1.0 {
                self.pos = w.to;
                w.moving = false;
                w.stop_until = now_ms.wrapping_add(rng.range_u32(700, 1300));
            } else {
                let s = smoothstep(t);
                self.pos = (lerp(w.from.0, w.to.0, s), lerp(w.from.1, w.to.1, s));
            }
        } else if reached(now_ms, w.stop_until) {
            let angle = random_range(0.0, TAU, rng);
            let radius = random_range(20.0, 30.0, rng);
            let (cx, cy) = screen_centre();
            w.from = self.pos;
            w.to = (cx + angle.cos() * radius, cy + angle.sin() * radius);
            w.started_at = now_ms;
            w.duration_ms = rng.range_u32(650, 1100);
            w.moving = true;
        }
    }
}
