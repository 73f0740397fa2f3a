//! Shared visual motion state and the interpolation engine.
//!
//! Everything a behavior animates lives in one owned [`MotionState`]
//! passed by `&mut` into each behavior's update.  Nothing here is global,
//! so "returns to neutral" is a property a unit test can check.
//!
//! Body motion has three independent parts:
//!
//! - `off` / `target`: smoothed toward the target by [`Interpolator`].
//! - `anim`: procedural offset written each tick by the active behavior.
//!   Never smoothed.
//! - jitter: re-randomised within `[-amp, amp]` every tick until it
//!   expires, then snapped to zero.  Never damped, and body smoothing
//!   pauses while it runs.

use crate::config::EngineConfig;
use crate::drivers::gesture::Point;
use crate::random::RandomSource;
use crate::timing::{elapsed, reached};

pub const SCREEN_SIZE: i16 = 240;
pub const EYE_SIZE: i16 = 80;
pub const EYE_GAP: i16 = 10;
pub const EYE_RADIUS: i16 = 24;

pub const BLINK_LEFT: u8 = 0x01;
pub const BLINK_RIGHT: u8 = 0x02;
pub const BLINK_BOTH: u8 = BLINK_LEFT | BLINK_RIGHT;

/// Idle look movement speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EyeId {
    Left = 0,
    Right = 1,
}

/// Axis-aligned rectangle in screen pixels.  Hit tests are inclusive on
/// all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, w: i16, h: i16) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, p: Point) -> bool {
        let (px, py) = (i32::from(p.x), i32::from(p.y));
        let (x, y) = (i32::from(self.x), i32::from(self.y));
        px >= x && px <= x + i32::from(self.w) && py >= y && py <= y + i32::from(self.h)
    }
}

pub const LEFT_EYE_BOX: Rect = Rect::new(
    SCREEN_SIZE / 2 - EYE_GAP / 2 - EYE_SIZE,
    SCREEN_SIZE / 2 - EYE_SIZE / 2,
    EYE_SIZE,
    EYE_SIZE,
);
pub const RIGHT_EYE_BOX: Rect = Rect::new(
    SCREEN_SIZE / 2 + EYE_GAP / 2,
    SCREEN_SIZE / 2 - EYE_SIZE / 2,
    EYE_SIZE,
    EYE_SIZE,
);

/// Which eye (if any) contains `p`.
pub fn eye_at(p: Point) -> Option<EyeId> {
    if LEFT_EYE_BOX.contains(p) {
        Some(EyeId::Left)
    } else if RIGHT_EYE_BOX.contains(p) {
        Some(EyeId::Right)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Linear fade of the eye tint toward the current emotion's colour.
#[derive(Debug, Clone)]
pub struct TintFade {
    current: [f32; 3],
    fade_ms: u32,
    last_update: Option<u32>,
}

impl TintFade {
    pub fn new(fade_ms: u32) -> Self {
        Self {
            current: [255.0; 3],
            fade_ms,
            last_update: None,
        }
    }

    pub fn step(&mut self, target: Rgb, now_ms: u32) {
        let goal = [f32::from(target.r), f32::from(target.g), f32::from(target.b)];
        let Some(last) = self.last_update.replace(now_ms) else {
            self.current = goal;
            return;
        };
        let dt = elapsed(now_ms, last);
        if self.fade_ms == 0 || dt >= self.fade_ms {
            self.current = goal;
            return;
        }
        let alpha = dt as f32 / self.fade_ms as f32;
        for (c, g) in self.current.iter_mut().zip(goal) {
            *c += (g - *c) * alpha;
        }
    }

    pub fn current(&self) -> Rgb {
        let q = |v: f32| (v.clamp(0.0, 255.0) + 0.5) as u8;
        Rgb::new(q(self.current[0]), q(self.current[1]), q(self.current[2]))
    }
}

// ---------------------------------------------------------------------------
// Visual objects
// ---------------------------------------------------------------------------

/// One eye: fixed base geometry plus current/target offset and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualObject {
    pub base: Rect,
    pub radius: i16,
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub target_offset_x: f32,
    pub target_offset_y: f32,
    pub target_scale_x: f32,
    pub target_scale_y: f32,
}

impl VisualObject {
    pub const fn new(base: Rect) -> Self {
        Self {
            base,
            radius: EYE_RADIUS,
            offset_x: 0.0,
            offset_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            target_offset_x: 0.0,
            target_offset_y: 0.0,
            target_scale_x: 1.0,
            target_scale_y: 1.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.base);
    }

    fn is_neutral(&self) -> bool {
        *self == Self::new(self.base)
    }
}

/// Which eyes a jitter kick moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JitterTarget {
    #[default]
    Both,
    Left,
    Right,
    /// Both eyes, Y axis only.
    VerticalOnly,
}

#[derive(Debug, Clone, Default)]
pub struct GlobalMotion {
    pub off_x: f32,
    pub off_y: f32,
    pub target_off_x: f32,
    pub target_off_y: f32,
    pub anim_x: f32,
    pub anim_y: f32,
    jitter_x: i16,
    jitter_y: i16,
    jitter_amp: u8,
    jitter_until: u32,
    jitter_target: JitterTarget,
}

impl GlobalMotion {
    /// Start a self-expiring jitter.  Seeds the first offset immediately.
    pub fn kick_jitter(
        &mut self,
        amp: u8,
        duration_ms: u32,
        target: JitterTarget,
        now_ms: u32,
        rng: &mut impl RandomSource,
    ) {
        self.jitter_amp = amp;
        self.jitter_until = now_ms.wrapping_add(duration_ms);
        self.jitter_target = target;
        self.roll_jitter(rng);
    }

    /// Re-randomise the jitter, or snap it to zero once expired.
    pub fn update_jitter(&mut self, now_ms: u32, rng: &mut impl RandomSource) {
        if self.jitter_amp == 0 {
            return;
        }
        if reached(now_ms, self.jitter_until) {
            self.clear_jitter();
            return;
        }
        self.roll_jitter(rng);
    }

    pub fn clear_jitter(&mut self) {
        self.jitter_x = 0;
        self.jitter_y = 0;
        self.jitter_amp = 0;
    }

    pub fn is_jittering(&self) -> bool {
        self.jitter_amp > 0
    }

    pub fn jitter_amp(&self) -> u8 {
        self.jitter_amp
    }

    pub fn jitter(&self) -> (i16, i16) {
        (self.jitter_x, self.jitter_y)
    }

    pub fn jitter_target(&self) -> JitterTarget {
        self.jitter_target
    }

    fn roll_jitter(&mut self, rng: &mut impl RandomSource) {
        let a = i32::from(self.jitter_amp);
        self.jitter_x = if self.jitter_target == JitterTarget::VerticalOnly {
            0
        } else {
            rng.range_i32(-a, a) as i16
        };
        self.jitter_y = rng.range_i32(-a, a) as i16;
    }
}

// ---------------------------------------------------------------------------
// Motion state
// ---------------------------------------------------------------------------

/// Rendered position of one eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePose {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// Per-frame geometry handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFrame {
    pub left: EyePose,
    pub right: EyePose,
    pub top_offset: i16,
    pub scale: f32,
    pub blink_mask: u8,
    pub body_x: i16,
    pub body_y: i16,
    pub tint: Rgb,
}

#[derive(Debug, Clone)]
pub struct MotionState {
    pub eyes: [VisualObject; 2],
    pub global: GlobalMotion,
    /// Eyelid lowering in pixels (0 = fully open).
    pub top_offset: i16,
    pub scale: f32,
    pub blink_mask: u8,
    pub speed: MoveSpeed,
    pub tint: TintFade,
}

impl MotionState {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            eyes: [
                VisualObject::new(LEFT_EYE_BOX),
                VisualObject::new(RIGHT_EYE_BOX),
            ],
            global: GlobalMotion::default(),
            top_offset: 0,
            scale: 1.0,
            blink_mask: 0,
            speed: MoveSpeed::Normal,
            tint: TintFade::new(config.tint_fade_ms),
        }
    }

    pub fn eye(&self, id: EyeId) -> &VisualObject {
        &self.eyes[id as usize]
    }

    pub fn eye_mut(&mut self, id: EyeId) -> &mut VisualObject {
        &mut self.eyes[id as usize]
    }

    /// Return the animation-owned fields to neutral after a behavior
    /// completes.  The body comes to rest on its current target.
    pub fn settle(&mut self) {
        self.top_offset = 0;
        self.scale = 1.0;
        self.blink_mask = 0;
        for eye in &mut self.eyes {
            eye.reset();
        }
        self.global.anim_x = 0.0;
        self.global.anim_y = 0.0;
        self.global.off_x = self.global.target_off_x;
        self.global.off_y = self.global.target_off_y;
        self.global.clear_jitter();
    }

    /// Full neutral reset, targets included.  Used when something
    /// preempts an in-flight behavior.
    pub fn reset_neutral(&mut self) {
        self.settle();
        self.global.off_x = 0.0;
        self.global.off_y = 0.0;
        self.global.target_off_x = 0.0;
        self.global.target_off_y = 0.0;
    }

    pub fn is_neutral(&self) -> bool {
        let g = &self.global;
        self.top_offset == 0
            && self.scale == 1.0
            && self.blink_mask == 0
            && self.eyes.iter().all(VisualObject::is_neutral)
            && g.off_x == 0.0
            && g.off_y == 0.0
            && g.target_off_x == 0.0
            && g.target_off_y == 0.0
            && g.anim_x == 0.0
            && g.anim_y == 0.0
            && !g.is_jittering()
    }

    /// Body has reached its look destination (within one pixel per axis).
    pub fn reached_target(&self) -> bool {
        let g = &self.global;
        (g.off_x - g.target_off_x).abs() <= 1.0 && (g.off_y - g.target_off_y).abs() <= 1.0
    }

    pub fn frame(&self) -> EyeFrame {
        let g = &self.global;
        let body_x = round(g.off_x + g.anim_x);
        let body_y = round(g.off_y + g.anim_y);
        let (jx, jy) = g.jitter();
        let (jl, jr) = match g.jitter_target() {
            JitterTarget::Both | JitterTarget::VerticalOnly => (true, true),
            JitterTarget::Left => (true, false),
            JitterTarget::Right => (false, true),
        };
        let pose = |o: &VisualObject, jittered: bool| {
            let (dx, dy) = if jittered { (jx, jy) } else { (0, 0) };
            EyePose {
                x: o.base.x + round(o.offset_x) + body_x + dx,
                y: o.base.y + round(o.offset_y) + body_y + dy,
                w: o.base.w,
                h: o.base.h,
                scale_x: o.scale_x,
                scale_y: o.scale_y,
            }
        };
        EyeFrame {
            left: pose(&self.eyes[0], jl),
            right: pose(&self.eyes[1], jr),
            top_offset: self.top_offset,
            scale: self.scale,
            blink_mask: self.blink_mask,
            body_x,
            body_y,
            tint: self.tint.current(),
        }
    }
}

fn round(v: f32) -> i16 {
    if v >= 0.0 {
        (v + 0.5) as i16
    } else {
        (v - 0.5) as i16
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Exponential approach of every visual object toward its target.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    k_slow: f32,
    k_normal: f32,
    k_fast: f32,
    k_max: f32,
    snap_epsilon: f32,
}

impl Interpolator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            k_slow: config.k_slow,
            k_normal: config.k_normal,
            k_fast: config.k_fast,
            k_max: config.k_max,
            snap_epsilon: config.snap_epsilon,
        }
    }

    /// Smoothing factor for `speed`, clamped to the stability ceiling.
    pub fn k_for(&self, speed: MoveSpeed) -> f32 {
        let k = match speed {
            MoveSpeed::Slow => self.k_slow,
            MoveSpeed::Normal => self.k_normal,
            MoveSpeed::Fast => self.k_fast,
        };
        k.min(self.k_max)
    }

    /// One smoothing step.  A zero `dt_ms` is a no-op.
    pub fn tick(&self, motion: &mut MotionState, dt_ms: u32) {
        if dt_ms == 0 {
            return;
        }
        let k = self.k_for(motion.speed);

        for o in &mut motion.eyes {
            o.offset_x += (o.target_offset_x - o.offset_x) * k;
            o.offset_y += (o.target_offset_y - o.offset_y) * k;
            o.scale_x += (o.target_scale_x - o.scale_x) * k;
            o.scale_y += (o.target_scale_y - o.scale_y) * k;
        }

        // Body only; jitter is never damped.
        let g = &mut motion.global;
        if !g.is_jittering() {
            g.off_x = approach(g.off_x, g.target_off_x, k, self.snap_epsilon);
            g.off_y = approach(g.off_y, g.target_off_y, k, self.snap_epsilon);
        }
    }
}

fn approach(current: f32, target: f32, k: f32, epsilon: f32) -> f32 {
    let d = target - current;
    if d.abs() < epsilon {
        target
    } else {
        current + d * k
    }
}
