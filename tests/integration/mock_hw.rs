//! Mock ports for integration tests.
//!
//! Scripted touch source, recording audio, a mock pet record, a recording
//! event sink and an in-memory config store, plus a [`Harness`] that
//! drives the full `CompanionService` one 16 ms frame at a time.

use std::cell::RefCell;
use std::collections::VecDeque;

use eyepal::app::events::AppEvent;
use eyepal::app::ports::{
    AudioCue, CareStats, ConfigError, ConfigPort, EventSink, FeatureGate, PetRecord,
    TouchSampleSource,
};
use eyepal::app::service::CompanionService;
use eyepal::care::Stat;
use eyepal::config::EngineConfig;
use eyepal::drivers::gesture::{Point, TouchSample};
use eyepal::fsm::LayerId;
use eyepal::level::Feature;
use eyepal::random::Mulberry32;

pub const FRAME_MS: u32 = 16;

/// Between the eyes, inside the selected-item and stats-title boxes.
pub const CENTRE: Point = Point::new(120, 120);
/// Top edge of the screen, clear of every hit box.
pub const TOP: Point = Point::new(120, 20);
pub const LEFT_EYE: Point = Point::new(75, 120);
pub const RIGHT_EYE: Point = Point::new(165, 120);

// ── Audio call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCall {
    Blink,
    Swoosh(f32),
    JitterNoise(f32),
    HappyPip(f32),
}

// ── MockHardware ──────────────────────────────────────────────

/// Touch samples are consumed one per poll; the interrupt edge is raised
/// whenever samples are queued.
#[derive(Default)]
pub struct MockHardware {
    pub samples: VecDeque<TouchSample>,
    pub audio: Vec<AudioCall>,
    pub polls: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, samples: impl IntoIterator<Item = TouchSample>) {
        self.samples.extend(samples);
    }

    pub fn is_drained(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TouchSampleSource for MockHardware {
    fn poll(&mut self) -> TouchSample {
        self.polls += 1;
        self.samples.pop_front().unwrap_or(TouchSample::Released)
    }

    fn consume_interrupt_edge(&mut self) -> bool {
        !self.samples.is_empty()
    }
}

impl AudioCue for MockHardware {
    fn blink(&mut self) {
        self.audio.push(AudioCall::Blink);
    }

    fn swoosh(&mut self, strength: f32) {
        self.audio.push(AudioCall::Swoosh(strength));
    }

    fn jitter_noise(&mut self, strength: f32) {
        self.audio.push(AudioCall::JitterNoise(strength));
    }

    fn happy_pip(&mut self, strength: f32) {
        self.audio.push(AudioCall::HappyPip(strength));
    }
}

// ── MockPet ───────────────────────────────────────────────────

pub struct MockPet {
    pub stats: [u8; Stat::COUNT],
    pub hatched: bool,
    pub all_unlocked: bool,
    pub decay_suspended: bool,
}

#[allow(dead_code)]
impl MockPet {
    pub fn new(value: u8) -> Self {
        Self {
            stats: [value; Stat::COUNT],
            hatched: true,
            all_unlocked: true,
            decay_suspended: false,
        }
    }

    pub fn egg() -> Self {
        Self {
            hatched: false,
            ..Self::new(50)
        }
    }
}

impl CareStats for MockPet {
    fn stat(&self, stat: Stat) -> u8 {
        self.stats[stat.index()]
    }

    fn add(&mut self, stat: Stat, delta: i16) {
        let v = &mut self.stats[stat.index()];
        *v = (i16::from(*v) + delta).clamp(0, 100) as u8;
    }
}

impl FeatureGate for MockPet {
    fn is_unlocked(&self, _feature: Feature) -> bool {
        self.all_unlocked
    }
}

impl PetRecord for MockPet {
    fn is_hatched(&self) -> bool {
        self.hatched
    }

    fn mark_hatched(&mut self) {
        self.hatched = true;
    }

    fn set_decay_suspended(&mut self, suspended: bool, _now_ms: u32) {
        self.decay_suspended = suspended;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn layer_path(&self) -> Vec<LayerId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::LayerChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockConfigStore ───────────────────────────────────────────

#[derive(Default)]
pub struct MockConfigStore {
    pub saved: RefCell<Vec<EngineConfig>>,
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        Ok(self.saved.borrow().last().cloned().unwrap_or_default())
    }

    fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        self.saved.borrow_mut().push(config.clone());
        Ok(())
    }
}

// ── Harness ───────────────────────────────────────────────────

pub struct Harness {
    pub app: CompanionService<Mulberry32>,
    pub hw: MockHardware,
    pub pet: MockPet,
    pub sink: RecordingSink,
    pub now: u32,
}

#[allow(dead_code)]
impl Harness {
    /// Hatched pet with every statistic at 60, started at t = 0.
    pub fn new() -> Self {
        Self::with_pet(MockPet::new(60))
    }

    pub fn with_pet(pet: MockPet) -> Self {
        let mut h = Self {
            app: CompanionService::new(EngineConfig::default(), Mulberry32::new(0x5EED)),
            hw: MockHardware::new(),
            pet,
            sink: RecordingSink::default(),
            now: 0,
        };
        h.app.start(h.now, &mut h.pet, &mut h.sink);
        h
    }

    pub fn step(&mut self) {
        self.app.tick(self.now, &mut self.hw, &mut self.pet, &mut self.sink);
        self.now += FRAME_MS;
    }

    pub fn run_for(&mut self, ms: u32) {
        let end = self.now + ms;
        while self.now < end {
            self.step();
        }
    }

    /// Play queued samples to the end, plus one settling frame.
    pub fn drain_touch(&mut self) {
        while !self.hw.is_drained() {
            self.step();
        }
        self.step();
    }

    /// A 64 ms press without drift.
    pub fn tap(&mut self, p: Point) {
        self.hw.queue([TouchSample::Contact(p); 4]);
        self.hw.queue([TouchSample::Released]);
        self.drain_touch();
    }

    /// Held for ~500 ms, then lifted.
    pub fn long_press(&mut self, p: Point) {
        self.hw.queue([TouchSample::Contact(p); 32]);
        self.hw.queue([TouchSample::Released]);
        self.drain_touch();
    }

    /// Straight drag from `from` to `to` over five samples.
    pub fn swipe(&mut self, from: Point, to: Point) {
        for i in 0..=4u16 {
            let lerp = |a: u16, b: u16| -> u16 {
                (i32::from(a) + (i32::from(b) - i32::from(a)) * i32::from(i) / 4) as u16
            };
            self.hw
                .queue([TouchSample::Contact(Point::new(lerp(from.x, to.x), lerp(from.y, to.y)))]);
        }
        self.hw.queue([TouchSample::Released]);
        self.drain_touch();
    }

    pub fn swipe_down(&mut self) {
        self.swipe(Point::new(120, 60), Point::new(120, 180));
    }

    pub fn swipe_up(&mut self) {
        self.swipe(Point::new(120, 180), Point::new(120, 60));
    }

    /// From the closed layer, open the menu and move the carousel
    /// `steps` items forward.
    pub fn open_menu_at(&mut self, steps: usize) {
        self.tap(TOP);
        assert_eq!(self.app.current_layer(), LayerId::Open);
        for _ in 0..steps {
            self.swipe_down();
        }
    }

    pub fn layer(&self) -> LayerId {
        self.app.current_layer()
    }
}
