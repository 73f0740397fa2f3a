//! Companion service: the hexagonal core.
//!
//! [`CompanionService`] owns the gesture classifier, the layer machine,
//! the mood evaluator, both schedulers, the timed sequences and the
//! motion state.  All I/O flows through port traits injected at call
//! sites, so the whole engine runs under test with mock adapters.
//!
//! ```text
//!  TouchSampleSource ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                        │       CompanionService        │
//!          AudioCue ◀──  │ Gesture · Layers · Mood · Idle │ ──▶ EyeFrame
//!         PetRecord ◀──▶ └──────────────────────────────┘
//! ```
//!
//! One [`tick`](CompanionService::tick) per main-loop iteration, in this
//! order: classify touch, dispatch to the layer machine, advance timed
//! layers and sequences, evaluate mood, run the emotion and idle
//! schedulers, then jitter and interpolation.

use log::{debug, info, warn};

use crate::behavior::emotion::{EmotionChange, EmotionScheduler};
use crate::behavior::idle::{IdleBehaviorKind, IdleContext, IdleScheduler, IdleTransition};
use crate::behavior::sequences::{CleanSequence, HatchSequence, HatchUpdate, SleepSequence};
use crate::care::Stat;
use crate::config::EngineConfig;
use crate::drivers::gesture::{GestureClassifier, GestureEvent, GestureKind};
use crate::fsm::context::{GameStatus, LayerContext, LayerEffect};
use crate::fsm::layers::build_layer_table;
use crate::fsm::{LayerId, LayerMachine};
use crate::game::{GameOutcome, GameResult, TapTheGreens};
use crate::motion::{EyeFrame, Interpolator, MotionState, Rgb};
use crate::mood::{Emotion, MoodEvaluator, MoodSnapshot, SubState, SubStates};
use crate::random::{Mulberry32, RandomSource};
use crate::screensaver::{ClockChange, Screensaver};
use crate::timing::elapsed;

use super::commands::AppCommand;
use super::events::{AppEvent, Sequence};
use super::ports::{AudioCue, ConfigPort, EventSink, PetRecord, TouchSampleSource};

/// Hunger restored when a feed finishes.
const FEED_HUNGER_BOOST: i16 = 10;
/// Cleanliness restored when a clean finishes.
const CLEAN_BOOST: i16 = 30;
/// Energy restored by waking from sleep.
const WAKE_ENERGY_BOOST: i16 = 10;
/// Config auto-save delay after the last change.
const CONFIG_SAVE_DELAY_MS: u32 = 5000;

// ───────────────────────────────────────────────────────────────
// CompanionService
// ───────────────────────────────────────────────────────────────

pub struct CompanionService<R: RandomSource = Mulberry32> {
    config: EngineConfig,
    classifier: GestureClassifier,
    pending_edge: bool,
    layers: LayerMachine,
    ctx: LayerContext,
    mood: MoodEvaluator,
    snapshot: MoodSnapshot,
    sub_states: SubStates,
    idle: IdleScheduler,
    emotions: EmotionScheduler,
    motion: MotionState,
    interpolator: Interpolator,
    sleep: SleepSequence,
    clean: CleanSequence,
    hatch: HatchSequence,
    game: TapTheGreens,
    screensaver: Screensaver,
    rng: R,
    last_tick_ms: Option<u32>,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_ms: u32,
}

impl<R: RandomSource> CompanionService<R> {
    /// Construct the service.  Does **not** start it; call [`start`] next.
    ///
    /// [`start`]: Self::start
    pub fn new(config: EngineConfig, rng: R) -> Self {
        Self {
            classifier: GestureClassifier::new(&config),
            pending_edge: false,
            layers: LayerMachine::new(build_layer_table(), LayerId::Closed),
            ctx: LayerContext::new(&config),
            mood: MoodEvaluator::new(&config),
            snapshot: MoodSnapshot::default(),
            sub_states: SubStates::default(),
            idle: IdleScheduler::new(&config),
            emotions: EmotionScheduler::new(&config),
            motion: MotionState::new(&config),
            interpolator: Interpolator::new(&config),
            sleep: SleepSequence::default(),
            clean: CleanSequence::default(),
            hatch: HatchSequence::default(),
            game: TapTheGreens::new(&config),
            screensaver: Screensaver::new(&config),
            rng,
            last_tick_ms: None,
            tick_count: 0,
            config_dirty: false,
            dirty_since_ms: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the closed layer.  An unhatched pet starts the hatch
    /// sequence straight away.
    pub fn start(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        self.ctx.now_ms = now_ms;
        self.layers.start(&mut self.ctx);
        self.screensaver.notify_user_interaction(now_ms);
        let hatching = !pet.is_hatched();
        sink.emit(&AppEvent::Started {
            layer: self.layers.current_layer(),
            hatching,
        });
        if hatching {
            self.start_hatch(now_ms, pet, sink);
        }
        info!("CompanionService started (hatching={})", hatching);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one frame.
    ///
    /// `hw` satisfies **both** [`TouchSampleSource`] and [`AudioCue`],
    /// which avoids a double mutable borrow while keeping the port
    /// boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl TouchSampleSource + AudioCue),
        pet: &mut impl PetRecord,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let dt_ms = self.last_tick_ms.map_or(0, |last| elapsed(now_ms, last));
        self.last_tick_ms = Some(now_ms);
        self.ctx.now_ms = now_ms;
        let prev_layer = self.layers.current_layer();

        // 1. Touch → gesture
        let gesture = self.poll_touch(now_ms, hw);

        // 2. Dispatch
        if let Some(ev) = gesture {
            self.dispatch(ev, now_ms, pet, sink);
        }
        self.apply_effects(now_ms, pet, sink);

        // 3. Game and time-driven layers
        if self.game.is_running() {
            if let Some(result) = self.game.update(now_ms, &mut self.rng) {
                self.finish_game(result, pet, sink);
            }
        }
        self.ctx.game_running = self.game.is_running();
        self.layers.tick(&mut self.ctx);
        self.apply_effects(now_ms, pet, sink);

        // 4. Sequences
        self.update_sequences(now_ms, pet, sink);

        // 5. Mood
        pet.decay(now_ms);
        self.snapshot = self.mood.update(pet.reading(), now_ms, &*pet);
        self.emit_sub_state_changes(sink);

        // 6. Emotion + idle
        self.update_behaviors(now_ms, hw, pet, sink);

        // 7. Motion
        self.motion.global.update_jitter(now_ms, &mut self.rng);
        self.interpolator.tick(&mut self.motion, dt_ms);
        self.motion.tint.step(self.emotions.current().tint(), now_ms);

        // 8. Screensaver
        let eligible = self.layers.current_layer() == LayerId::Closed && !self.sequence_active();
        match self.screensaver.update(now_ms, eligible) {
            Some(ClockChange::Shown) => sink.emit(&AppEvent::ClockShown),
            Some(ClockChange::Hidden) => sink.emit(&AppEvent::ClockHidden),
            None => {}
        }

        let new_layer = self.layers.current_layer();
        if new_layer != prev_layer {
            sink.emit(&AppEvent::LayerChanged {
                from: prev_layer,
                to: new_layer,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        pet: &mut impl PetRecord,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        let prev_layer = self.layers.current_layer();
        match cmd {
            AppCommand::OpenMenu => {
                if !self.sequence_active() {
                    self.layers.open(&mut self.ctx);
                }
            }
            AppCommand::CloseMenu => self.layers.close(&mut self.ctx),
            AppCommand::SelectNext => self.layers.select_next(&mut self.ctx),
            AppCommand::SelectPrev => self.layers.select_prev(&mut self.ctx),
            AppCommand::ActivateSelected => self.layers.activate_selected(&mut self.ctx),
            AppCommand::SetEmotion(emotion) => {
                let change = self.emotions.set_emotion(emotion, now_ms);
                self.emit_emotion_change(change, sink);
            }
            AppCommand::TriggerEmotion => self.trigger_emotion(now_ms, sink),
            AppCommand::SetEmotionWeight(emotion, weight) => {
                self.emotions.set_weight(emotion, weight);
                info!("EMOTION weight {:?} = {}", emotion, weight);
            }
            AppCommand::StartSleep => self.start_sleep(now_ms, sink),
            AppCommand::StartHatch => self.start_hatch(now_ms, pet, sink),
            AppCommand::UpdateConfig(config) => {
                self.mark_config_dirty(now_ms);
                self.config = config;
                info!("Configuration updated (applied on next boot)");
            }
            AppCommand::SaveConfig => {
                self.mark_config_dirty(now_ms);
                self.dirty_since_ms = now_ms.wrapping_sub(CONFIG_SAVE_DELAY_MS);
                info!("Explicit config save requested");
            }
        }
        self.apply_effects(now_ms, pet, sink);
        let new_layer = self.layers.current_layer();
        if new_layer != prev_layer {
            sink.emit(&AppEvent::LayerChanged {
                from: prev_layer,
                to: new_layer,
            });
        }
    }

    /// Reset the screensaver timer from outside the touch path.
    pub fn notify_user_interaction(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        if self.screensaver.notify_user_interaction(now_ms) {
            sink.emit(&AppEvent::ClockHidden);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_layer(&self) -> LayerId {
        self.layers.current_layer()
    }

    pub fn is_open(&self) -> bool {
        self.current_layer() == LayerId::Open
    }

    pub fn is_feeding(&self) -> bool {
        self.current_layer() == LayerId::Feeding
    }

    pub fn is_game_active(&self) -> bool {
        self.current_layer() == LayerId::GameActive
    }

    pub fn is_asleep(&self) -> bool {
        self.sleep.is_active()
    }

    pub fn is_cleaning(&self) -> bool {
        self.clean.is_active()
    }

    pub fn is_hatching(&self) -> bool {
        self.hatch.is_active()
    }

    pub fn is_clock_visible(&self) -> bool {
        self.screensaver.is_visible()
    }

    pub fn current_emotion(&self) -> Emotion {
        self.emotions.current()
    }

    /// Geometry for the renderer.
    pub fn frame(&self) -> EyeFrame {
        self.motion.frame()
    }

    /// Eye colours while the game runs, left then right.
    pub fn game_colors(&self) -> Option<[Rgb; 2]> {
        self.game.is_running().then(|| self.game.colors().map(|c| c.rgb()))
    }

    pub fn hatch(&self) -> &HatchSequence {
        &self.hatch
    }

    pub fn mood_snapshot(&self) -> &MoodSnapshot {
        &self.snapshot
    }

    pub fn layer_context(&self) -> &LayerContext {
        &self.ctx
    }

    pub fn idle(&self) -> &IdleScheduler {
        &self.idle
    }

    pub fn emotions(&self) -> &EmotionScheduler {
        &self.emotions
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn current_config(&self) -> EngineConfig {
        self.config.clone()
    }

    // ── Internal: touch ───────────────────────────────────────

    /// Poll the bus at the configured floor while a contact is tracked or
    /// an interrupt edge is pending.
    fn poll_touch(&mut self, now_ms: u32, hw: &mut impl TouchSampleSource) -> Option<GestureEvent> {
        self.pending_edge |= hw.consume_interrupt_edge();
        let gesture = if (self.pending_edge || self.classifier.is_pressed())
            && self.classifier.should_poll(now_ms)
        {
            self.pending_edge = false;
            let sample = hw.poll();
            self.classifier.feed(sample, now_ms)
        } else {
            None
        };

        if self.ctx.block_until_lift && !self.classifier.is_pressed() {
            self.ctx.block_until_lift = false;
            debug!("TOUCH gesture block cleared after release");
        }
        match gesture {
            Some(ev) if self.ctx.block_until_lift => {
                debug!("TOUCH dropped {:?} while blocked", ev.kind);
                None
            }
            other => other,
        }
    }

    fn dispatch(
        &mut self,
        ev: GestureEvent,
        now_ms: u32,
        pet: &mut impl PetRecord,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::Gesture(ev));
        let clock_was_visible = self.screensaver.is_visible();
        if self.screensaver.notify_user_interaction(now_ms) {
            sink.emit(&AppEvent::ClockHidden);
        }

        if self.hatch.is_active() {
            if ev.kind == GestureKind::Tap {
                self.hatch.handle_tap(now_ms, &mut self.rng);
            }
            return;
        }
        if self.clean.is_active() {
            debug!("TOUCH ignored while cleaning");
            return;
        }
        if self.sleep.is_active() {
            if ev.kind == GestureKind::Tap {
                self.wake(now_ms, pet, sink);
                self.ctx.block_until_lift = true;
            }
            return;
        }
        if self.layers.current_layer() == LayerId::Feeding {
            debug!("TOUCH ignored while feeding");
            return;
        }
        if clock_was_visible {
            debug!("TOUCH dismissed clock");
            return;
        }
        self.layers.handle(&ev, &mut self.ctx);
    }

    // ── Internal: layer effects ───────────────────────────────

    fn apply_effects(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        // Applying an effect can change layer, which queues exit effects.
        while !self.ctx.pending_effects().is_empty() {
            self.apply_queued_effects(now_ms, pet, sink);
        }
    }

    fn apply_queued_effects(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        for effect in self.ctx.drain_effects() {
            debug!("LAYER effect {:?}", effect);
            match effect {
                LayerEffect::SuspendIdle => {
                    self.idle.cancel(&mut self.motion);
                }
                LayerEffect::TriggerEmotion => self.trigger_emotion(now_ms, sink),
                LayerEffect::StartSleep => self.start_sleep(now_ms, sink),
                LayerEffect::StartClean { return_to_stats } => {
                    self.start_clean(now_ms, return_to_stats, sink);
                }
                LayerEffect::FeedStarted => {
                    let duration = self.config.feed_duration_ms;
                    self.idle.start_behavior(
                        IdleBehaviorKind::HappyBounce,
                        now_ms,
                        duration,
                        &mut self.motion,
                        &mut self.rng,
                    );
                    sink.emit(&AppEvent::SequenceStarted(Sequence::Feed));
                }
                LayerEffect::FeedFinished => {
                    pet.add_hunger(FEED_HUNGER_BOOST);
                    self.idle.cancel(&mut self.motion);
                    sink.emit(&AppEvent::SequenceFinished(Sequence::Feed));
                }
                LayerEffect::BoostStat(stat) => {
                    pet.add(stat, i16::from(self.config.option_boost));
                    info!("OPTIONS: {} +{}", stat, self.config.option_boost);
                }
                LayerEffect::StartGame => {
                    self.game.start(now_ms, &mut self.rng);
                    if !self.game.is_running() {
                        if let Some(result) = self.game.last_result() {
                            self.finish_game(result, pet, sink);
                        }
                    }
                    self.ctx.game_running = self.game.is_running();
                }
                LayerEffect::GameTap { x, .. } => {
                    if let Some(result) = self.game.handle_tap(x, now_ms, &mut self.rng) {
                        self.finish_game(result, pet, sink);
                    }
                }
                LayerEffect::StopGame => {
                    if let Some(result) = self.game.stop() {
                        self.finish_game(result, pet, sink);
                    }
                }
            }
        }
    }

    fn finish_game(&mut self, result: GameResult, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        result.apply(pet, self.game.reward_per_hit());
        self.ctx.game_running = false;
        self.ctx.game_status = match result.outcome {
            GameOutcome::Normal => GameStatus::Finished {
                hits: result.hits,
                mood_delta: result.mood_delta,
            },
            GameOutcome::WrongTap => GameStatus::WrongTap {
                hits: result.hits,
                mood_delta: result.mood_delta,
            },
        };
        sink.emit(&AppEvent::GameFinished(result));
    }

    // ── Internal: sequences ───────────────────────────────────

    fn sequence_active(&self) -> bool {
        self.sleep.is_active() || self.clean.is_active() || self.hatch.is_active()
    }

    fn start_sleep(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.idle.cancel(&mut self.motion);
        if !self.sleep.start(now_ms, &mut self.motion) {
            return;
        }
        let change = self.emotions.set_emotion(Emotion::Idle, now_ms);
        self.emit_emotion_change(change, sink);
        self.layers.close(&mut self.ctx);
        sink.emit(&AppEvent::SequenceStarted(Sequence::Sleep));
    }

    fn wake(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        if !self.sleep.wake(&mut self.motion) {
            return;
        }
        pet.add_energy(WAKE_ENERGY_BOOST);
        let change = self.emotions.set_emotion(Emotion::Idle, now_ms);
        self.emit_emotion_change(change, sink);
        self.emotions.schedule_next_pick(now_ms, &mut self.rng);
        sink.emit(&AppEvent::SequenceFinished(Sequence::Sleep));
    }

    fn start_clean(&mut self, now_ms: u32, return_to_stats: bool, sink: &mut impl EventSink) {
        let duration = self.config.clean_duration_ms;
        if !self.clean.start(now_ms, duration, return_to_stats) {
            return;
        }
        let change = self.emotions.set_emotion(Emotion::Idle, now_ms);
        self.emit_emotion_change(change, sink);
        self.idle.start_behavior(
            IdleBehaviorKind::HappyBounce,
            now_ms,
            duration,
            &mut self.motion,
            &mut self.rng,
        );
        sink.emit(&AppEvent::SequenceStarted(Sequence::Clean));
    }

    fn start_hatch(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        if self.hatch.is_active() {
            return;
        }
        self.idle.cancel(&mut self.motion);
        self.sleep.wake(&mut self.motion);
        self.layers.close(&mut self.ctx);
        self.apply_effects(now_ms, pet, sink);
        let change = self.emotions.set_emotion(Emotion::Idle, now_ms);
        self.emit_emotion_change(change, sink);
        pet.set_decay_suspended(true, now_ms);
        self.hatch.start(now_ms, &mut self.rng);
        sink.emit(&AppEvent::SequenceStarted(Sequence::Hatch));
    }

    fn update_sequences(&mut self, now_ms: u32, pet: &mut impl PetRecord, sink: &mut impl EventSink) {
        self.sleep.update(now_ms, &mut self.motion);

        if let Some(return_to_stats) = self.clean.poll_finished(now_ms) {
            pet.add_cleanliness(CLEAN_BOOST);
            self.idle.cancel(&mut self.motion);
            self.emotions.schedule_next_pick(now_ms, &mut self.rng);
            if return_to_stats {
                self.ctx.stat = Stat::Cleanliness;
                self.layers.force_transition(LayerId::Stats, &mut self.ctx);
                self.apply_effects(now_ms, pet, sink);
            }
            sink.emit(&AppEvent::SequenceFinished(Sequence::Clean));
        }

        if self.hatch.is_active() {
            match self.hatch.update(now_ms, &mut self.rng) {
                HatchUpdate::Running => {}
                HatchUpdate::PhaseChanged(phase) => sink.emit(&AppEvent::HatchPhase(phase)),
                HatchUpdate::Finished => {
                    pet.mark_hatched();
                    pet.set_decay_suspended(false, now_ms);
                    self.screensaver.notify_user_interaction(now_ms);
                    self.emotions.schedule_next_pick(now_ms, &mut self.rng);
                    sink.emit(&AppEvent::SequenceFinished(Sequence::Hatch));
                }
            }
        }
    }

    // ── Internal: behaviors ───────────────────────────────────

    fn update_behaviors(
        &mut self,
        now_ms: u32,
        audio: &mut impl AudioCue,
        pet: &mut impl PetRecord,
        sink: &mut impl EventSink,
    ) {
        let layer = self.layers.current_layer();
        let owned = self.sleep.is_active() || self.hatch.is_active() || self.screensaver.is_visible();
        if owned || !matches!(layer, LayerId::Closed | LayerId::Feeding) {
            // A behavior left running here would freeze its pose mid-animation.
            if self.idle.is_busy() {
                self.idle.cancel(&mut self.motion);
            }
            return;
        }

        let eyes_free = layer == LayerId::Closed && !self.clean.is_active();
        if eyes_free {
            let change = self
                .emotions
                .tick(now_ms, &self.snapshot, self.idle.is_busy(), &mut self.rng);
            if let Some(change) = change {
                self.emit_emotion_change(change, sink);
            }
        }

        let ctx = self.idle_context(now_ms, eyes_free);
        let transition = self
            .idle
            .tick(ctx, &mut self.motion, &self.snapshot, &*pet, audio, &mut self.rng);
        match transition {
            Some(IdleTransition::Started(kind)) => sink.emit(&AppEvent::IdleBehaviorStarted(kind)),
            Some(IdleTransition::Finished(kind)) => sink.emit(&AppEvent::IdleBehaviorFinished(kind)),
            None => {}
        }
    }

    fn idle_context(&self, now_ms: u32, eyes_free: bool) -> IdleContext {
        IdleContext {
            now_ms,
            blocked: !eyes_free,
            emotion_busy: self.emotions.is_active(now_ms) || self.emotions.is_ready(now_ms),
        }
    }

    fn trigger_emotion(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.idle.cancel(&mut self.motion);
        let change = self.emotions.trigger_now(now_ms, &self.snapshot, &mut self.rng);
        self.emit_emotion_change(change, sink);
    }

    fn emit_emotion_change(&self, change: EmotionChange, sink: &mut impl EventSink) {
        if change.from != change.to {
            sink.emit(&AppEvent::EmotionChanged {
                from: change.from,
                to: change.to,
            });
        }
    }

    fn emit_sub_state_changes(&mut self, sink: &mut impl EventSink) {
        let now = self.mood.sub_states();
        for which in SubState::ALL {
            let active = now.get(which);
            if active != self.sub_states.get(which) {
                sink.emit(&AppEvent::SubStateChanged { which, active });
            }
        }
        self.sub_states = now;
    }

    // ── Config dirty-flag management ──────────────────────────

    pub fn mark_config_dirty(&mut self, now_ms: u32) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_ms = now_ms;
        }
    }

    /// Save once the config has been stable for five seconds.  Returns
    /// `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, now_ms: u32, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty || elapsed(now_ms, self.dirty_since_ms) < CONFIG_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Save immediately if dirty, ignoring the delay.
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved");
            }
            Err(e) => warn!("Config force-save failed: {}", e),
        }
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
