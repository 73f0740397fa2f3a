//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged since boot.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            AppEvent::Started { layer, hatching } => {
                info!("START | layer={:?} hatching={}", layer, hatching);
            }
            AppEvent::LayerChanged { from, to } => {
                info!("LAYER | {:?} -> {:?}", from, to);
            }
            AppEvent::Gesture(g) => {
                info!("GESTURE | {:?} @ ({},{}) {}ms", g.kind, g.x, g.y, g.duration_ms);
            }
            AppEvent::EmotionChanged { from, to } => {
                info!("EMOTION | {:?} -> {:?}", from, to);
            }
            AppEvent::IdleBehaviorStarted(kind) => {
                debug!("IDLE | {:?} started", kind);
            }
            AppEvent::IdleBehaviorFinished(kind) => {
                debug!("IDLE | {:?} finished", kind);
            }
            AppEvent::SubStateChanged { which, active } => {
                info!(
                    "MOOD | {:?} {}",
                    which,
                    if *active { "activated" } else { "cleared" }
                );
            }
            AppEvent::GameFinished(r) => {
                info!(
                    "GAME | {:?} hits={} mood{:+} energy{:+}",
                    r.outcome, r.hits, r.mood_delta, r.energy_delta
                );
            }
            AppEvent::SequenceStarted(seq) => {
                info!("SEQUENCE | {:?} started", seq);
            }
            AppEvent::SequenceFinished(seq) => {
                info!("SEQUENCE | {:?} finished", seq);
            }
            AppEvent::HatchPhase(phase) => {
                info!("HATCH | phase {}", phase);
            }
            AppEvent::ClockShown => info!("CLOCK | shown"),
            AppEvent::ClockHidden => info!("CLOCK | hidden"),
        }
    }
}
