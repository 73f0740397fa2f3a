//! Outbound application events.
//!
//! The [`CompanionService`](super::service::CompanionService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, drive a
//! sound bank, feed a test recorder.

use crate::behavior::idle::IdleBehaviorKind;
use crate::drivers::gesture::GestureEvent;
use crate::fsm::LayerId;
use crate::game::GameResult;
use crate::mood::{Emotion, SubState};

/// Timed full-screen sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Feed,
    Clean,
    Sleep,
    Hatch,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial layer).
    Started { layer: LayerId, hatching: bool },

    /// The layer machine moved.
    LayerChanged { from: LayerId, to: LayerId },

    /// A gesture was classified and accepted for dispatch.
    Gesture(GestureEvent),

    EmotionChanged { from: Emotion, to: Emotion },

    IdleBehaviorStarted(IdleBehaviorKind),
    IdleBehaviorFinished(IdleBehaviorKind),

    /// A mood sub-state activated or cleared.
    SubStateChanged { which: SubState, active: bool },

    GameFinished(GameResult),

    SequenceStarted(Sequence),
    SequenceFinished(Sequence),

    /// The egg moved on to phase 2, 3 or 4.
    HatchPhase(u8),

    ClockShown,
    ClockHidden,
}
