//! Inbound commands to the application service.
//!
//! These are actions requested from outside the touch path (serial
//! console, test harness, scheduler) that the
//! [`CompanionService`](super::service::CompanionService) interprets.
//! Layer commands are silent no-ops when the layer they act on is not
//! active.

use crate::config::EngineConfig;
use crate::mood::Emotion;

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Open the menu from the closed layer.
    OpenMenu,

    /// Return to the closed layer from anywhere.
    CloseMenu,

    SelectNext,
    SelectPrev,
    ActivateSelected,

    /// Show an emotion now, bypassing the scheduler.
    SetEmotion(Emotion),

    /// Run an immediate scheduled pick.
    TriggerEmotion,

    SetEmotionWeight(Emotion, u16),

    StartSleep,

    /// Replay the hatch sequence.
    StartHatch,

    /// Replace the tuning (persisted by the next auto-save; applied on
    /// the next boot).
    UpdateConfig(EngineConfig),

    /// Persist the current config at the next auto-save check.
    SaveConfig,
}
