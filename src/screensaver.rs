//! Idle-clock screensaver.
//!
//! After a long stretch without interaction the eyes give way to a clock
//! face.  The first gesture that arrives while the clock is up only
//! dismisses it; the service never forwards that gesture to a layer.

use log::info;

use crate::config::EngineConfig;
use crate::timing::{elapsed, reached};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockChange {
    Shown,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct Screensaver {
    timeout_ms: u32,
    last_interaction_ms: u32,
    visible: bool,
}

impl Screensaver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timeout_ms: config.screensaver_timeout_ms,
            last_interaction_ms: 0,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn idle_for(&self, now_ms: u32) -> u32 {
        elapsed(now_ms, self.last_interaction_ms)
    }

    /// Restart the idle timer and hide the clock.  Returns `true` if the
    /// clock was showing.
    pub fn notify_user_interaction(&mut self, now_ms: u32) -> bool {
        self.last_interaction_ms = now_ms;
        self.hide()
    }

    /// Show the clock once idle long enough.  `eligible` is false while
    /// a menu layer or a timed sequence owns the screen; the clock is
    /// hidden again if it was showing.
    pub fn update(&mut self, now_ms: u32, eligible: bool) -> Option<ClockChange> {
        if !eligible {
            return self.hide().then_some(ClockChange::Hidden);
        }
        if !self.visible && reached(now_ms, self.last_interaction_ms.wrapping_add(self.timeout_ms)) {
            self.visible = true;
            info!("CLOCK: shown after {} ms idle", self.idle_for(now_ms));
            return Some(ClockChange::Shown);
        }
        None
    }

    fn hide(&mut self) -> bool {
        if !self.visible {
            return false;
        }
        self.visible = false;
        info!("CLOCK: hidden");
        true
    }
}
