//! Shared mutable context threaded through every layer handler.
//!
//! `LayerContext` is the blackboard the layer handlers read from and write
//! to: menu and stat selections, the gesture block flag, the feed timer,
//! and a small queue of [`LayerEffect`]s that the service applies after
//! each dispatch.  Handlers never touch the behavior engine directly.

use heapless::Vec;
use log::warn;

use crate::care::Stat;
use crate::config::EngineConfig;

// ---------------------------------------------------------------------------
// Menu items
// ---------------------------------------------------------------------------

/// Main menu entries, in carousel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MenuItem {
    Feed = 0,
    Play = 1,
    Clean = 2,
    Sleep = 3,
    Connect = 4,
    Message = 5,
    Battery = 6,
    Stats = 7,
    Level = 8,
}

impl MenuItem {
    pub const COUNT: usize = 9;

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Feed,
            1 => Self::Play,
            2 => Self::Clean,
            3 => Self::Sleep,
            4 => Self::Connect,
            5 => Self::Message,
            6 => Self::Battery,
            7 => Self::Stats,
            8 => Self::Level,
            _ => {
                debug_assert!(false, "invalid menu index: {idx}");
                Self::Level
            }
        }
    }

    /// Next item, clamped at the end of the list.
    pub fn next(self) -> Self {
        Self::from_index((self as usize + 1).min(Self::COUNT - 1))
    }

    /// Previous item, clamped at the start of the list.
    pub fn prev(self) -> Self {
        Self::from_index((self as usize).saturating_sub(1))
    }
}

// ---------------------------------------------------------------------------
// Effects (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// Requests from the layer handlers to the rest of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEffect {
    /// The eyes lost the screen; cancel any idle behavior.
    SuspendIdle,
    /// Tap on an eye in the closed layer.
    TriggerEmotion,
    StartSleep,
    StartClean { return_to_stats: bool },
    FeedStarted,
    FeedFinished,
    /// Options-panel activation for a statistic.
    BoostStat(Stat),
    StartGame,
    GameTap { x: u16, y: u16 },
    StopGame,
}

const EFFECT_CAPACITY: usize = 8;

// ---------------------------------------------------------------------------
// Game status line
// ---------------------------------------------------------------------------

/// What the games panel shows after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    None,
    Playing,
    Finished { hits: u8, mood_delta: i16 },
    WrongTap { hits: u8, mood_delta: i16 },
}

// ---------------------------------------------------------------------------
// LayerContext
// ---------------------------------------------------------------------------

pub struct LayerContext {
    // -- Timing --
    /// Timestamp of the current dispatch or tick.
    pub now_ms: u32,
    /// Timestamp at which the current layer was entered.
    pub entered_at_ms: u32,

    // -- Selections --
    pub menu_item: MenuItem,
    /// Statistic shown on the stats panel.
    pub stat: Stat,
    /// Highlighted entry on the options panel.
    pub option_index: u8,
    /// Games panel was reached from the Play menu item rather than Stats.
    pub games_from_menu: bool,

    // -- Panel state --
    pub connect_requested: bool,
    pub game_running: bool,
    pub game_status: GameStatus,
    feed_ends_at: Option<u32>,
    feed_duration_ms: u32,

    // -- Touch --
    /// Drop all gestures until the finger is lifted.
    pub block_until_lift: bool,

    effects: Vec<LayerEffect, EFFECT_CAPACITY>,
}

impl LayerContext {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            now_ms: 0,
            entered_at_ms: 0,
            menu_item: MenuItem::Feed,
            stat: Stat::Hunger,
            option_index: 0,
            games_from_menu: false,
            connect_requested: false,
            game_running: false,
            game_status: GameStatus::None,
            feed_ends_at: None,
            feed_duration_ms: config.feed_duration_ms,
            block_until_lift: false,
            effects: Vec::new(),
        }
    }

    /// Queue an effect.  Overflow drops the effect with a warning.
    pub fn push_effect(&mut self, effect: LayerEffect) {
        if self.effects.push(effect).is_err() {
            warn!("LAYER effect queue full, dropped {:?}", effect);
        }
    }

    /// Take every queued effect in order.
    pub fn drain_effects(&mut self) -> Vec<LayerEffect, EFFECT_CAPACITY> {
        core::mem::take(&mut self.effects)
    }

    pub fn pending_effects(&self) -> &[LayerEffect] {
        &self.effects
    }

    pub(super) fn start_feed(&mut self) {
        self.feed_ends_at = Some(self.now_ms.wrapping_add(self.feed_duration_ms));
    }

    pub(super) fn feed_deadline(&self) -> Option<u32> {
        self.feed_ends_at
    }

    pub(super) fn clear_feed(&mut self) {
        self.feed_ends_at = None;
    }

    pub fn is_feeding(&self) -> bool {
        self.feed_ends_at.is_some()
    }
}
