//! Function-pointer layer state machine.
//!
//! Each UI layer is one row of a fixed table:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  LayerTable                                                          │
//! │  ┌────────────┬──────────┬──────────┬────────────────┬────────────┐  │
//! │  │ LayerId    │ on_enter │ on_exit  │ on_gesture     │ on_update  │  │
//! │  ├────────────┼──────────┼──────────┼────────────────┼────────────┤  │
//! │  │ Closed     │ fn(ctx)  │ fn(ctx)  │ fn(ctx,ev)->?  │ fn(ctx)->? │  │
//! │  │ Open       │ fn(ctx)  │ fn(ctx)  │ fn(ctx,ev)->?  │ fn(ctx)->? │  │
//! │  │ ...        │          │          │                │            │  │
//! │  └────────────┴──────────┴──────────┴────────────────┴────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A gesture is dispatched to `on_gesture` of the **current** layer only.
//! If it returns `Some(next)` the engine runs `on_exit` for the current
//! layer, then `on_enter` for the next.  `on_update` runs once per tick
//! for time-driven exits (feeding ends, game finishes).  Every handler
//! receives `&mut LayerContext`, the shared blackboard.
//!
//! A Tap or LongPress that changes layer always sets
//! [`LayerContext::block_until_lift`], so the still-held finger cannot
//! re-trigger the layer it just landed on.

pub mod context;
pub mod layers;

use context::{LayerContext, MenuItem};
use log::info;

use crate::drivers::gesture::{GestureEvent, GestureKind};

// ---------------------------------------------------------------------------
// Layer identity
// ---------------------------------------------------------------------------

/// Every UI layer.  Exactly one is active.
/// Must stay in sync with the table built in [`layers::build_layer_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LayerId {
    Closed = 0,
    Open = 1,
    Feeding = 2,
    Stats = 3,
    Options = 4,
    Games = 5,
    GameActive = 6,
    Connect = 7,
    Message = 8,
    Battery = 9,
    Level = 10,
}

impl LayerId {
    pub const COUNT: usize = 11;

    /// Convert an index back to `LayerId`.  Panics on out-of-range in
    /// debug builds; returns `Closed` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Closed,
            1 => Self::Open,
            2 => Self::Feeding,
            3 => Self::Stats,
            4 => Self::Options,
            5 => Self::Games,
            6 => Self::GameActive,
            7 => Self::Connect,
            8 => Self::Message,
            9 => Self::Battery,
            10 => Self::Level,
            _ => {
                debug_assert!(false, "invalid layer index: {idx}");
                Self::Closed
            }
        }
    }

    /// Layers that hide the eyes behind a panel.
    pub fn covers_eyes(self) -> bool {
        !matches!(self, Self::Closed | Self::Feeding | Self::GameActive)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit`.  Run exactly once per transition.
pub type LayerActionFn = fn(&mut LayerContext);

/// Gesture handler.  Returns `Some(next)` to change layer.
pub type LayerGestureFn = fn(&mut LayerContext, &GestureEvent) -> Option<LayerId>;

/// Per-tick handler for time-driven exits.
pub type LayerUpdateFn = fn(&mut LayerContext) -> Option<LayerId>;

// ---------------------------------------------------------------------------
// Layer descriptor
// ---------------------------------------------------------------------------

pub struct LayerDescriptor {
    pub id: LayerId,
    pub name: &'static str,
    pub on_enter: Option<LayerActionFn>,
    pub on_exit: Option<LayerActionFn>,
    pub on_gesture: LayerGestureFn,
    pub on_update: Option<LayerUpdateFn>,
}

// ---------------------------------------------------------------------------
// Layer machine
// ---------------------------------------------------------------------------

pub struct LayerMachine {
    table: [LayerDescriptor; LayerId::COUNT],
    current: usize,
}

impl LayerMachine {
    pub fn new(table: [LayerDescriptor; LayerId::COUNT], initial: LayerId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first dispatch.
    pub fn start(&mut self, ctx: &mut LayerContext) {
        info!("LAYER starting in: {}", self.table[self.current].name);
        ctx.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Dispatch one gesture to the current layer.
    pub fn handle(&mut self, event: &GestureEvent, ctx: &mut LayerContext) {
        let next = (self.table[self.current].on_gesture)(ctx, event);
        if let Some(next_id) = next {
            if next_id as usize != self.current {
                if matches!(event.kind, GestureKind::Tap | GestureKind::LongPress) {
                    ctx.block_until_lift = true;
                }
                self.transition(next_id, ctx);
            }
        }
    }

    /// Advance time-driven layers by one tick.
    pub fn tick(&mut self, ctx: &mut LayerContext) {
        let Some(update) = self.table[self.current].on_update else {
            return;
        };
        if let Some(next_id) = update(ctx) {
            self.force_transition(next_id, ctx);
        }
    }

    /// Jump to `next` regardless of input.  No-op if already there.
    pub fn force_transition(&mut self, next: LayerId, ctx: &mut LayerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_layer(&self) -> LayerId {
        LayerId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Commands (silent no-ops outside their layer)
    // -----------------------------------------------------------------------

    pub fn open(&mut self, ctx: &mut LayerContext) {
        if self.current_layer() == LayerId::Closed {
            ctx.menu_item = MenuItem::Feed;
            self.transition(LayerId::Open, ctx);
        }
    }

    pub fn close(&mut self, ctx: &mut LayerContext) {
        self.force_transition(LayerId::Closed, ctx);
    }

    pub fn select_next(&mut self, ctx: &mut LayerContext) {
        if self.current_layer() == LayerId::Open {
            ctx.menu_item = ctx.menu_item.next();
        }
    }

    pub fn select_prev(&mut self, ctx: &mut LayerContext) {
        if self.current_layer() == LayerId::Open {
            ctx.menu_item = ctx.menu_item.prev();
        }
    }

    pub fn activate_selected(&mut self, ctx: &mut LayerContext) {
        if self.current_layer() != LayerId::Open {
            return;
        }
        if let Some(next) = layers::activate_menu_item(ctx) {
            self.transition(next, ctx);
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: LayerId, ctx: &mut LayerContext) {
        let next_idx = next_id as usize;

        info!(
            "LAYER transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        ctx.entered_at_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
