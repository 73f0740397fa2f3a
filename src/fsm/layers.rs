//! Concrete layer handlers and table builder.
//!
//! ```text
//!                  tap off eyes
//!   CLOSED ─────────────────────────▶ OPEN (menu) ──[long]──▶ CLOSED
//!     ▲  ▲                             │ tap on selected item
//!     │  │  sleep                      ├── Feed ────▶ FEEDING ──[timer]──▶ OPEN
//!     │  └─────────────────────────────┤── Play ────▶ GAME_ACTIVE ◀─┐
//!     │                                ├── Stats ───▶ STATS         │ tap
//!     │          clean (cleanliness)   │               ├─ tap ─▶ OPTIONS ──▶ STATS
//!     └────────────────────────────────┼───────────────┤
//!                                      │               └─ tap mood ─▶ GAMES ─┘
//!                                      ├── Connect / Message / Battery / Level
//!                                      │          [long] ──▶ OPEN
//!                                      └── Clean (no-op)
//! ```
//!
//! Handlers only edit the [`LayerContext`] blackboard and queue
//! [`LayerEffect`]s; the service applies those to the behavior engine.

use log::{debug, info};

use super::context::{GameStatus, LayerContext, LayerEffect, MenuItem};
use super::{LayerDescriptor, LayerId};
use crate::care::Stat;
use crate::drivers::gesture::{GestureEvent, GestureKind, Point};
use crate::motion::{Rect, eye_at};
use crate::timing::reached;

/// Carousel slot of the highlighted menu item.
pub const SELECTED_ITEM_BOX: Rect = Rect::new(20, 90, 200, 60);
/// Title of the stats panel.
pub const STATS_TITLE_BOX: Rect = Rect::new(60, 100, 120, 40);
/// Wi-Fi switch on the connect panel.
pub const CONNECT_SWITCH_BOX: Rect = Rect::new(30, 107, 180, 46);

/// Entries on the options panel.
const OPTION_COUNT: u8 = 1;

fn point(ev: &GestureEvent) -> Point {
    Point { x: ev.x, y: ev.y }
}

fn is_prev_swipe(kind: GestureKind) -> bool {
    matches!(kind, GestureKind::SwipeUp | GestureKind::SwipeLeft)
}

fn is_next_swipe(kind: GestureKind) -> bool {
    matches!(kind, GestureKind::SwipeDown | GestureKind::SwipeRight)
}

fn back_to_menu(ctx: &mut LayerContext, item: MenuItem) -> Option<LayerId> {
    ctx.menu_item = item;
    Some(LayerId::Open)
}

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static layer table.  Called once at startup.
pub fn build_layer_table() -> [LayerDescriptor; LayerId::COUNT] {
    [
        LayerDescriptor {
            id: LayerId::Closed,
            name: "Closed",
            on_enter: None,
            on_exit: Some(closed_exit),
            on_gesture: closed_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Open,
            name: "Open",
            on_enter: Some(open_enter),
            on_exit: None,
            on_gesture: open_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Feeding,
            name: "Feeding",
            on_enter: Some(feeding_enter),
            on_exit: Some(feeding_exit),
            on_gesture: ignore_gesture,
            on_update: Some(feeding_update),
        },
        LayerDescriptor {
            id: LayerId::Stats,
            name: "Stats",
            on_enter: Some(stats_enter),
            on_exit: None,
            on_gesture: stats_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Options,
            name: "Options",
            on_enter: Some(options_enter),
            on_exit: None,
            on_gesture: options_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Games,
            name: "Games",
            on_enter: None,
            on_exit: None,
            on_gesture: games_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::GameActive,
            name: "GameActive",
            on_enter: Some(game_active_enter),
            on_exit: Some(game_active_exit),
            on_gesture: game_active_gesture,
            on_update: Some(game_active_update),
        },
        LayerDescriptor {
            id: LayerId::Connect,
            name: "Connect",
            on_enter: None,
            on_exit: None,
            on_gesture: connect_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Message,
            name: "Message",
            on_enter: None,
            on_exit: None,
            on_gesture: message_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Battery,
            name: "Battery",
            on_enter: None,
            on_exit: None,
            on_gesture: battery_gesture,
            on_update: None,
        },
        LayerDescriptor {
            id: LayerId::Level,
            name: "Level",
            on_enter: None,
            on_exit: None,
            on_gesture: level_gesture,
            on_update: None,
        },
    ]
}

fn ignore_gesture(_ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    debug!("LAYER gesture {:?} ignored", ev.kind);
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSED: the eyes own the screen
// ═══════════════════════════════════════════════════════════════════════════

fn closed_exit(ctx: &mut LayerContext) {
    ctx.push_effect(LayerEffect::SuspendIdle);
}

fn closed_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    if ev.kind != GestureKind::Tap {
        return None;
    }
    if eye_at(point(ev)).is_some() {
        ctx.push_effect(LayerEffect::TriggerEmotion);
        return None;
    }
    ctx.menu_item = MenuItem::Feed;
    Some(LayerId::Open)
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPEN: main menu carousel
// ═══════════════════════════════════════════════════════════════════════════

fn open_enter(ctx: &mut LayerContext) {
    info!("MENU: {:?} selected", ctx.menu_item);
}

fn open_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap if SELECTED_ITEM_BOX.contains(point(ev)) => activate_menu_item(ctx),
        GestureKind::Tap => None,
        GestureKind::LongPress => Some(LayerId::Closed),
        k if is_prev_swipe(k) => {
            ctx.menu_item = ctx.menu_item.prev();
            None
        }
        k if is_next_swipe(k) => {
            ctx.menu_item = ctx.menu_item.next();
            None
        }
        _ => None,
    }
}

/// Layer reached by activating the selected menu item.
pub(super) fn activate_menu_item(ctx: &mut LayerContext) -> Option<LayerId> {
    info!("MENU: activate {:?}", ctx.menu_item);
    match ctx.menu_item {
        MenuItem::Feed => Some(LayerId::Feeding),
        MenuItem::Play => {
            ctx.games_from_menu = true;
            Some(LayerId::GameActive)
        }
        MenuItem::Clean => None,
        MenuItem::Sleep => {
            ctx.push_effect(LayerEffect::StartSleep);
            Some(LayerId::Closed)
        }
        MenuItem::Connect => Some(LayerId::Connect),
        MenuItem::Message => Some(LayerId::Message),
        MenuItem::Battery => Some(LayerId::Battery),
        MenuItem::Stats => Some(LayerId::Stats),
        MenuItem::Level => Some(LayerId::Level),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FEEDING: timed happy bounce, touches ignored
// ═══════════════════════════════════════════════════════════════════════════

fn feeding_enter(ctx: &mut LayerContext) {
    ctx.start_feed();
    ctx.push_effect(LayerEffect::FeedStarted);
}

fn feeding_update(ctx: &mut LayerContext) -> Option<LayerId> {
    let deadline = ctx.feed_deadline()?;
    if !reached(ctx.now_ms, deadline) {
        return None;
    }
    ctx.push_effect(LayerEffect::FeedFinished);
    Some(LayerId::Open)
}

fn feeding_exit(ctx: &mut LayerContext) {
    ctx.clear_feed();
    ctx.push_effect(LayerEffect::SuspendIdle);
}

// ═══════════════════════════════════════════════════════════════════════════
//  STATS / OPTIONS
// ═══════════════════════════════════════════════════════════════════════════

fn stats_enter(ctx: &mut LayerContext) {
    info!("STATS: showing {}", ctx.stat);
}

fn stats_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        k if is_prev_swipe(k) => {
            ctx.stat = Stat::from_index(ctx.stat.index() + Stat::COUNT - 1);
            None
        }
        k if is_next_swipe(k) => {
            ctx.stat = Stat::from_index(ctx.stat.index() + 1);
            None
        }
        GestureKind::Tap => {
            if ctx.stat == Stat::Cleanliness && STATS_TITLE_BOX.contains(point(ev)) {
                ctx.push_effect(LayerEffect::StartClean { return_to_stats: true });
                return Some(LayerId::Closed);
            }
            if ctx.stat == Stat::Mood {
                ctx.games_from_menu = false;
                return Some(LayerId::Games);
            }
            Some(LayerId::Options)
        }
        GestureKind::LongPress => back_to_menu(ctx, MenuItem::Stats),
        _ => None,
    }
}

fn options_enter(ctx: &mut LayerContext) {
    ctx.option_index = 0;
}

fn options_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap => {
            ctx.push_effect(LayerEffect::BoostStat(ctx.stat));
            Some(LayerId::Stats)
        }
        GestureKind::LongPress => Some(LayerId::Stats),
        k if is_prev_swipe(k) => {
            ctx.option_index = ctx.option_index.saturating_sub(1);
            None
        }
        k if is_next_swipe(k) => {
            ctx.option_index = (ctx.option_index + 1).min(OPTION_COUNT - 1);
            None
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  GAMES / GAME_ACTIVE
// ═══════════════════════════════════════════════════════════════════════════

fn games_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap => Some(LayerId::GameActive),
        GestureKind::LongPress if ctx.games_from_menu => back_to_menu(ctx, MenuItem::Play),
        GestureKind::LongPress => Some(LayerId::Stats),
        _ => None,
    }
}

fn game_active_enter(ctx: &mut LayerContext) {
    ctx.game_running = true;
    ctx.game_status = GameStatus::Playing;
    ctx.push_effect(LayerEffect::StartGame);
}

fn game_active_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap => {
            ctx.push_effect(LayerEffect::GameTap { x: ev.x, y: ev.y });
            ctx.block_until_lift = true;
            None
        }
        GestureKind::LongPress if eye_at(point(ev)).is_none() => Some(LayerId::Games),
        _ => None,
    }
}

/// Any way out of the board ends the round.
fn game_active_exit(ctx: &mut LayerContext) {
    ctx.push_effect(LayerEffect::StopGame);
}

fn game_active_update(ctx: &mut LayerContext) -> Option<LayerId> {
    (!ctx.game_running).then_some(LayerId::Games)
}

// ═══════════════════════════════════════════════════════════════════════════
//  Info panels
// ═══════════════════════════════════════════════════════════════════════════

fn connect_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap if CONNECT_SWITCH_BOX.contains(point(ev)) => {
            ctx.connect_requested = !ctx.connect_requested;
            ctx.block_until_lift = true;
            info!("CONNECT: requested={}", ctx.connect_requested);
            None
        }
        GestureKind::LongPress => back_to_menu(ctx, MenuItem::Connect),
        _ => None,
    }
}

fn message_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::LongPress => back_to_menu(ctx, MenuItem::Message),
        _ => None,
    }
}

fn battery_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap | GestureKind::LongPress => back_to_menu(ctx, MenuItem::Battery),
        _ => None,
    }
}

fn level_gesture(ctx: &mut LayerContext, ev: &GestureEvent) -> Option<LayerId> {
    match ev.kind {
        GestureKind::Tap | GestureKind::LongPress => back_to_menu(ctx, MenuItem::Level),
        _ => None,
    }
}
