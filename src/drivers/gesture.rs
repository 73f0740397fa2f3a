//! Poll-driven touch gesture classifier.
//!
//! ## Input
//!
//! One [`TouchSample`] per poll: a contact point, an explicit release, or
//! a failed bus read.  Out-of-range coordinates never get this far; the
//! sample source rejects them and reports `ReadFailed` instead.
//!
//! ## Gesture detection
//!
//! | Gesture     | Condition                                           | Reported at |
//! |-------------|-----------------------------------------------------|-------------|
//! | Long press  | Held >= 400ms with drift <= 35px (fires while held) | down point  |
//! | Swipe       | Released with drift >= 40px, dominant axis wins     | release     |
//! | Tap         | Released after >= 20ms, anything else               | down point  |
//!
//! Drift is the Manhattan distance between the down and current points.
//! A contact that stops producing samples for 120ms is treated as lifted.

use crate::config::EngineConfig;
use crate::timing::elapsed;

/// A point in screen coordinates (0..240 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Point) -> u32 {
        let dx = (i32::from(self.x) - i32::from(other.x)).unsigned_abs();
        let dy = (i32::from(self.y) - i32::from(other.y)).unsigned_abs();
        dx + dy
    }
}

/// One poll result from the touch sample source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchSample {
    /// A finger is on the panel at this point.
    Contact(Point),
    /// The controller reports no finger.
    Released,
    /// The read failed or produced an impossible value; no new data.
    ReadFailed,
}

/// Discrete gesture kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    LongPress,
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
}

impl GestureKind {
    pub fn is_swipe(self) -> bool {
        matches!(
            self,
            Self::SwipeUp | Self::SwipeDown | Self::SwipeLeft | Self::SwipeRight
        )
    }
}

/// A resolved gesture.  Produced at most once per contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub x: u16,
    pub y: u16,
    pub duration_ms: u32,
}

impl GestureEvent {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Live contact owned by the classifier.
#[derive(Debug, Clone, Copy)]
struct TouchContact {
    down_at: u32,
    down_pos: Point,
    current_pos: Point,
    last_sample_at: u32,
    long_press_fired: bool,
}

#[derive(Debug, Clone, Copy)]
struct Thresholds {
    poll_interval_ms: u32,
    long_press_ms: u32,
    tap_max_drift_px: u32,
    swipe_min_dist_px: u32,
    release_timeout_ms: u32,
    debounce_ms: u32,
}

pub struct GestureClassifier {
    thresholds: Thresholds,
    contact: Option<TouchContact>,
    last_poll_at: Option<u32>,
    touch_down_count: u32,
    gesture_count: u32,
}

impl GestureClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            thresholds: Thresholds {
                poll_interval_ms: config.touch_poll_interval_ms,
                long_press_ms: config.long_press_ms,
                tap_max_drift_px: u32::from(config.tap_max_drift_px),
                swipe_min_dist_px: u32::from(config.swipe_min_dist_px),
                release_timeout_ms: config.release_timeout_ms,
                debounce_ms: config.debounce_ms,
            },
            contact: None,
            last_poll_at: None,
            touch_down_count: 0,
            gesture_count: 0,
        }
    }

    /// Rate limiter for bus traffic.  Returns `true` (and claims the slot)
    /// when at least the poll floor has passed since the last claimed poll.
    pub fn should_poll(&mut self, now_ms: u32) -> bool {
        match self.last_poll_at {
            Some(last) if elapsed(now_ms, last) < self.thresholds.poll_interval_ms => false,
            _ => {
                self.last_poll_at = Some(now_ms);
                true
            }
        }
    }

    /// Feed one sample.  Returns a classified gesture, if this sample
    /// resolved one.
    pub fn feed(&mut self, sample: TouchSample, now_ms: u32) -> Option<GestureEvent> {
        let Some(mut contact) = self.contact else {
            if let TouchSample::Contact(p) = sample {
                self.touch_down_count = self.touch_down_count.wrapping_add(1);
                self.contact = Some(TouchContact {
                    down_at: now_ms,
                    down_pos: p,
                    current_pos: p,
                    last_sample_at: now_ms,
                    long_press_fired: false,
                });
            }
            return None;
        };

        match sample {
            TouchSample::Contact(p) => {
                contact.current_pos = p;
                contact.last_sample_at = now_ms;
                let event = self.check_long_press(&mut contact, now_ms);
                self.contact = Some(contact);
                event
            }
            TouchSample::Released => self.release(contact, now_ms),
            TouchSample::ReadFailed => {
                if let Some(event) = self.check_long_press(&mut contact, now_ms) {
                    self.contact = Some(contact);
                    return Some(event);
                }
                if elapsed(now_ms, contact.last_sample_at) >= self.thresholds.release_timeout_ms {
                    return self.release(contact, now_ms);
                }
                self.contact = Some(contact);
                None
            }
        }
    }

    /// `true` while a contact is being tracked.
    pub fn is_pressed(&self) -> bool {
        self.contact.is_some()
    }

    /// Number of contacts that have started since boot.
    pub fn touch_down_count(&self) -> u32 {
        self.touch_down_count
    }

    /// Number of gestures emitted since boot.
    pub fn gesture_count(&self) -> u32 {
        self.gesture_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_long_press(&mut self, c: &mut TouchContact, now_ms: u32) -> Option<GestureEvent> {
        if c.long_press_fired {
            return None;
        }
        let held = elapsed(now_ms, c.down_at);
        if held < self.thresholds.long_press_ms
            || c.down_pos.manhattan(c.current_pos) > self.thresholds.tap_max_drift_px
        {
            return None;
        }
        c.long_press_fired = true;
        Some(self.emit(GestureKind::LongPress, c.down_pos, held))
    }

    fn release(&mut self, c: TouchContact, now_ms: u32) -> Option<GestureEvent> {
        self.contact = None;
        if c.long_press_fired {
            return None;
        }

        let duration = elapsed(now_ms, c.down_at);
        if duration < self.thresholds.debounce_ms {
            return None;
        }

        if c.down_pos.manhattan(c.current_pos) >= self.thresholds.swipe_min_dist_px {
            let dx = i32::from(c.current_pos.x) - i32::from(c.down_pos.x);
            let dy = i32::from(c.current_pos.y) - i32::from(c.down_pos.y);
            let kind = if dx.abs() > dy.abs() {
                if dx > 0 {
                    GestureKind::SwipeRight
                } else {
                    GestureKind::SwipeLeft
                }
            } else if dy > 0 {
                GestureKind::SwipeDown
            } else {
                GestureKind::SwipeUp
            };
            return Some(self.emit(kind, c.current_pos, duration));
        }

        Some(self.emit(GestureKind::Tap, c.down_pos, duration))
    }

    fn emit(&mut self, kind: GestureKind, at: Point, duration_ms: u32) -> GestureEvent {
        self.gesture_count = self.gesture_count.wrapping_add(1);
        GestureEvent {
            kind,
            x: at.x,
            y: at.y,
            duration_ms,
        }
    }
}
