//! Interrupt-to-main-loop signalling.
//!
//! The touch controller's INT line is routed through the TCA6408 expander
//! to a single GPIO.  Its falling edge raises two flags: one saying "a new
//! touch frame is ready" and one saying "inspect the expander".  Both are
//! read-and-cleared by the main loop in one atomic swap, so an edge that
//! lands between the read and the clear can never be lost.
//!
//! ```text
//!   ISR ──raise()──▶ [AtomicBool] ──take()──▶ main loop
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

/// A lock-free one-bit mailbox between ISR context and the main loop.
pub struct InterruptFlag(AtomicBool);

impl InterruptFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Record an edge.  Safe to call from interrupt context.
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear in one step.  Returns `true` if an edge was pending.
    #[must_use]
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A new touch report is available from the CST816.
pub static TOUCH_IRQ: InterruptFlag = InterruptFlag::new();

/// The TCA6408 input register should be inspected.
pub static EXPANDER_IRQ: InterruptFlag = InterruptFlag::new();

/// ISR handler: register this on the expander INT falling edge.
pub fn touch_isr_handler() {
    TOUCH_IRQ.raise();
    EXPANDER_IRQ.raise();
}
