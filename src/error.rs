//! Unified error types for the EyePal firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! bootstrap path's error handling uniform.  All variants are `Copy` so they
//! can be passed around the tick loop without allocation.
//!
//! Nothing in the per-tick core returns these: touch failures are collapsed
//! into "no new data" at the sample boundary and layer misuse is a no-op.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The touch controller or IO expander misbehaved.
    Touch(TouchError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Touch(e) => write!(f, "touch: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Touch errors
// ---------------------------------------------------------------------------

/// Failures on the touch sample path.
///
/// `Bus` is transient; the remaining variants are impossible readings that
/// are rejected before they can reach the gesture classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchError {
    /// An I2C transaction with the controller or expander failed.
    Bus,
    /// The controller reported a finger count it cannot produce.
    InvalidFingerCount(u8),
    /// Raw 12-bit coordinates exceeded the panel's plausible range.
    RawOutOfRange { x: u16, y: u16 },
    /// The rotated point fell outside the visible screen.
    OffScreen { x: i32, y: i32 },
}

impl fmt::Display for TouchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus transaction failed"),
            Self::InvalidFingerCount(n) => write!(f, "invalid finger count {n}"),
            Self::RawOutOfRange { x, y } => write!(f, "raw coordinate out of range ({x},{y})"),
            Self::OffScreen { x, y } => write!(f, "point off screen ({x},{y})"),
        }
    }
}

impl From<TouchError> for Error {
    fn from(e: TouchError) -> Self {
        Self::Touch(e)
    }
}

/// Convenience alias used throughout the firmware.
pub type Result<T> = core::result::Result<T, Error>;
