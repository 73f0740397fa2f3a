//! Port traits: the hexagonal boundary between the behavior engine and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CompanionService (domain)
//! ```
//!
//! Driven adapters (touch controller, audio, event sinks, storage)
//! implement these traits.  The [`CompanionService`](super::service::CompanionService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! ## Notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - All port errors are typed; callers handle every variant explicitly.

use crate::care::{CareReading, Stat};
use crate::config::EngineConfig;
use crate::drivers::gesture::TouchSample;
use crate::level::Feature;
use crate::pet::PetSnapshot;

// ───────────────────────────────────────────────────────────────
// Touch sample port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw contact source.  Bus failures are reported as
/// [`TouchSample::ReadFailed`], never as a panic or an error value; the
/// classifier decides when a failing bus means "finger lifted".
pub trait TouchSampleSource {
    fn poll(&mut self) -> TouchSample;

    /// Atomic read-and-clear of the interrupt edge flag.
    fn consume_interrupt_edge(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Care statistics port (domain ↔ pet record)
// ───────────────────────────────────────────────────────────────

/// Four 0–100 statistics with clamping mutators.
pub trait CareStats {
    fn stat(&self, stat: Stat) -> u8;

    /// Add `delta`, clamping the result to 0..=100.
    fn add(&mut self, stat: Stat, delta: i16);

    fn hunger(&self) -> u8 {
        self.stat(Stat::Hunger)
    }

    fn mood(&self) -> u8 {
        self.stat(Stat::Mood)
    }

    fn energy(&self) -> u8 {
        self.stat(Stat::Energy)
    }

    fn cleanliness(&self) -> u8 {
        self.stat(Stat::Cleanliness)
    }

    fn add_hunger(&mut self, delta: i16) {
        self.add(Stat::Hunger, delta);
    }

    fn add_mood(&mut self, delta: i16) {
        self.add(Stat::Mood, delta);
    }

    fn add_energy(&mut self, delta: i16) {
        self.add(Stat::Energy, delta);
    }

    fn add_cleanliness(&mut self, delta: i16) {
        self.add(Stat::Cleanliness, delta);
    }

    fn reading(&self) -> CareReading {
        CareReading {
            hunger: self.hunger(),
            mood: self.mood(),
            energy: self.energy(),
            cleanliness: self.cleanliness(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Feature gate port
// ───────────────────────────────────────────────────────────────

pub trait FeatureGate {
    fn is_unlocked(&self, feature: Feature) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Pet record port (everything the service needs from the pet)
// ───────────────────────────────────────────────────────────────

/// Care statistics and feature gate, plus the hatch flag and decay
/// control.  Decay defaults to a no-op for stat sources that do not age.
pub trait PetRecord: CareStats + FeatureGate {
    fn is_hatched(&self) -> bool;

    fn mark_hatched(&mut self);

    /// Advance stat decay to `now_ms`.
    fn decay(&mut self, _now_ms: u32) {}

    fn set_decay_suspended(&mut self, _suspended: bool, _now_ms: u32) {}
}

// ───────────────────────────────────────────────────────────────
// Audio cue port (domain → speaker)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget sound cues.  `strength` is 0.0–1.0.  No completion
/// callback is offered and none may be assumed.
pub trait AudioCue {
    fn blink(&mut self);
    fn swoosh(&mut self, strength: f32);
    fn jitter_noise(&mut self, strength: f32);
    fn happy_pip(&mut self, strength: f32);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Wraps at `u32::MAX`; compare with
/// [`crate::timing`] helpers only.
pub trait MonotonicClock {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists engine tuning.
///
/// Implementations MUST validate values before persisting and reject
/// invalid ranges with [`ConfigError::ValidationFailed`] rather than
/// clamping them.
pub trait ConfigPort {
    /// Returns [`EngineConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<EngineConfig, ConfigError>;

    fn save(&self, config: &EngineConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Pet record port (domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

pub trait PetStorePort {
    /// `Ok(None)` on first boot.
    fn load_pet(&self) -> Result<Option<PetSnapshot>, StorageError>;

    fn save_pet(&mut self, snapshot: &PetSnapshot) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`PetStorePort`] operations.
#[derive(Debug, PartialEq, Eq)]
pub enum StorageError {
    /// Stored record failed deserialization.
    Corrupted,
    /// Storage partition is full.
    Full,
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "pet record corrupted"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
