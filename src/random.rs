//! Randomness for behavior selection.
//!
//! Every random choice in the engine (idle behaviors, emotions, look
//! destinations, jitter, game colours) draws from a [`RandomSource`] passed
//! in by the caller, so tests can script the sequence.  Production uses
//! [`Mulberry32`], seeded from the hardware RNG on ESP32.
//!
//! [`weighted_pick`] is the one suppressible weighted draw shared by every
//! table in the crate: filter, sum, draw, walk.

/// Source of uniformly distributed 32-bit values.
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `0..bound`.  Returns 0 for an empty range.
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }

    /// Uniform value in `lo..=hi`.  Returns `lo` if the range is inverted.
    fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        lo + self.below(hi - lo + 1)
    }

    /// Uniform value in `lo..=hi`.  Returns `lo` if the range is inverted.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as u32 + 1;
        lo + self.below(span) as i32
    }

    /// Uniform value in `[0.0, 1.0]`.
    fn unit_f32(&mut self) -> f32 {
        self.below(10_001) as f32 / 10_000.0
    }
}

// ---------------------------------------------------------------------------
// Mulberry32
// ---------------------------------------------------------------------------

/// Small, fast 32-bit generator.  Not cryptographic.
#[derive(Debug, Clone, Copy)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from the ESP32 hardware RNG.
    #[cfg(target_os = "espidf")]
    pub fn from_hardware() -> Self {
        // SAFETY: esp_random has no preconditions and is callable from any task.
        Self::new(unsafe { esp_idf_svc::sys::esp_random() })
    }
}

impl RandomSource for Mulberry32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut t = self.state.wrapping_add(0x6D2B_79F5);
        self.state = t;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

// ---------------------------------------------------------------------------
// Weighted selection
// ---------------------------------------------------------------------------

/// Draw one entry from `table` in proportion to its weight.
///
/// Entries with zero weight or for which `excluded` returns `true` never
/// win.  Returns `None` when nothing is eligible; callers supply their own
/// safe default.
pub fn weighted_pick<T: Copy>(
    table: &[(T, u16)],
    excluded: impl Fn(T) -> bool,
    rng: &mut impl RandomSource,
) -> Option<T> {
    let eligible = |&(item, weight): &(T, u16)| weight > 0 && !excluded(item);

    let total: u32 = table
        .iter()
        .filter(|e| eligible(e))
        .map(|&(_, w)| u32::from(w))
        .sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.below(total);
    for entry in table.iter().filter(|e| eligible(e)) {
        let w = u32::from(entry.1);
        if roll < w {
            return Some(entry.0);
        }
        roll -= w;
    }
    None
}
