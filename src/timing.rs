//! Wrapping millisecond arithmetic.
//!
//! Timestamps are `u32` milliseconds since boot and wrap after ~49 days.
//! All comparisons go through these helpers so that a deadline scheduled
//! just before the wrap still fires just after it.

/// Milliseconds elapsed from `since` to `now`.
#[inline]
pub fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// `true` once `now` is at or past `deadline`.
///
/// Valid as long as the two are less than ~24.8 days apart.
#[inline]
pub fn reached(now: u32, deadline: u32) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}
