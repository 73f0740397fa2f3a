//! Behavior layer: what the eyes do on their own.
//!
//! - [`idle`]: look-around and short idle animations
//! - [`emotion`]: timed emotion selection
//! - [`sequences`]: feed, clean, sleep and hatch

pub mod emotion;
pub mod idle;
pub mod sequences;
