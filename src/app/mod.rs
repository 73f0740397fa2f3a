//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the orchestration rules for the EyePal companion:
//! gesture dispatch, mood gating, idle and emotion scheduling, timed
//! sequences and the per-frame motion update.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
