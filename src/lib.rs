//! EyePal firmware library.
//!
//! Exposes the behavior engine for integration testing and host-side
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod behavior;
pub mod care;
pub mod config;
pub mod fsm;
pub mod game;
pub mod level;
pub mod mood;
pub mod motion;
pub mod pet;
pub mod random;
pub mod screensaver;
pub mod timing;

pub mod error;
pub mod irq;
pub mod pins;

// Hardware-facing modules compile on the host too; their ESP-IDF
// implementations are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
