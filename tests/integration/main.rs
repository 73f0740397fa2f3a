//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the full
//! `CompanionService` against mock ports.  All tests run on the host
//! (x86_64) with no real hardware required.

mod game_tests;
mod layer_tests;
mod mock_hw;
mod mood_tests;
mod persistence_tests;
mod sequence_tests;
