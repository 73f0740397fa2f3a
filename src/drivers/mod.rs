//! Touch input drivers and one-shot peripheral setup.

pub mod cst816;
pub mod gesture;
pub mod hw_init;
