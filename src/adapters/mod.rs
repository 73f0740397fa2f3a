//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                |
//! |------------|---------------------|----------------------------|
//! | `audio`    | AudioCue            | Serial log (speaker stub)  |
//! | `hardware` | TouchSampleSource   | CST816 touch driver        |
//! |            | AudioCue            | any audio adapter          |
//! | `log_sink` | EventSink           | Serial log output          |
//! | `nvs`      | ConfigPort          | NVS / in-memory store      |
//! |            | PetStorePort        |                            |
//! | `time`     | MonotonicClock      | ESP32 system timer         |

pub mod audio;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
