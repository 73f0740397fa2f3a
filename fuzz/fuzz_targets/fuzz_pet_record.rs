//! Fuzz target: stored record decoding
//!
//! Feeds arbitrary bytes to the postcard decoders for the pet record and
//! the engine config, as a corrupted NVS blob would.  A pet record that
//! decodes must restore into a pet whose statistics stay in range.
//!
//! cargo fuzz run fuzz_pet_record

#![no_main]

use eyepal::app::ports::CareStats;
use eyepal::care::Stat;
use eyepal::config::EngineConfig;
use eyepal::pet::{PetSnapshot, PetState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = EngineConfig::default();
    if let Ok(snap) = postcard::from_bytes::<PetSnapshot>(data) {
        let pet = PetState::from_snapshot(&config, &snap);
        for stat in Stat::ALL {
            assert!(pet.stat(stat) <= 100);
        }
    }
    let _ = postcard::from_bytes::<EngineConfig>(data);
});
