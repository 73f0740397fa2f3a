//! Fuzz target: `GestureClassifier::feed`
//!
//! Every three input bytes become one poll: a tag byte choosing contact,
//! release or read failure, then a coordinate byte pair.  The gap between
//! polls comes from the tag's upper bits.  Asserts that no contact yields
//! more than one gesture and that event coordinates stay on screen.
//!
//! cargo fuzz run fuzz_gesture_classifier

#![no_main]

use eyepal::config::EngineConfig;
use eyepal::drivers::gesture::{GestureClassifier, Point, TouchSample};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut classifier = GestureClassifier::new(&EngineConfig::default());
    let mut now = 0u32;
    let mut events_this_contact = 0;

    for chunk in data.chunks_exact(3) {
        let (tag, a, b) = (chunk[0], chunk[1], chunk[2]);
        now = now.wrapping_add(u32::from(tag >> 2) * 4);
        let sample = match tag & 0x03 {
            0 | 1 => TouchSample::Contact(Point::new(u16::from(a) % 240, u16::from(b) % 240)),
            2 => TouchSample::Released,
            _ => TouchSample::ReadFailed,
        };

        let was_pressed = classifier.is_pressed();
        if let Some(ev) = classifier.feed(sample, now) {
            events_this_contact += 1;
            assert!(ev.x < 240 && ev.y < 240, "gesture off screen: {:?}", ev);
        }
        assert!(events_this_contact <= 1, "second gesture in one contact");
        if was_pressed && !classifier.is_pressed() {
            events_this_contact = 0;
        }
    }
    assert!(classifier.gesture_count() <= classifier.touch_down_count());
});
