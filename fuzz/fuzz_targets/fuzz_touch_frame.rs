//! Fuzz target: `map_raw_point`
//!
//! Decodes arbitrary CST816 coordinate registers.  Accepted points must
//! lie on the 240×240 panel; rejected ones must carry the raw values.
//!
//! cargo fuzz run fuzz_touch_frame

#![no_main]

use eyepal::drivers::cst816::map_raw_point;
use eyepal::error::TouchError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; 4]| {
    let [xh, xl, yh, yl] = data;
    match map_raw_point(xh, xl, yh, yl) {
        Ok(p) => assert!(p.x < 240 && p.y < 240, "mapped off panel: {:?}", p),
        Err(TouchError::RawOutOfRange { x, y }) => assert!(x > 500 || y > 500),
        Err(TouchError::OffScreen { .. }) => {}
        Err(e) => panic!("unexpected error {:?}", e),
    }
});
