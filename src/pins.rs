//! GPIO / peripheral pin assignments for the EyePal board
//! (ESP32-S3 with a 240×240 round touch LCD).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Shared I²C bus (CST816 touch controller + TCA6408 IO expander)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// Fast-mode I²C.
pub const I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// Touch
// ---------------------------------------------------------------------------

/// CST816 reset line (active LOW).
pub const TOUCH_RST_GPIO: i32 = 0;
/// TCA6408 INT output; falls when the touch line changes.
pub const TCA_INT_GPIO: i32 = 45;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// LCD backlight enable (active HIGH).
pub const LCD_BL_GPIO: i32 = 42;

// ---------------------------------------------------------------------------
// I2S speaker (MAX98357)
// ---------------------------------------------------------------------------

pub const I2S_BCLK_GPIO: i32 = 5;
pub const I2S_LRCK_GPIO: i32 = 4;
pub const I2S_DOUT_GPIO: i32 = 7;
