//! CST816 capacitive touch controller behind a TCA6408 IO expander.
//!
//! ## Hardware
//!
//! Both chips share one I2C bus.  The CST816's INT line feeds expander
//! input P0; the expander's own INT drives a GPIO whose falling edge runs
//! [`touch_isr_handler`](crate::irq::touch_isr_handler).
//!
//! | Device  | Addr | Registers used                                   |
//! |---------|------|--------------------------------------------------|
//! | CST816  | 0x15 | 0x01..=0x06 touch frame, 0xA7 chip id, 0xFA, 0xEB |
//! | TCA6408 | 0x20 | 0x00 input port, 0x03 configuration              |
//!
//! The panel is mounted rotated, so raw controller coordinates are
//! remapped before leaving this module.  Impossible frames are rejected
//! here and surface to the classifier as [`TouchSample::ReadFailed`].

use embedded_hal::i2c::I2c;
use log::{debug, info, warn};

use crate::app::ports::TouchSampleSource;
use crate::drivers::gesture::{Point, TouchSample};
use crate::error::TouchError;
use crate::irq::InterruptFlag;

pub const CST816_ADDR: u8 = 0x15;
pub const TCA6408_ADDR: u8 = 0x20;

const REG_GESTURE_ID: u8 = 0x01;
const REG_CHIP_ID: u8 = 0xA7;
const REG_IRQ_CTL: u8 = 0xFA;
const REG_LONG_PRESS_TIME: u8 = 0xEB;

const TCA_REG_INPUT: u8 = 0x00;
const TCA_REG_CONFIG: u8 = 0x03;

/// Largest raw coordinate the controller produces for this panel.
const RAW_MAX: u16 = 500;
/// Visible screen edge length in pixels.
pub const SCREEN_SIZE: i32 = 240;

/// Controller variant reported by the chip-id register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipVariant {
    Cst816S,
    Cst816T,
    Cst816D,
    Unknown(u8),
}

impl ChipVariant {
    fn from_id(id: u8) -> Self {
        match id {
            0xB4 => Self::Cst816S,
            0xB5 => Self::Cst816T,
            0xB6 => Self::Cst816D,
            other => Self::Unknown(other),
        }
    }
}

/// Rotate a raw controller frame into screen space.
///
/// `xh`/`yh` carry event flags in their upper nibble; only the low nibble
/// is coordinate data.
pub fn map_raw_point(xh: u8, xl: u8, yh: u8, yl: u8) -> Result<Point, TouchError> {
    let raw_x = (u16::from(xh & 0x0F) << 8) | u16::from(xl);
    let raw_y = (u16::from(yh & 0x0F) << 8) | u16::from(yl);
    if raw_x > RAW_MAX || raw_y > RAW_MAX {
        return Err(TouchError::RawOutOfRange { x: raw_x, y: raw_y });
    }

    let mapped_x = (0xFF - i32::from(raw_x)) & 0x0FFF;
    let screen_x = i32::from(raw_y);
    let screen_y = (SCREEN_SIZE - 1) - mapped_x;

    if !(0..SCREEN_SIZE).contains(&screen_x) || !(0..SCREEN_SIZE).contains(&screen_y) {
        return Err(TouchError::OffScreen {
            x: screen_x,
            y: screen_y,
        });
    }
    Ok(Point::new(screen_x as u16, screen_y as u16))
}

pub struct Cst816Touch<I2C> {
    i2c: I2C,
    irq: &'static InterruptFlag,
    expander: &'static InterruptFlag,
}

impl<I2C: I2c> Cst816Touch<I2C> {
    /// Wrap the shared bus.  `irq` and `expander` are the flags raised by
    /// the touch ISR (normally [`crate::irq::TOUCH_IRQ`] and
    /// [`crate::irq::EXPANDER_IRQ`]).
    pub fn new(i2c: I2C, irq: &'static InterruptFlag, expander: &'static InterruptFlag) -> Self {
        Self { i2c, irq, expander }
    }

    /// Configure the expander and controller.  Call after the controller's
    /// reset pin has been pulsed.
    pub fn init(&mut self) -> Result<ChipVariant, TouchError> {
        self.write_reg(TCA6408_ADDR, TCA_REG_CONFIG, 0xFF)?;

        let id = self.read_reg(CST816_ADDR, REG_CHIP_ID)?;
        let variant = ChipVariant::from_id(id);
        match variant {
            ChipVariant::Unknown(id) => warn!("CST816: unknown chip id 0x{:02X}", id),
            known => info!("CST816: chip id 0x{:02X} ({:?})", id, known),
        }

        // EnChange: interrupt on every touch state change.
        self.write_reg(CST816_ADDR, REG_IRQ_CTL, 0x20)?;
        // Controller-side long press ~0.5s; unused by the classifier but
        // keeps the chip from going quiet on long holds.
        self.write_reg(CST816_ADDR, REG_LONG_PRESS_TIME, 50)?;
        Ok(variant)
    }

    /// Read one touch frame.  `Ok(None)` means no finger on the panel.
    pub fn read_contact(&mut self) -> Result<Option<Point>, TouchError> {
        let mut frame = [0u8; 6];
        self.i2c
            .write_read(CST816_ADDR, &[REG_GESTURE_ID], &mut frame)
            .map_err(|_| TouchError::Bus)?;

        let [_gesture_id, fingers, xh, xl, yh, yl] = frame;
        let fingers = fingers & 0x0F;
        match fingers {
            0 => Ok(None),
            1 | 2 => map_raw_point(xh, xl, yh, yl).map(Some),
            n => Err(TouchError::InvalidFingerCount(n)),
        }
    }

    /// `true` when the expander reports the touch line asserted (P0 low).
    pub fn expander_touch_active(&mut self) -> Result<bool, TouchError> {
        let input = self.read_reg(TCA6408_ADDR, TCA_REG_INPUT)?;
        Ok(input & 0x01 == 0)
    }

    /// Release the bus (e.g. to share it with another driver in tests).
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, addr: u8, reg: u8) -> Result<u8, TouchError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(addr, &[reg], &mut buf)
            .map_err(|_| TouchError::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), TouchError> {
        self.i2c
            .write(addr, &[reg, value])
            .map_err(|_| TouchError::Bus)
    }
}

impl<I2C: I2c> TouchSampleSource for Cst816Touch<I2C> {
    fn poll(&mut self) -> TouchSample {
        match self.read_contact() {
            Ok(Some(p)) => TouchSample::Contact(p),
            Ok(None) => TouchSample::Released,
            Err(e) => {
                debug!("CST816: sample dropped: {}", e);
                TouchSample::ReadFailed
            }
        }
    }

    fn consume_interrupt_edge(&mut self) -> bool {
        let edge = self.irq.take();
        if !self.expander.take() {
            return edge;
        }
        match self.expander_touch_active() {
            Ok(active) => edge || active,
            Err(e) => {
                debug!("TCA6408: input read failed: {}", e);
                edge
            }
        }
    }
}
