//! One-shot hardware peripheral initialization.
//!
//! Configures the backlight and touch-reset outputs, pulses the touch
//! controller out of reset, and installs the expander INT handler using
//! raw ESP-IDF sys calls.  Called once from `main()` before the main
//! loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO config failed"),
            HwInitError::IsrInstallFailed(_) => Self::Init("GPIO ISR install failed"),
        }
    }
}

/// Touch controller needs this long in reset, and again to boot.
#[cfg(target_os = "espidf")]
const TOUCH_RESET_MS: u32 = 10;
#[cfg(target_os = "espidf")]
const TOUCH_BOOT_MS: u32 = 50;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the main loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_touch_int()?;
        pulse_touch_reset();
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &[pins::LCD_BL_GPIO, pins::TOUCH_RST_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }
    unsafe {
        gpio_set_level(pins::TOUCH_RST_GPIO, 1);
        gpio_set_level(pins::LCD_BL_GPIO, 1);
    }
    info!("hw_init: GPIO outputs configured (backlight on)");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_touch_int() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::TCA_INT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn pulse_touch_reset() {
    // SAFETY: vTaskDelay blocks only the calling (main) task.
    unsafe {
        gpio_set_level(pins::TOUCH_RST_GPIO, 0);
        vTaskDelay(ms_to_ticks(TOUCH_RESET_MS));
        gpio_set_level(pins::TOUCH_RST_GPIO, 1);
        vTaskDelay(ms_to_ticks(TOUCH_BOOT_MS));
    }
}

#[cfg(target_os = "espidf")]
fn ms_to_ticks(ms: u32) -> u32 {
    (ms * configTICK_RATE_HZ / 1000).max(1)
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn touch_gpio_isr(_arg: *mut core::ffi::c_void) {
    crate::irq::touch_isr_handler();
}

/// Install the per-pin GPIO ISR service and register the expander INT
/// handler.  Call after init_peripherals() and before the main loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  The handler only raises atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_isr_handler_add(pins::TCA_INT_GPIO, Some(touch_gpio_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::TCA_INT_GPIO);
    }
    info!("hw_init: ISR service installed (touch INT on GPIO{})", pins::TCA_INT_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
