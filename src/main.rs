//! EyePal firmware entry point
//!
//! Hexagonal architecture with a single fixed-rate main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   NvsAdapter   Esp32Time  │
//! │  (Touch + AudioCue)     (EventSink)    (Config+Pet) (Clock)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            CompanionService (pure logic)               │    │
//! │  │  Gesture · Layers · Mood · Emotion · Idle · Motion     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use log::{info, warn};

use eyepal::adapters::audio::LogAudioCue;
use eyepal::adapters::hardware::HardwareAdapter;
use eyepal::adapters::log_sink::LogEventSink;
use eyepal::adapters::nvs::NvsAdapter;
use eyepal::adapters::time::Esp32TimeAdapter;
use eyepal::app::ports::{ConfigPort, MonotonicClock, PetStorePort};
use eyepal::app::service::CompanionService;
use eyepal::config::EngineConfig;
use eyepal::drivers::cst816::Cst816Touch;
use eyepal::drivers::hw_init;
use eyepal::error::Error;
use eyepal::irq::{EXPANDER_IRQ, TOUCH_IRQ};
use eyepal::pet::PetState;
use eyepal::pins;
use eyepal::random::Mulberry32;
use eyepal::timing::elapsed;

/// Pet record write-back cadence.
const PET_SAVE_INTERVAL_MS: u32 = 60_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  EyePal v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {}; touch falls back to polling", e);
    }

    let peripherals = Peripherals::take()?;
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz()),
    )?;

    let mut touch = Cst816Touch::new(i2c, &TOUCH_IRQ, &EXPANDER_IRQ);
    match touch.init() {
        Ok(variant) => info!("Touch ready ({:?})", variant),
        Err(e) => warn!("Touch init failed ({}); reads will be retried every frame", e),
    }
    let mut hw = HardwareAdapter::new(touch, LogAudioCue::new());

    // ── 3. Load config + pet from NVS ─────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            EngineConfig::default()
        }
    };
    let mut pet = match nvs.load_pet() {
        Ok(Some(snap)) => {
            info!("Pet loaded: level {} hatched={}", snap.level, snap.hatched);
            PetState::from_snapshot(&config, &snap)
        }
        Ok(None) => {
            info!("No pet record, starting a new egg");
            PetState::new(&config)
        }
        Err(e) => {
            warn!("Pet record unreadable ({}), starting a new egg", e);
            PetState::new(&config)
        }
    };

    // ── 4. Service ────────────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();
    let mut app = CompanionService::new(config.clone(), Mulberry32::from_hardware());
    app.start(clock.now_ms(), &mut pet, &mut log_sink);

    info!("System ready. Entering main loop.");

    // ── 5. Main loop ──────────────────────────────────────────
    let mut last_pet_save = clock.now_ms();
    loop {
        let frame_start = clock.now_ms();
        app.tick(frame_start, &mut hw, &mut pet, &mut log_sink);

        app.auto_save_if_needed(frame_start, &nvs);
        if elapsed(frame_start, last_pet_save) >= PET_SAVE_INTERVAL_MS {
            if let Err(e) = nvs.save_pet(&pet.snapshot()) {
                warn!("Pet save failed: {}", e);
            }
            last_pet_save = frame_start;
        }

        let spent = elapsed(clock.now_ms(), frame_start);
        FreeRtos::delay_ms(config.frame_interval_ms.saturating_sub(spent).max(1));
    }
}
