//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`PetStorePort`] for EyePal.
//!
//! - Config validation: every tuning field is range-checked before
//!   persistence.  Invalid values are rejected, never clamped.
//! - Both records are postcard blobs in the `eyepal` namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit().

use crate::app::ports::{ConfigError, ConfigPort, PetStorePort, StorageError};
use crate::config::EngineConfig;
use crate::pet::PetSnapshot;
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "eyepal";
const CONFIG_KEY: &str = "engcfg";
const PET_KEY: &str = "pet";

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_BLOB_SIZE: usize = 1024;

/// Low-level blob failure, mapped to the port error by each caller.
#[derive(Debug, PartialEq, Eq)]
enum BlobError {
    NotFound,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    Esp(i32),
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    // ── Blob primitives ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.store
            .borrow()
            .get(&format!("{}::{}", NAMESPACE, key))
            .cloned()
            .ok_or(BlobError::NotFound)
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        self.store
            .borrow_mut()
            .insert(format!("{}::{}", NAMESPACE, key), bytes.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let key_buf = nul_terminated(key);
        Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // First call: get size
            let ret = unsafe {
                nvs_get_blob(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
            };
            if ret == ESP_ERR_NVS_NOT_FOUND {
                return Err(BlobError::NotFound);
            }
            if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                return Err(BlobError::Esp(ret));
            }
            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(BlobError::Esp(ret));
            }
            Ok(buf)
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let key_buf = nul_terminated(key);
        Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(BlobError::Esp(ret));
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(BlobError::Esp(ret));
            }
            Ok(())
        })
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, BlobError>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, BlobError>,
    {
        let ns_buf = nul_terminated(NAMESPACE);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret == ESP_ERR_NVS_NOT_FOUND {
            return Err(BlobError::NotFound);
        }
        if ret != ESP_OK {
            return Err(BlobError::Esp(ret));
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// NVS keys and namespaces are limited to 15 bytes plus NUL.
#[cfg(target_os = "espidf")]
fn nul_terminated(s: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let bytes = s.as_bytes();
    let len = bytes.len().min(15);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

pub(crate) fn validate_config(cfg: &EngineConfig) -> Result<(), ConfigError> {
    if !(1..=50).contains(&cfg.touch_poll_interval_ms) {
        return Err(ConfigError::ValidationFailed("touch_poll_interval_ms must be 1–50"));
    }
    if !(150..=3000).contains(&cfg.long_press_ms) {
        return Err(ConfigError::ValidationFailed("long_press_ms must be 150–3000"));
    }
    if cfg.debounce_ms >= cfg.long_press_ms {
        return Err(ConfigError::ValidationFailed("debounce_ms must be < long_press_ms"));
    }
    if cfg.tap_max_drift_px >= cfg.swipe_min_dist_px {
        return Err(ConfigError::ValidationFailed(
            "tap_max_drift_px must be < swipe_min_dist_px",
        ));
    }
    for (value, name) in [
        (cfg.low_hunger, "low_hunger must be 0–100"),
        (cfg.low_mood, "low_mood must be 0–100"),
        (cfg.low_energy, "low_energy must be 0–100"),
        (cfg.low_cleanliness, "low_cleanliness must be 0–100"),
        (cfg.recover_threshold, "recover_threshold must be 0–100"),
        (cfg.option_boost, "option_boost must be 0–100"),
    ] {
        if value > 100 {
            return Err(ConfigError::ValidationFailed(name));
        }
    }
    if cfg.emotion_pick_min_ms > cfg.emotion_pick_max_ms {
        return Err(ConfigError::ValidationFailed(
            "emotion_pick_min_ms must be <= emotion_pick_max_ms",
        ));
    }
    if cfg.look_interval_min_ms > cfg.look_interval_max_ms {
        return Err(ConfigError::ValidationFailed(
            "look_interval_min_ms must be <= look_interval_max_ms",
        ));
    }
    if cfg.game_color_min_ms > cfg.game_color_max_ms {
        return Err(ConfigError::ValidationFailed(
            "game_color_min_ms must be <= game_color_max_ms",
        ));
    }
    if cfg.game_max_rounds == 0 {
        return Err(ConfigError::ValidationFailed("game_max_rounds must be >= 1"));
    }
    if !(0.0..=1.0).contains(&cfg.k_max) || cfg.k_max == 0.0 {
        return Err(ConfigError::ValidationFailed("k_max must be in (0, 1]"));
    }
    if !(10_000..=3_600_000).contains(&cfg.screensaver_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "screensaver_timeout_ms must be 10 s–1 h",
        ));
    }
    if !(5..=100).contains(&cfg.frame_interval_ms) {
        return Err(ConfigError::ValidationFailed("frame_interval_ms must be 5–100"));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<EngineConfig, ConfigError> {
        match self.read_blob(CONFIG_KEY) {
            Ok(bytes) => {
                let cfg: EngineConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            Err(BlobError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(EngineConfig::default())
            }
            Err(BlobError::Esp(e)) => {
                warn!("NvsAdapter: NVS read error {}, using defaults", e);
                Ok(EngineConfig::default())
            }
        }
    }

    fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.write_blob(CONFIG_KEY, &bytes).map_err(|e| {
            warn!("NvsAdapter: config write error {:?}", e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl PetStorePort for NvsAdapter {
    fn load_pet(&self) -> Result<Option<PetSnapshot>, StorageError> {
        match self.read_blob(PET_KEY) {
            Ok(bytes) => postcard::from_bytes(&bytes)
                .map(Some)
                .map_err(|_| StorageError::Corrupted),
            Err(BlobError::NotFound) => Ok(None),
            Err(BlobError::Esp(_)) => Err(StorageError::IoError),
        }
    }

    fn save_pet(&mut self, snapshot: &PetSnapshot) -> Result<(), StorageError> {
        let bytes = postcard::to_allocvec(snapshot).map_err(|_| StorageError::IoError)?;
        self.write_blob(PET_KEY, &bytes).map_err(|e| match e {
            #[cfg(target_os = "espidf")]
            BlobError::Esp(code) if code == ESP_ERR_NVS_NOT_ENOUGH_SPACE => StorageError::Full,
            _ => StorageError::IoError,
        })?;
        info!("NvsAdapter: pet record saved ({} bytes)", bytes.len());
        Ok(())
    }
}
