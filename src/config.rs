//! Engine configuration parameters
//!
//! All tunable parameters for the EyePal behavior engine.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

/// Core engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Touch ---
    /// Minimum interval between touch controller polls (milliseconds)
    pub touch_poll_interval_ms: u32,
    /// Hold time before a stationary contact becomes a long press
    pub long_press_ms: u32,
    /// Maximum Manhattan drift (px) that still counts as a tap / long press
    pub tap_max_drift_px: u16,
    /// Minimum Manhattan travel (px) for a swipe
    pub swipe_min_dist_px: u16,
    /// Missing-sample window after which a held contact is released
    pub release_timeout_ms: u32,
    /// Contacts shorter than this are discarded as noise
    pub debounce_ms: u32,

    // --- Mood sub-states ---
    pub low_hunger: u8,
    pub low_mood: u8,
    pub low_energy: u8,
    pub low_cleanliness: u8,
    /// A statistic at or above this clears its sub-state
    pub recover_threshold: u8,
    /// All statistics above this suppress negative emotions
    pub calm_threshold: u8,
    /// Lowest statistic at or below this selects the "low" emotion band
    pub band_low_threshold: u8,
    /// Continuous-low time before a sub-state activates (milliseconds)
    pub substate_activate_ms: u32,
    /// Continuous-low time that alone makes the pet depressed (milliseconds)
    pub depressed_long_ms: u32,

    // --- Emotions ---
    /// How long a timed emotion stays on screen (milliseconds)
    pub emotion_duration_ms: u32,
    pub emotion_pick_min_ms: u32,
    pub emotion_pick_max_ms: u32,
    /// Eye tint cross-fade duration (milliseconds)
    pub tint_fade_ms: u32,

    // --- Idle look ---
    pub look_interval_min_ms: u32,
    pub look_interval_max_ms: u32,
    /// Look destination range, +/- px on each axis
    pub look_range_px: i16,

    // --- Interpolation ---
    pub k_slow: f32,
    pub k_normal: f32,
    pub k_fast: f32,
    /// Ceiling applied to every smoothing constant
    pub k_max: f32,
    /// Body offset snaps to target below this distance (px)
    pub snap_epsilon: f32,

    // --- Sequences ---
    pub screensaver_timeout_ms: u32,
    pub feed_duration_ms: u32,
    pub clean_duration_ms: u32,
    /// Stat boost applied by an options-panel activation
    pub option_boost: u8,

    // --- Care decay (minutes per point) ---
    pub hunger_decay_min: u16,
    pub mood_decay_min: u16,
    pub energy_decay_min: u16,
    pub cleanliness_decay_min: u16,

    // --- Tap-the-Greens ---
    pub game_max_rounds: u8,
    pub game_reward_per_hit: u8,
    pub game_color_min_ms: u32,
    pub game_color_max_ms: u32,

    // --- Timing ---
    /// Main loop frame interval (milliseconds)
    pub frame_interval_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Touch
            touch_poll_interval_ms: 5,
            long_press_ms: 400,
            tap_max_drift_px: 35,
            swipe_min_dist_px: 40,
            release_timeout_ms: 120,
            debounce_ms: 20,

            // Mood sub-states
            low_hunger: 30,
            low_mood: 30,
            low_energy: 25,
            low_cleanliness: 25,
            recover_threshold: 80,
            calm_threshold: 50,
            band_low_threshold: 30,
            substate_activate_ms: 20_000,
            depressed_long_ms: 60_000,

            // Emotions
            emotion_duration_ms: 2000,
            emotion_pick_min_ms: 7000,
            emotion_pick_max_ms: 15_000,
            tint_fade_ms: 500,

            // Idle look
            look_interval_min_ms: 2000,
            look_interval_max_ms: 4000,
            look_range_px: 5,

            // Interpolation
            k_slow: 0.06,
            k_normal: 0.15,
            k_fast: 0.30,
            k_max: 0.25,
            snap_epsilon: 0.5,

            // Sequences
            screensaver_timeout_ms: 10 * 60 * 1000,
            feed_duration_ms: 5000,
            clean_duration_ms: 5000,
            option_boost: 10,

            // Care decay
            hunger_decay_min: 6,
            mood_decay_min: 8,
            energy_decay_min: 5,
            cleanliness_decay_min: 10,

            // Tap-the-Greens
            game_max_rounds: 40,
            game_reward_per_hit: 5,
            game_color_min_ms: 1000,
            game_color_max_ms: 2000,

            // Timing
            frame_interval_ms: 16, // ~60 Hz
        }
    }
}
