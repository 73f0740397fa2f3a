//! Log-backed audio cue adapter.
//!
//! Implements [`AudioCue`] by logging each cue at `debug`.  The board's
//! I2S speaker path is not driven yet; this adapter keeps the cue
//! timing visible on the serial console and counts cues for tests.

use log::debug;

use crate::app::ports::AudioCue;

#[derive(Debug, Default)]
pub struct LogAudioCue {
    cues: u32,
}

impl LogAudioCue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues played since boot.
    pub fn cue_count(&self) -> u32 {
        self.cues
    }

    fn played(&mut self) {
        self.cues = self.cues.wrapping_add(1);
    }
}

impl AudioCue for LogAudioCue {
    fn blink(&mut self) {
        self.played();
        debug!("AUDIO | blink");
    }

    fn swoosh(&mut self, strength: f32) {
        self.played();
        debug!("AUDIO | swoosh {:.2}", strength.clamp(0.0, 1.0));
    }

    fn jitter_noise(&mut self, strength: f32) {
        self.played();
        debug!("AUDIO | jitter {:.2}", strength.clamp(0.0, 1.0));
    }

    fn happy_pip(&mut self, strength: f32) {
        self.played();
        debug!("AUDIO | pip {:.2}", strength.clamp(0.0, 1.0));
    }
}
