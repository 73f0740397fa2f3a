//! Hardware adapter: bridges the touch panel and speaker to the
//! domain port traits.
//!
//! [`CompanionService::tick`](crate::app::service::CompanionService::tick)
//! takes one value that is both a [`TouchSampleSource`] and an
//! [`AudioCue`]; this adapter pairs the two concrete drivers into that
//! value.

use crate::app::ports::{AudioCue, TouchSampleSource};
use crate::drivers::gesture::TouchSample;

/// Concrete adapter that combines the touch source and the audio sink.
pub struct HardwareAdapter<T, A> {
    touch: T,
    audio: A,
}

impl<T: TouchSampleSource, A: AudioCue> HardwareAdapter<T, A> {
    pub fn new(touch: T, audio: A) -> Self {
        Self { touch, audio }
    }

    pub fn touch(&self) -> &T {
        &self.touch
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

// ── TouchSampleSource implementation ──────────────────────────

impl<T: TouchSampleSource, A> TouchSampleSource for HardwareAdapter<T, A> {
    fn poll(&mut self) -> TouchSample {
        self.touch.poll()
    }

    fn consume_interrupt_edge(&mut self) -> bool {
        self.touch.consume_interrupt_edge()
    }
}

// ── AudioCue implementation ───────────────────────────────────

impl<T, A: AudioCue> AudioCue for HardwareAdapter<T, A> {
    fn blink(&mut self) {
        self.audio.blink();
    }

    fn swoosh(&mut self, strength: f32) {
        self.audio.swoosh(strength);
    }

    fn jitter_noise(&mut self, strength: f32) {
        self.audio.jitter_noise(strength);
    }

    fn happy_pip(&mut self, strength: f32) {
        self.audio.happy_pip(strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audio::LogAudioCue;
    use crate::drivers::gesture::Point;

    struct OneShot(Option<Point>);

    impl TouchSampleSource for OneShot {
        fn poll(&mut self) -> TouchSample {
            self.0.take().map_or(TouchSample::Released, TouchSample::Contact)
        }

        fn consume_interrupt_edge(&mut self) -> bool {
            self.0.is_some()
        }
    }

    #[test]
    fn forwards_to_both_drivers() {
        let mut hw = HardwareAdapter::new(OneShot(Some(Point::new(3, 4))), LogAudioCue::new());
        assert!(hw.consume_interrupt_edge());
        assert_eq!(hw.poll(), TouchSample::Contact(Point::new(3, 4)));
        assert_eq!(hw.poll(), TouchSample::Released);
        hw.blink();
        assert_eq!(hw.audio().cue_count(), 1);
    }
}
