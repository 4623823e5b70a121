//! Phase-accumulator oscillator.
//!
//! The oscillator keeps a running phase in radians and advances it by
//! `2π·frequency/sample_rate` per sample. Wrapping subtracts one full turn
//! instead of resetting, so the waveform stays continuous across frequency
//! changes and buffer boundaries. Retuning only recomputes the per-sample
//! increment; the phase itself is never touched while running.

use core::f32::consts::TAU;

use crate::Waveform;

/// A free-running oscillator with a selectable [`Waveform`].
///
/// # Example
///
/// ```rust
/// use tonos_core::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(44100.0);
/// osc.set_frequency(440.0);
/// osc.set_waveform(Waveform::Sine);
/// let first = osc.advance();
/// assert_eq!(first, 0.0); // sine starts at phase 0
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    delta_phase: f32,
    frequency: f32,
    sample_rate: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Create a silent oscillator at the given sample rate.
    ///
    /// The frequency starts at 0 Hz (a flat output at the waveform's phase-0
    /// value); callers set it before or during playback. `sample_rate` must
    /// be positive.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            delta_phase: 0.0,
            frequency: 0.0,
            sample_rate,
            waveform: Waveform::Sine,
        }
    }

    /// Set the frequency in Hz and recompute the per-sample phase increment.
    ///
    /// Takes effect on the next [`advance`](Self::advance); the current phase
    /// is preserved so retuning never clicks.
    #[inline]
    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        self.delta_phase = TAU * hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Change the sample rate, keeping the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.delta_phase = TAU * self.frequency / sample_rate;
    }

    /// Select the waveform shape.
    #[inline]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Currently selected waveform.
    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current phase in radians, in `[0, 2π)`.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset the phase to zero. Only meaningful between runs.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce the sample at the current phase, then advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let sample = self.waveform.shape(self.phase);
        self.phase += self.delta_phase;
        if self.phase > TAU {
            self.phase -= TAU;
        }
        sample
    }
}
