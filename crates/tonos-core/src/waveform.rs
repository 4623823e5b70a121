//! Waveform shape functions.
//!
//! A [`Waveform`] maps an instantaneous phase angle in `[0, 2π)` to an
//! amplitude in `[-1, 1]`, unscaled by volume. The shapes are the classic
//! signal-generator set plus two sine powers: squaring doubles the frequency
//! (the alternating sign restores the fundamental as a buzzy half-wave pair),
//! cubing keeps the fundamental but flattens the peaks.

use core::f32::consts::{FRAC_PI_2, PI};

use libm::sinf;

/// Waveform selection for an [`Oscillator`](crate::Oscillator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Pure sine wave.
    #[default]
    Sine,
    /// Squared sine, sign-flipped on the first half-cycle so the output
    /// still alternates around zero.
    SineSquaredAlternating,
    /// Cubed sine. Odd power, so the sign survives squashing.
    SineCubed,
    /// Piecewise-linear triangle hitting exactly 0, 1, 0, -1 at
    /// phase 0, π/2, π, 3π/2.
    Triangle,
    /// Square wave, low for the first half-cycle.
    Square,
}

impl Waveform {
    /// Evaluate the shape at `phase` radians.
    ///
    /// `phase` is expected in `[0, 2π)`; the oscillator maintains that
    /// invariant by wrapping.
    #[inline]
    pub fn shape(self, phase: f32) -> f32 {
        match self {
            Self::Sine => sinf(phase),
            Self::SineSquaredAlternating => {
                let s = sinf(phase);
                if phase > PI { s * s } else { -(s * s) }
            }
            Self::SineCubed => {
                let s = sinf(phase);
                s * s * s
            }
            Self::Triangle => {
                if phase <= FRAC_PI_2 {
                    phase / FRAC_PI_2
                } else if phase <= 3.0 * FRAC_PI_2 {
                    2.0 - phase / FRAC_PI_2
                } else {
                    -4.0 + phase / FRAC_PI_2
                }
            }
            Self::Square => {
                if phase < PI { -1.0 } else { 1.0 }
            }
        }
    }
}
