//! Constant-rate per-sample risers.
//!
//! A [`Ramp`] adds a fixed delta to its value once per sample. The pulse
//! cycle uses two of them: one driving the volume factor up to its clamp,
//! one pushing the frequency toward the ceiling that triggers the next
//! period-mode transition. The delta is usually derived from a per-second
//! rate divided by the sample rate.

/// A value that rises (or falls) by a fixed delta each sample.
#[derive(Debug, Clone, Default)]
pub struct Ramp {
    value: f32,
    delta: f32,
}

impl Ramp {
    /// Create a ramp holding `initial` with a zero delta.
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            delta: 0.0,
        }
    }

    /// Set the per-sample delta.
    #[inline]
    pub fn set_delta(&mut self, delta: f32) {
        self.delta = delta;
    }

    /// Current per-sample delta.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Overwrite the current value without touching the delta.
    #[inline]
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.value += self.delta;
        self.value
    }

    /// Advance one sample, saturating at `limit`.
    #[inline]
    pub fn advance_clamped(&mut self, limit: f32) -> f32 {
        self.value = (self.value + self.delta).min(limit);
        self.value
    }
}
