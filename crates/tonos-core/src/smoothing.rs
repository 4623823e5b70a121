//! Amplitude smoothing for click-free level changes.
//!
//! Driving a speaker with a step change in amplitude produces an audible
//! click. [`SmoothedLevel`] filters every level change through a one-pole
//! lowpass so both deliberate fades and on/off transitions glide instead of
//! stepping. The filter only runs while a change is pending: once the value
//! reaches its floating-point fixed point it snaps to the target and the
//! pending slot is cleared, so a settled level costs nothing per sample.

/// One-pole smoothed amplitude with an optional pending target.
///
/// The update is `current ← current·(1−α) + target·α` once per sample.
/// Useful α values are small: `0.001` settles to 99% in roughly 4600
/// samples, `0.002` in roughly 2300, independent of sample rate.
#[derive(Debug, Clone)]
pub struct SmoothedLevel {
    current: f32,
    target: Option<f32>,
    alpha: f32,
}

impl SmoothedLevel {
    /// Create a level at `initial` with smoothing coefficient `alpha`.
    ///
    /// `alpha` is the one-pole feed-forward coefficient in `(0, 1)`;
    /// smaller is slower.
    pub fn new(initial: f32, alpha: f32) -> Self {
        Self {
            current: initial,
            target: None,
            alpha,
        }
    }

    /// Arm a new target; the level will glide toward it on each
    /// [`advance`](Self::advance).
    ///
    /// Re-targeting a settled level with its own value is a no-op, so
    /// callers may set the target every sample without waking the filter.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if self.target.is_none() && target == self.current {
            return;
        }
        self.target = Some(target);
    }

    /// Jump to `value` with no smoothing and clear any pending target.
    ///
    /// Intended for configuration while no stream is running.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = None;
    }

    /// Advance one sample and return the level to apply to that sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if let Some(target) = self.target {
            // Incremental form: the step rounds to zero at the fixed point
            // instead of landing one ulp past it.
            let next = self.current + self.alpha * (target - self.current);
            if next == self.current {
                // f32 fixed point: the filter can no longer move, so land
                // exactly on the target and stop filtering.
                self.current = target;
                self.target = None;
            } else {
                self.current = next;
            }
        }
        self.current
    }

    /// Current smoothed level.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Pending target, if a change is still in flight.
    #[inline]
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    /// True when no change is pending.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.target.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_monotonically_without_overshoot() {
        let mut level = SmoothedLevel::new(0.0, 0.002);
        level.set_target(0.8);
        let mut previous = level.get();
        for _ in 0..50_000 {
            let value = level.advance();
            assert!(value >= previous, "dipped from {previous} to {value}");
            assert!(value <= 0.8 + 1e-6, "overshot to {value}");
            previous = value;
        }
    }

    #[test]
    fn settles_exactly_on_target_and_clears() {
        let mut level = SmoothedLevel::new(0.0, 0.002);
        level.set_target(1.0);
        for _ in 0..50_000 {
            level.advance();
        }
        assert!(level.is_settled(), "still pending after 50k samples");
        assert_eq!(level.get(), 1.0, "fixed point must snap to the target");
    }

    #[test]
    fn falls_toward_zero_on_mute() {
        let mut level = SmoothedLevel::new(0.5, 0.001);
        level.set_target(0.0);
        // 500 ms at 44.1 kHz is how long the generators wait before
        // tearing a stream down; the level must be inaudible by then.
        for _ in 0..22_050 {
            level.advance();
        }
        assert!(level.get() < 1e-9, "still audible: {}", level.get());
    }

    #[test]
    fn retargeting_the_settled_value_stays_settled() {
        let mut level = SmoothedLevel::new(0.5, 0.002);
        level.set_target(0.5);
        assert!(level.is_settled());
        assert_eq!(level.advance(), 0.5);
    }

    #[test]
    fn set_immediate_skips_smoothing() {
        let mut level = SmoothedLevel::new(0.0, 0.001);
        level.set_target(1.0);
        level.set_immediate(0.25);
        assert_eq!(level.get(), 0.25);
        assert!(level.is_settled());
        assert_eq!(level.advance(), 0.25);
    }

    #[test]
    fn retarget_mid_glide_changes_direction() {
        let mut level = SmoothedLevel::new(0.0, 0.002);
        level.set_target(1.0);
        for _ in 0..500 {
            level.advance();
        }
        let peak = level.get();
        level.set_target(0.0);
        for _ in 0..500 {
            level.advance();
        }
        assert!(level.get() < peak);
    }

    #[test]
    fn faster_alpha_settles_sooner() {
        let mut slow = SmoothedLevel::new(0.0, 0.001);
        let mut fast = SmoothedLevel::new(0.0, 0.002);
        slow.set_target(1.0);
        fast.set_target(1.0);
        for _ in 0..2_000 {
            slow.advance();
            fast.advance();
        }
        assert!(fast.get() > slow.get());
    }
}
