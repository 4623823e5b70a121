//! Pulse-cycle period state machine.
//!
//! The pulse generator produces a siren-like alert: while triggered, the
//! frequency ramps up from a base pitch, snaps back to the base when it
//! crosses twice the base, holds there for a configured plateau, then ramps
//! again. Volume rises along its own slope toward the configured maximum and
//! collapses to zero the moment the trigger releases.
//!
//! [`PulseCycle::advance`] runs once per sample and yields the frequency and
//! target volume for that sample; the caller feeds those into an oscillator
//! and a [`SmoothedLevel`](crate::SmoothedLevel). The trigger itself
//! ([`set_active`](PulseCycle::set_active)) comes from outside, typically a
//! repetition timer or a held key.

use crate::Ramp;

/// Phase of the pulse cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodMode {
    /// Idle: target volume zero, frequency parked at the base.
    #[default]
    Resting,
    /// Frequency rising from the base toward twice the base.
    Ramping,
    /// Frequency held at the base for the plateau duration.
    Holding,
}

/// Per-sample output of the cycle: what to synthesize right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseOutput {
    /// Frequency to synthesize this sample, in Hz.
    pub frequency: f32,
    /// Target volume for the envelope filter, `0..=max_volume`.
    pub target_volume: f32,
}

/// The Resting/Ramping/Holding state machine driving the pulse generator.
#[derive(Debug, Clone)]
pub struct PulseCycle {
    sample_rate: f32,
    delta_time: f32,
    base_frequency: f32,
    frequency: Ramp,
    frequency_raise_rate: f32,
    max_volume: f32,
    volume_factor: Ramp,
    volume_raise_rate: f32,
    time_in_cycle: f32,
    hold_duration: f32,
    mode: PeriodMode,
}

impl PulseCycle {
    /// Create an idle cycle. All rates start at zero; the hold plateau
    /// defaults to one second.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            delta_time: 1.0 / sample_rate,
            base_frequency: 0.0,
            frequency: Ramp::new(0.0),
            frequency_raise_rate: 0.0,
            max_volume: 0.0,
            volume_factor: Ramp::new(0.0),
            volume_raise_rate: 0.0,
            time_in_cycle: 0.0,
            hold_duration: 1.0,
            mode: PeriodMode::Resting,
        }
    }

    /// Set the base frequency in Hz.
    ///
    /// With a zero raise rate the current frequency follows the base
    /// directly; otherwise the running ramp keeps its position and only the
    /// ceiling and the per-sample delta move.
    pub fn set_base_frequency(&mut self, hz: f32) {
        self.base_frequency = hz;
        if self.frequency_raise_rate == 0.0 {
            self.frequency.set_value(hz);
        }
        self.recalculate_frequency_delta();
    }

    /// Set the frequency raise rate, as a fraction of the base per second.
    ///
    /// A rate of 1.0 sweeps base → 2×base in one second.
    pub fn set_frequency_raise_rate(&mut self, rate: f32) {
        self.frequency_raise_rate = rate;
        self.recalculate_frequency_delta();
    }

    /// Set the volume ceiling reached when the volume factor saturates.
    pub fn set_max_volume(&mut self, volume: f32) {
        self.max_volume = volume;
    }

    /// Set the volume raise rate in units of full scale per second.
    pub fn set_volume_raise_rate(&mut self, rate: f32) {
        self.volume_raise_rate = rate;
        self.volume_factor.set_delta(rate / self.sample_rate);
    }

    /// Set the constant-frequency plateau length in seconds.
    pub fn set_hold_duration(&mut self, seconds: f32) {
        self.hold_duration = seconds;
    }

    /// Set the plateau length as a repetition frequency, `duration = 1/hz`.
    ///
    /// Values of zero or below leave the duration unchanged.
    pub fn set_hold_rate(&mut self, hz: f32) {
        if hz > 0.0 {
            self.hold_duration = 1.0 / hz;
        }
    }

    /// Trigger or release the pulse.
    ///
    /// Triggering restarts the cycle from the base frequency with the volume
    /// factor at zero; releasing drops straight back to rest (the audible
    /// tail-off is the envelope filter's job).
    pub fn set_active(&mut self, on: bool) {
        if on {
            self.frequency.set_value(self.base_frequency);
            self.volume_factor.set_value(0.0);
            self.time_in_cycle = 0.0;
            self.mode = PeriodMode::Ramping;
        } else {
            self.volume_factor.set_value(0.0);
            self.time_in_cycle = 0.0;
            self.mode = PeriodMode::Resting;
        }
    }

    /// Change the sample rate, rescaling the per-sample deltas.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.delta_time = 1.0 / sample_rate;
        self.recalculate_frequency_delta();
        self.volume_factor
            .set_delta(self.volume_raise_rate / sample_rate);
    }

    /// Current period mode.
    #[inline]
    pub fn mode(&self) -> PeriodMode {
        self.mode
    }

    /// True while triggered (not [`PeriodMode::Resting`]).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.mode != PeriodMode::Resting
    }

    /// Current instantaneous frequency in Hz.
    #[inline]
    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    /// Configured base frequency in Hz.
    #[inline]
    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> PulseOutput {
        match self.mode {
            PeriodMode::Resting => PulseOutput {
                frequency: self.base_frequency,
                target_volume: 0.0,
            },
            PeriodMode::Ramping => {
                self.time_in_cycle += self.delta_time;
                let factor = self.volume_factor.advance_clamped(1.0);
                let hz = self.frequency.advance();
                if hz > 2.0 * self.base_frequency {
                    self.frequency.set_value(self.base_frequency);
                    self.time_in_cycle = 0.0;
                    self.mode = PeriodMode::Holding;
                }
                PulseOutput {
                    frequency: self.frequency.value(),
                    target_volume: self.max_volume * factor,
                }
            }
            PeriodMode::Holding => {
                self.time_in_cycle += self.delta_time;
                let factor = self.volume_factor.advance_clamped(1.0);
                if self.time_in_cycle > self.hold_duration {
                    self.frequency.set_value(self.base_frequency);
                    self.time_in_cycle = 0.0;
                    self.mode = PeriodMode::Ramping;
                }
                PulseOutput {
                    frequency: self.frequency.value(),
                    target_volume: self.max_volume * factor,
                }
            }
        }
    }

    fn recalculate_frequency_delta(&mut self) {
        self.frequency
            .set_delta(self.base_frequency * self.frequency_raise_rate / self.sample_rate);
    }
}
