//! Pulsed siren playback.
//!
//! [`PulseVoice`] couples the period state machine from `tonos-core` to an
//! oscillator and envelope; [`PulseEngine`] runs it through the playback
//! pipeline. Because the frequency and level move on their own while the
//! pulse is active, the engine cannot answer "what is playing right now"
//! from its retained parameters; the voice publishes a [`PulseTelemetry`]
//! snapshot once per buffer instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use tonos_core::{Oscillator, PeriodMode, PulseCycle, SmoothedLevel, Waveform};

use crate::pipeline::{EngineConfig, Pipeline, SampleSource};
use crate::{Error, Result};

/// Gain smoothing coefficient; faster than the tone's so the collapse on
/// release still reads as a pulse edge.
const LEVEL_ALPHA: f32 = 0.002;

/// Tunable parameters of the pulse cycle, retained across runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseSettings {
    /// Resting pitch and lower bound of the frequency ramp, in Hz.
    pub base_frequency: f32,
    /// Waveform shape of the carrier.
    pub waveform: Waveform,
    /// Frequency ramp slope as a fraction of the base per second.
    pub frequency_raise_rate: f32,
    /// Envelope ramp slope in full scale per second.
    pub volume_raise_rate: f32,
    /// Plateau length in seconds.
    pub hold_duration: f32,
    /// Volume ceiling, `0..=1`.
    pub max_volume: f32,
}

impl Default for PulseSettings {
    /// Stock siren: 50 Hz sine base, quarter-second ramps, one-second
    /// plateau.
    fn default() -> Self {
        Self {
            base_frequency: 50.0,
            waveform: Waveform::Sine,
            frequency_raise_rate: 4.0,
            volume_raise_rate: 4.0,
            hold_duration: 1.0,
            max_volume: 0.5,
        }
    }
}

/// Runtime changes a [`PulseEngine`] relays to its voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseCommand {
    /// Trigger or release the pulse.
    SetActive(bool),
    /// Retune the base frequency.
    SetBaseFrequency(f32),
    /// Switch the carrier waveform shape.
    SetWaveform(Waveform),
    /// Change the frequency ramp slope.
    SetFrequencyRaiseRate(f32),
    /// Change the envelope ramp slope.
    SetVolumeRaiseRate(f32),
    /// Change the plateau length in seconds.
    SetHoldDuration(f32),
    /// Change the volume ceiling.
    SetMaxVolume(f32),
}

/// Snapshot of a running pulse voice, published once per buffer.
///
/// Reads are [`Ordering::Relaxed`]; the values are display-grade, not
/// sample-accurate.
#[derive(Debug)]
pub struct PulseTelemetry {
    frequency_bits: AtomicU32,
    volume_bits: AtomicU32,
    mode: AtomicU8,
}

impl PulseTelemetry {
    fn new() -> Self {
        Self {
            frequency_bits: AtomicU32::new(0.0f32.to_bits()),
            volume_bits: AtomicU32::new(0.0f32.to_bits()),
            mode: AtomicU8::new(mode_code(PeriodMode::Resting)),
        }
    }

    /// Instantaneous frequency in Hz at the last published buffer.
    pub fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency_bits.load(Ordering::Relaxed))
    }

    /// Smoothed output level at the last published buffer.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    /// Period mode at the last published buffer.
    pub fn mode(&self) -> PeriodMode {
        match self.mode.load(Ordering::Relaxed) {
            1 => PeriodMode::Ramping,
            2 => PeriodMode::Holding,
            _ => PeriodMode::Resting,
        }
    }

    fn publish(&self, frequency: f32, volume: f32, mode: PeriodMode) {
        self.frequency_bits
            .store(frequency.to_bits(), Ordering::Relaxed);
        self.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
        self.mode.store(mode_code(mode), Ordering::Relaxed);
    }
}

fn mode_code(mode: PeriodMode) -> u8 {
    match mode {
        PeriodMode::Resting => 0,
        PeriodMode::Ramping => 1,
        PeriodMode::Holding => 2,
    }
}

/// Period state machine driving an oscillator and envelope, one mono
/// sample at a time.
#[derive(Debug)]
pub struct PulseVoice {
    oscillator: Oscillator,
    cycle: PulseCycle,
    level: SmoothedLevel,
    telemetry: Arc<PulseTelemetry>,
}

impl PulseVoice {
    /// Create a voice from `settings`, triggered when `active`.
    pub fn new(sample_rate: f32, settings: &PulseSettings, active: bool) -> Self {
        let mut cycle = PulseCycle::new(sample_rate);
        cycle.set_base_frequency(settings.base_frequency);
        cycle.set_frequency_raise_rate(settings.frequency_raise_rate);
        cycle.set_volume_raise_rate(settings.volume_raise_rate);
        cycle.set_hold_duration(settings.hold_duration);
        cycle.set_max_volume(settings.max_volume);
        cycle.set_active(active);
        let mut oscillator = Oscillator::new(sample_rate);
        oscillator.set_frequency(settings.base_frequency);
        oscillator.set_waveform(settings.waveform);
        Self {
            oscillator,
            cycle,
            level: SmoothedLevel::new(0.0, LEVEL_ALPHA),
            telemetry: Arc::new(PulseTelemetry::new()),
        }
    }

    /// Handle for reading the voice's telemetry after it moves into a
    /// pipeline. Updated once per [`fill`](SampleSource::fill).
    pub fn telemetry(&self) -> Arc<PulseTelemetry> {
        Arc::clone(&self.telemetry)
    }

    /// Trigger or release the pulse.
    pub fn set_active(&mut self, on: bool) {
        self.cycle.set_active(on);
    }

    /// Retune the base frequency.
    pub fn set_base_frequency(&mut self, hz: f32) {
        self.cycle.set_base_frequency(hz);
    }

    /// Switch the carrier waveform shape.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    /// Change the frequency ramp slope, base fractions per second.
    pub fn set_frequency_raise_rate(&mut self, rate: f32) {
        self.cycle.set_frequency_raise_rate(rate);
    }

    /// Change the envelope ramp slope, full scale per second.
    pub fn set_volume_raise_rate(&mut self, rate: f32) {
        self.cycle.set_volume_raise_rate(rate);
    }

    /// Change the plateau length in seconds.
    pub fn set_hold_duration(&mut self, seconds: f32) {
        self.cycle.set_hold_duration(seconds);
    }

    /// Change the volume ceiling.
    pub fn set_max_volume(&mut self, volume: f32) {
        self.cycle.set_max_volume(volume);
    }

    /// Current period mode.
    pub fn mode(&self) -> PeriodMode {
        self.cycle.mode()
    }

    /// True while triggered.
    pub fn is_active(&self) -> bool {
        self.cycle.is_active()
    }

    /// Render the next mono sample.
    pub fn advance(&mut self) -> f32 {
        let out = self.cycle.advance();
        self.oscillator.set_frequency(out.frequency);
        self.level.set_target(out.target_volume);
        self.oscillator.advance() * self.level.advance()
    }
}

impl SampleSource for PulseVoice {
    type Command = PulseCommand;

    fn apply(&mut self, command: PulseCommand) {
        match command {
            PulseCommand::SetActive(on) => self.set_active(on),
            PulseCommand::SetBaseFrequency(hz) => self.set_base_frequency(hz),
            PulseCommand::SetWaveform(waveform) => self.set_waveform(waveform),
            PulseCommand::SetFrequencyRaiseRate(rate) => self.set_frequency_raise_rate(rate),
            PulseCommand::SetVolumeRaiseRate(rate) => self.set_volume_raise_rate(rate),
            PulseCommand::SetHoldDuration(seconds) => self.set_hold_duration(seconds),
            PulseCommand::SetMaxVolume(volume) => self.set_max_volume(volume),
        }
    }

    fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer {
            *sample = self.advance();
        }
        self.telemetry
            .publish(self.cycle.frequency(), self.level.get(), self.cycle.mode());
    }
}

/// Restartable pulse generator.
///
/// Settings changed while stopped are retained and applied at the next
/// [`start`](Self::start); while running they are also relayed to the
/// producer thread. The trigger state survives a restart: an engine stopped
/// while active resumes pulsing when started again.
pub struct PulseEngine {
    config: EngineConfig,
    settings: PulseSettings,
    active: bool,
    telemetry: Arc<PulseTelemetry>,
    pipeline: Option<Pipeline<PulseVoice>>,
}

impl PulseEngine {
    /// Create a stopped engine with [`PulseSettings::default`] tuning.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            settings: PulseSettings::default(),
            active: false,
            telemetry: Arc::new(PulseTelemetry::new()),
            pipeline: None,
        }
    }

    /// Replace the stream configuration. Fails while running.
    pub fn configure(&mut self, config: EngineConfig) -> Result<()> {
        if self.is_running() {
            return Err(Error::Config(
                "Cannot reconfigure a running engine; stop it first".into(),
            ));
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current stream configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a stream is open.
    pub fn is_running(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Open the device and start producing audio. No-op while running.
    pub fn start(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        let voice = PulseVoice::new(self.config.sample_rate as f32, &self.settings, self.active);
        self.telemetry = voice.telemetry();
        self.pipeline = Some(Pipeline::start(&self.config, voice)?);
        Ok(())
    }

    /// Tear the stream down and release the device. No-op while stopped.
    pub fn stop(&mut self) {
        if self.pipeline.take().is_some() {
            self.telemetry
                .publish(0.0, 0.0, PeriodMode::Resting);
        }
    }

    /// Trigger or release the pulse.
    pub fn set_active(&mut self, on: bool) -> Result<()> {
        self.active = on;
        self.relay(PulseCommand::SetActive(on))
    }

    /// Retune the base frequency.
    pub fn set_base_frequency(&mut self, hz: f32) -> Result<()> {
        self.settings.base_frequency = hz;
        self.relay(PulseCommand::SetBaseFrequency(hz))
    }

    /// Switch the carrier waveform shape.
    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<()> {
        self.settings.waveform = waveform;
        self.relay(PulseCommand::SetWaveform(waveform))
    }

    /// Change the frequency ramp slope, base fractions per second.
    pub fn set_frequency_raise_rate(&mut self, rate: f32) -> Result<()> {
        self.settings.frequency_raise_rate = rate;
        self.relay(PulseCommand::SetFrequencyRaiseRate(rate))
    }

    /// Change the envelope ramp slope, full scale per second.
    pub fn set_volume_raise_rate(&mut self, rate: f32) -> Result<()> {
        self.settings.volume_raise_rate = rate;
        self.relay(PulseCommand::SetVolumeRaiseRate(rate))
    }

    /// Change the plateau length in seconds.
    pub fn set_hold_duration(&mut self, seconds: f32) -> Result<()> {
        self.settings.hold_duration = seconds;
        self.relay(PulseCommand::SetHoldDuration(seconds))
    }

    /// Change the plateau length as a repetition frequency, `1/hz` seconds.
    ///
    /// Values of zero or below are ignored, matching the cycle itself.
    pub fn set_hold_rate(&mut self, hz: f32) -> Result<()> {
        if hz > 0.0 {
            self.set_hold_duration(1.0 / hz)
        } else {
            Ok(())
        }
    }

    /// Change the volume ceiling, clamped to `0..=1`.
    pub fn set_max_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.settings.max_volume = volume;
        self.relay(PulseCommand::SetMaxVolume(volume))
    }

    /// Retained settings.
    pub fn settings(&self) -> &PulseSettings {
        &self.settings
    }

    /// Whether the pulse is triggered.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Period mode at the last published buffer; `Resting` while stopped.
    pub fn mode(&self) -> PeriodMode {
        self.telemetry.mode()
    }

    /// Instantaneous frequency at the last published buffer.
    pub fn frequency(&self) -> f32 {
        self.telemetry.frequency()
    }

    /// Output level at the last published buffer.
    pub fn volume(&self) -> f32 {
        self.telemetry.volume()
    }

    /// Underruns counted since `start`, zero while stopped.
    pub fn underruns(&self) -> u64 {
        self.pipeline.as_ref().map_or(0, Pipeline::underruns)
    }

    fn relay(&self, command: PulseCommand) -> Result<()> {
        match &self.pipeline {
            Some(pipeline) => pipeline.send(command),
            None => Ok(()),
        }
    }
}
