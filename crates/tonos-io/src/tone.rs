//! Continuous tone playback.
//!
//! [`ToneVoice`] is the sample source: one oscillator behind a smoothed
//! gain. [`ToneEngine`] wraps it in the playback pipeline and keeps the
//! tuning parameters across runs, so a stopped engine can be reconfigured
//! and started again without rebuilding it.

use tonos_core::{Oscillator, SmoothedLevel, Waveform};

use crate::pipeline::{EngineConfig, Pipeline, SampleSource};
use crate::{Error, Result};

/// Gain smoothing coefficient for fades and volume changes.
const LEVEL_ALPHA: f32 = 0.001;

/// Runtime changes a [`ToneEngine`] relays to its voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneCommand {
    /// Retune the oscillator, phase-continuous.
    SetFrequency(f32),
    /// Switch the waveform shape.
    SetWaveform(Waveform),
    /// Fade to a new output level.
    SetVolume(f32),
}

/// Oscillator plus smoothed gain, rendered one mono sample at a time.
///
/// The voice starts silent and fades in toward its volume, so opening a
/// stream never steps the speaker.
#[derive(Debug, Clone)]
pub struct ToneVoice {
    oscillator: Oscillator,
    level: SmoothedLevel,
}

impl ToneVoice {
    /// Create a voice at `frequency` that fades in toward `volume`.
    pub fn new(sample_rate: f32, frequency: f32, waveform: Waveform, volume: f32) -> Self {
        let mut oscillator = Oscillator::new(sample_rate);
        oscillator.set_frequency(frequency);
        oscillator.set_waveform(waveform);
        let mut level = SmoothedLevel::new(0.0, LEVEL_ALPHA);
        level.set_target(volume);
        Self { oscillator, level }
    }

    /// Retune without disturbing the phase.
    pub fn set_frequency(&mut self, hz: f32) {
        self.oscillator.set_frequency(hz);
    }

    /// Switch the waveform shape mid-stream.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.oscillator.set_waveform(waveform);
    }

    /// Fade toward `volume`.
    pub fn set_volume(&mut self, volume: f32) {
        self.level.set_target(volume);
    }

    /// Render the next mono sample.
    pub fn advance(&mut self) -> f32 {
        self.oscillator.advance() * self.level.advance()
    }
}

impl SampleSource for ToneVoice {
    type Command = ToneCommand;

    fn apply(&mut self, command: ToneCommand) {
        match command {
            ToneCommand::SetFrequency(hz) => self.set_frequency(hz),
            ToneCommand::SetWaveform(waveform) => self.set_waveform(waveform),
            ToneCommand::SetVolume(volume) => self.set_volume(volume),
        }
    }

    fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer {
            *sample = self.advance();
        }
    }
}

/// Restartable tone generator.
///
/// Parameters set while stopped are retained and applied at the next
/// [`start`](Self::start); while running they are also relayed to the
/// producer thread. `start` on a running engine and [`stop`](Self::stop)
/// on a stopped one are no-ops.
pub struct ToneEngine {
    config: EngineConfig,
    frequency: f32,
    waveform: Waveform,
    volume: f32,
    pipeline: Option<Pipeline<ToneVoice>>,
}

impl ToneEngine {
    /// Create a stopped engine with stock tuning (440 Hz sine at 0.8).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            frequency: 440.0,
            waveform: Waveform::Sine,
            volume: 0.8,
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
        let voice = ToneVoice::new(
            self.config.sample_rate as f32,
            self.frequency,
            self.waveform,
            self.volume,
        );
        self.pipeline = Some(Pipeline::start(&self.config, voice)?);
        Ok(())
    }

    /// Tear the stream down and release the device. No-op while stopped.
    pub fn stop(&mut self) {
        self.pipeline = None;
    }

    /// Retune the tone.
    pub fn set_frequency(&mut self, hz: f32) -> Result<()> {
        self.frequency = hz;
        self.relay(ToneCommand::SetFrequency(hz))
    }

    /// Switch the waveform shape.
    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<()> {
        self.waveform = waveform;
        self.relay(ToneCommand::SetWaveform(waveform))
    }

    /// Fade to `volume`, clamped to `0..=1`.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        self.relay(ToneCommand::SetVolume(volume))
    }

    /// Current tuning frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current waveform shape.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current output volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Underruns counted since `start`, zero while stopped.
    pub fn underruns(&self) -> u64 {
        self.pipeline.as_ref().map_or(0, Pipeline::underruns)
    }

    fn relay(&self, command: ToneCommand) -> Result<()> {
        match &self.pipeline {
            Some(pipeline) => pipeline.send(command),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_fades_in_from_silence() {
        let mut voice = ToneVoice::new(44_100.0, 440.0, Waveform::Sine, 0.8);
        let first = voice.advance();
        assert!(first.abs() < 1e-3, "first sample should be near-silent: {first}");
        let mut peak = 0.0f32;
        for _ in 0..44_100 {
            peak = peak.max(voice.advance().abs());
        }
        assert!(peak > 0.7, "voice never reached its volume: {peak}");
    }

    #[test]
    fn commands_reach_the_voice_through_apply() {
        let mut voice = ToneVoice::new(44_100.0, 440.0, Waveform::Sine, 1.0);
        voice.apply(ToneCommand::SetFrequency(880.0));
        voice.apply(ToneCommand::SetWaveform(Waveform::Square));
        voice.apply(ToneCommand::SetVolume(0.0));
        for _ in 0..44_100 {
            voice.advance();
        }
        let sample = voice.advance();
        assert!(sample.abs() < 1e-6, "muted voice still audible: {sample}");
    }

    #[test]
    fn stopped_engine_retains_parameters() {
        let mut engine = ToneEngine::new(EngineConfig::default());
        engine.set_frequency(1234.5).unwrap();
        engine.set_waveform(Waveform::Triangle).unwrap();
        engine.set_volume(2.0).unwrap();
        assert_eq!(engine.frequency(), 1234.5);
        assert_eq!(engine.waveform(), Waveform::Triangle);
        assert_eq!(engine.volume(), 1.0, "volume must clamp to 1.0");
        assert!(!engine.is_running());
        assert_eq!(engine.underruns(), 0);
    }

    #[test]
    fn configure_swaps_the_config_while_stopped() {
        let mut engine = ToneEngine::new(EngineConfig::default());
        let next = EngineConfig {
            sample_rate: 48_000,
            ..EngineConfig::default()
        };
        engine.configure(next).unwrap();
        assert_eq!(engine.config().sample_rate, 48_000);

        let bad = EngineConfig {
            buffer_count: 0,
            ..EngineConfig::default()
        };
        assert!(engine.configure(bad).is_err());
        assert_eq!(engine.config().sample_rate, 48_000, "failed configure must not clobber");
    }
}
