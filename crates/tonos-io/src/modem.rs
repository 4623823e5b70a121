//! AFSK modem playback.
//!
//! [`ModemVoice`] renders framed symbols from `tonos-modem` as frequency
//! shifts on a single oscillator, pacing them with the drift-compensated
//! scheduler. [`ModemEngine`] runs the voice through the playback pipeline
//! and encodes text in the caller's thread, so a rejected character never
//! leaves half a string on the wire. [`render_message`] produces the same
//! waveform offline for WAV export.
//!
//! On start the line parks on the idle tone for one second before the
//! first symbol, giving a receiver time to lock onto the carrier.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tonos_core::{Oscillator, SmoothedLevel};
use tonos_modem::{
    DataBits, LineConfig, Parity, StopBits, Symbol, SymbolScheduler, TextEncoding, ToneSet,
};

use crate::pipeline::{EngineConfig, Pipeline, SampleSource};
use crate::{Error, Result};

/// Gain smoothing coefficient for the carrier level.
const LEVEL_ALPHA: f32 = 0.001;

/// Runtime changes a [`ModemEngine`] relays to its voice.
#[derive(Debug, Clone, PartialEq)]
pub enum ModemCommand {
    /// Append framed symbols to the transmit queue.
    Enqueue(Vec<Symbol>),
    /// Change the symbol clock. Takes effect at the next symbol boundary.
    SetBaudRate(f32),
    /// Fade the carrier to a new level.
    SetVolume(f32),
    /// Retune the tone the line parks on between transmissions.
    SetIdleTone(f32),
}

/// FSK carrier: a symbol queue, the symbol clock, and one oscillator.
///
/// The voice owns every piece of transmit state; the engine only ever
/// talks to it through [`ModemCommand`]s once it is running.
#[derive(Debug)]
pub struct ModemVoice {
    oscillator: Oscillator,
    level: SmoothedLevel,
    scheduler: SymbolScheduler,
    queue: VecDeque<Symbol>,
    idle_tone: f32,
    idle_flag: Arc<AtomicBool>,
}

impl ModemVoice {
    /// Create a voice parked on `line`'s idle tone, holding it for one
    /// second before the first queued symbol may begin.
    pub fn new(sample_rate: f32, line: &LineConfig, volume: f32) -> Self {
        let mut oscillator = Oscillator::new(sample_rate);
        oscillator.set_frequency(line.tones.idle);
        let mut level = SmoothedLevel::new(0.0, LEVEL_ALPHA);
        level.set_target(volume);
        let mut scheduler = SymbolScheduler::new(sample_rate, line.baud_rate);
        scheduler.hold(sample_rate as u32);
        Self {
            oscillator,
            level,
            scheduler,
            queue: VecDeque::new(),
            idle_tone: line.tones.idle,
            // The preamble counts as transmission.
            idle_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for reading the transmitter-idle flag after the voice moves
    /// into a pipeline. Updated once per [`fill`](SampleSource::fill).
    pub fn idle_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.idle_flag)
    }

    /// Append symbols to the transmit queue.
    pub fn enqueue(&mut self, symbols: Vec<Symbol>) {
        self.queue.extend(symbols);
        self.idle_flag.store(false, Ordering::Relaxed);
    }

    /// Change the symbol clock. Applies from the next symbol boundary.
    pub fn set_baud_rate(&mut self, baud_rate: f32) {
        self.scheduler.set_baud_rate(baud_rate);
    }

    /// Fade the carrier toward `volume`.
    pub fn set_volume(&mut self, volume: f32) {
        self.level.set_target(volume);
    }

    /// Retune the parked-line tone.
    pub fn set_idle_tone(&mut self, hz: f32) {
        self.idle_tone = hz;
    }

    /// True once the queue is drained and the final symbol has fully
    /// sounded. False during the start-up preamble.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && !self.scheduler.is_waiting()
    }

    /// Render the next mono sample.
    pub fn advance(&mut self) -> f32 {
        if let Some(hz) = self.scheduler.advance(&mut self.queue, self.idle_tone) {
            self.oscillator.set_frequency(hz);
        }
        self.oscillator.advance() * self.level.advance()
    }
}

impl SampleSource for ModemVoice {
    type Command = ModemCommand;

    fn apply(&mut self, command: ModemCommand) {
        match command {
            ModemCommand::Enqueue(symbols) => self.enqueue(symbols),
            ModemCommand::SetBaudRate(baud_rate) => self.set_baud_rate(baud_rate),
            ModemCommand::SetVolume(volume) => self.set_volume(volume),
            ModemCommand::SetIdleTone(hz) => self.set_idle_tone(hz),
        }
    }

    fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer {
            *sample = self.advance();
        }
        self.idle_flag.store(self.is_idle(), Ordering::Relaxed);
    }
}

/// Restartable AFSK transmitter.
///
/// Line parameters changed while stopped are retained and applied at the
/// next [`start`](Self::start). While running, [`write`](Self::write)
/// encodes with the current line settings in the caller's thread and hands
/// the finished symbols to the producer, so each call transmits entirely
/// or not at all.
pub struct ModemEngine {
    config: EngineConfig,
    line: LineConfig,
    volume: f32,
    idle: Arc<AtomicBool>,
    pipeline: Option<Pipeline<ModemVoice>>,
}

impl ModemEngine {
    /// Create a stopped engine on the stock V.23 line.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            line: LineConfig::default(),
            volume: 0.8,
            idle: Arc::new(AtomicBool::new(true)),
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

    /// Open the device and park the line on the idle tone. No-op while
    /// running.
    pub fn start(&mut self) -> Result<()> {
        if self.pipeline.is_some() {
            return Ok(());
        }
        let voice = ModemVoice::new(self.config.sample_rate as f32, &self.line, self.volume);
        self.idle = voice.idle_handle();
        self.pipeline = Some(Pipeline::start(&self.config, voice)?);
        Ok(())
    }

    /// Tear the stream down and release the device. No-op while stopped.
    /// Queued symbols that have not sounded yet are dropped.
    pub fn stop(&mut self) {
        self.pipeline = None;
    }

    /// Frame `text` with the current line settings and queue it for
    /// transmission.
    ///
    /// Encoding runs before anything is queued: a character the encoding
    /// rejects fails the whole call and nothing reaches the wire.
    pub fn write(&self, text: &str) -> Result<()> {
        let symbols = self.line.encode_str(text)?;
        let Some(pipeline) = &self.pipeline else {
            return Err(Error::Stream("Modem engine is not running".into()));
        };
        tracing::debug!(
            characters = text.chars().count(),
            symbols = symbols.len(),
            "queued text"
        );
        self.idle.store(false, Ordering::Relaxed);
        pipeline.send(ModemCommand::Enqueue(symbols))
    }

    /// Change the symbol clock, validating before anything is touched.
    pub fn set_baud_rate(&mut self, baud_rate: f32) -> Result<()> {
        let mut line = self.line;
        line.baud_rate = baud_rate;
        line.validate()?;
        self.line = line;
        self.relay(ModemCommand::SetBaudRate(baud_rate))
    }

    /// Select the text encoding applied to future [`write`](Self::write)s.
    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.line.encoding = encoding;
    }

    /// Select the number of data bits in future frames.
    pub fn set_data_bits(&mut self, data_bits: DataBits) {
        self.line.format.data_bits = data_bits;
    }

    /// Select the parity policy of future frames.
    pub fn set_parity(&mut self, parity: Parity) {
        self.line.format.parity = parity;
    }

    /// Select the stop-bit length of future frames.
    pub fn set_stop_bits(&mut self, stop_bits: StopBits) {
        self.line.format.stop_bits = stop_bits;
    }

    /// Replace the mark/space/idle tone trio. Symbols already queued keep
    /// the tones they were framed with.
    pub fn set_tones(&mut self, tones: ToneSet) -> Result<()> {
        self.line.tones = tones;
        self.relay(ModemCommand::SetIdleTone(tones.idle))
    }

    /// Fade the carrier to `volume`, clamped to `0..=1`.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        self.relay(ModemCommand::SetVolume(volume))
    }

    /// Current line settings.
    pub fn line(&self) -> &LineConfig {
        &self.line
    }

    /// Current carrier volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// True when nothing is queued and the last symbol has fully sounded.
    /// A stopped engine is always idle.
    pub fn is_idle(&self) -> bool {
        match &self.pipeline {
            Some(_) => self.idle.load(Ordering::Relaxed),
            None => true,
        }
    }

    /// Render `text` offline with the current line settings and volume.
    pub fn render(&self, text: &str) -> Result<Vec<f32>> {
        render_message(&self.line, self.config.sample_rate, self.volume, text)
    }

    /// Underruns counted since `start`, zero while stopped.
    pub fn underruns(&self) -> u64 {
        self.pipeline.as_ref().map_or(0, Pipeline::underruns)
    }

    fn relay(&self, command: ModemCommand) -> Result<()> {
        match &self.pipeline {
            Some(pipeline) => pipeline.send(command),
            None => Ok(()),
        }
    }
}

/// Render a complete transmission offline: one second of idle-tone
/// preamble, the framed `text`, and a quarter second of idle tail fading
/// to silence.
///
/// The sample count is deterministic for a given line and sample rate, so
/// repeated renders of the same message are byte-identical.
pub fn render_message(
    line: &LineConfig,
    sample_rate: u32,
    volume: f32,
    text: &str,
) -> Result<Vec<f32>> {
    if sample_rate == 0 {
        return Err(Error::Config("Render sample rate must be nonzero".into()));
    }
    line.validate()?;
    let symbols = line.encode_str(text)?;

    let data_bits: f64 = symbols.iter().map(|s| f64::from(s.duration_bits)).sum();
    let data_samples = (data_bits * f64::from(sample_rate) / f64::from(line.baud_rate)).ceil();
    let tail = (sample_rate / 4) as usize;
    let mut samples =
        Vec::with_capacity(sample_rate as usize + data_samples as usize + tail + 8);

    let mut voice = ModemVoice::new(sample_rate as f32, line, volume);
    voice.enqueue(symbols);
    loop {
        samples.push(voice.advance());
        if voice.is_idle() {
            break;
        }
    }
    voice.set_volume(0.0);
    for _ in 0..tail {
        samples.push(voice.advance());
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_parks_on_the_idle_tone() {
        let line = LineConfig::default();
        let mut voice = ModemVoice::new(44_100.0, &line, 0.8);
        assert!(!voice.is_idle(), "preamble counts as transmission");
        for _ in 0..1_000 {
            voice.advance();
        }
        assert_eq!(voice.oscillator.frequency(), line.tones.idle);
    }

    #[test]
    fn idle_flag_follows_the_queue_through_fill() {
        let line = LineConfig::default();
        let mut voice = ModemVoice::new(44_100.0, &line, 0.8);
        let idle = voice.idle_handle();
        voice.enqueue(line.encode_str("A").unwrap());

        // Preamble plus one 10-bit frame is 44 468 samples; 44 buffers
        // fall short of it and 45 run past it.
        let mut buffer = vec![0.0; 1_000];
        for _ in 0..44 {
            voice.fill(&mut buffer);
        }
        assert!(!idle.load(Ordering::Relaxed));
        voice.fill(&mut buffer);
        assert!(idle.load(Ordering::Relaxed));
    }

    #[test]
    fn render_length_is_deterministic() {
        // Preamble 44 100 + 'A' framed as 10 bits at 36.75 samples per
        // bit (368 after drift rounding) + 11 025 tail.
        let samples = render_message(&LineConfig::default(), 44_100, 0.8, "A").unwrap();
        assert_eq!(samples.len(), 44_100 + 368 + 11_025);

        let again = render_message(&LineConfig::default(), 44_100, 0.8, "A").unwrap();
        assert_eq!(samples, again);
    }

    #[test]
    fn render_of_empty_text_is_preamble_and_tail() {
        let samples = render_message(&LineConfig::default(), 44_100, 0.8, "").unwrap();
        assert_eq!(samples.len(), 44_100 + 11_025);
    }

    #[test]
    fn render_tail_fades_to_silence() {
        let samples = render_message(&LineConfig::default(), 44_100, 0.8, "").unwrap();
        let last = samples.last().copied().unwrap();
        assert!(last.abs() < 1e-4, "tail still audible: {last}");
        let peak: f32 = samples.iter().fold(0.0, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.7, "preamble never reached volume: {peak}");
    }

    #[test]
    fn render_rejects_unencodable_text() {
        let err = render_message(&LineConfig::default(), 44_100, 0.8, "é").unwrap_err();
        assert!(matches!(err, Error::Modem(_)), "unexpected error: {err}");
    }

    #[test]
    fn stopped_engine_is_idle_and_rejects_writes() {
        let engine = ModemEngine::new(EngineConfig::default());
        assert!(engine.is_idle());
        assert!(!engine.is_running());
        let err = engine.write("hello").unwrap_err();
        assert!(matches!(err, Error::Stream(_)), "unexpected error: {err}");
    }

    #[test]
    fn bad_baud_rate_leaves_the_line_untouched() {
        let mut engine = ModemEngine::new(EngineConfig::default());
        assert!(engine.set_baud_rate(0.0).is_err());
        assert_eq!(engine.line().baud_rate, 1200.0);
        engine.set_baud_rate(300.0).unwrap();
        assert_eq!(engine.line().baud_rate, 300.0);
    }

    #[test]
    fn line_setters_shape_future_frames() {
        let mut engine = ModemEngine::new(EngineConfig::default());
        engine.set_encoding(TextEncoding::Latin1);
        engine.set_data_bits(DataBits::Eight);
        engine.set_parity(Parity::None);
        engine.set_stop_bits(StopBits::Two);
        let line = engine.line();
        assert_eq!(line.encoding, TextEncoding::Latin1);
        assert_eq!(line.format.data_bits, DataBits::Eight);
        assert_eq!(line.format.parity, Parity::None);
        assert_eq!(line.format.stop_bits, StopBits::Two);
    }
}
