//! Audio output for the tonos generators.
//!
//! This crate provides:
//!
//! - **Buffered playback**: [`Pipeline`] renders audio on a producer thread
//!   through a fixed pool of rotating buffers and feeds the device callback
//!   without allocating or blocking on the audio thread
//! - **Voices**: [`ToneVoice`], [`PulseVoice`] and [`ModemVoice`] produce the
//!   three generator signals one sample at a time
//! - **Engines**: [`ToneEngine`], [`PulseEngine`] and [`ModemEngine`] pair a
//!   voice with a pipeline and accept parameter changes from other threads
//! - **WAV rendering**: [`render_message`] plus [`write_wav`] turn text into
//!   a transmission on disk instead of a live stream
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tonos_io::{EngineConfig, ToneEngine};
//!
//! let mut engine = ToneEngine::new(EngineConfig::default());
//! engine.set_frequency(523.25)?;
//! engine.start()?;
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! engine.set_frequency(880.0)?;
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! engine.stop();
//! ```

mod modem;
mod pipeline;
mod pulse;
mod stream;
mod tone;
mod wav;

pub use modem::{ModemCommand, ModemEngine, ModemVoice, render_message};
pub use pipeline::{EngineConfig, Pipeline, Playback, SampleSource, run_producer};
pub use pulse::{PulseCommand, PulseEngine, PulseSettings, PulseTelemetry, PulseVoice};
pub use stream::{OutputDevice, default_output_device, list_output_devices};
pub use tone::{ToneCommand, ToneEngine, ToneVoice};
pub use wav::{read_wav, write_wav};

/// Error types for audio output operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No audio output device available on the system.
    #[error("No audio output device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// Rejected engine configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Text encoding or line framing error.
    #[error("Modem error: {0}")]
    Modem(#[from] tonos_modem::Error),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio output operations.
pub type Result<T> = std::result::Result<T, Error>;
