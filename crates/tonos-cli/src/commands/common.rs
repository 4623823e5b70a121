//! Shared CLI helpers used across multiple commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use tonos_core::Waveform;
use tonos_modem::{DataBits, LineConfig, StopBits};

use crate::preset::LinePreset;

/// Poll interval for the foreground wait loops.
pub const TICK: Duration = Duration::from_millis(20);

/// How long a faded-out line keeps playing before its stream closes, so
/// the level reaches silence instead of clicking off mid-sample.
pub const FADE_OUT: Duration = Duration::from_millis(500);

/// Install a Ctrl+C handler and return the flag it clears.
pub fn interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let handle = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handle.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}

/// Sleep in short ticks until interrupted or past the optional limit.
pub fn wait_while_running(running: &AtomicBool, limit: Option<Duration>) {
    let started = Instant::now();
    while running.load(Ordering::SeqCst) {
        if let Some(limit) = limit
            && started.elapsed() >= limit
        {
            break;
        }
        thread::sleep(TICK);
    }
}

/// Validate an optional `--duration` argument.
pub fn optional_duration(seconds: Option<f32>) -> anyhow::Result<Option<Duration>> {
    match seconds {
        Some(seconds) if !seconds.is_finite() || seconds < 0.0 => {
            anyhow::bail!("Duration must be a non-negative number of seconds")
        }
        Some(seconds) => Ok(Some(Duration::from_secs_f32(seconds))),
        None => Ok(None),
    }
}

/// Parse a waveform name at the CLI boundary.
pub fn parse_waveform(name: &str) -> anyhow::Result<Waveform> {
    match name.to_ascii_lowercase().as_str() {
        "sine" | "sin" => Ok(Waveform::Sine),
        "sine2" | "sin2" => Ok(Waveform::SineSquaredAlternating),
        "sine3" | "sin3" => Ok(Waveform::SineCubed),
        "triangle" | "tri" => Ok(Waveform::Triangle),
        "square" => Ok(Waveform::Square),
        other => anyhow::bail!(
            "Unknown waveform '{other}' (expected sine, sine2, sine3, triangle or square)"
        ),
    }
}

/// Serial line flags shared by `send` and `render`.
///
/// Every flag is optional: values come from the preset file when one is
/// given, and from the stock V.23 line otherwise. An explicit flag always
/// wins over the preset.
#[derive(Args)]
pub struct LineArgs {
    /// Baud rate [default: 1200; V.23 service uses 75, 300, 600 or 1200]
    #[arg(long)]
    pub baud: Option<f32>,

    /// Text encoding: ascii, latin1, utf8, utf16le, utf16be, utf32le or utf32be [default: ascii]
    #[arg(long)]
    pub encoding: Option<String>,

    /// Data bits per frame, 7 or 8 [default: 7, or 8 when the encoding emits bytes above 0x7F]
    #[arg(long)]
    pub bits: Option<u8>,

    /// Parity: none, odd or even [default: even]
    #[arg(long)]
    pub parity: Option<String>,

    /// Stop bits: 1, 1.5 or 2 [default: 1]
    #[arg(long)]
    pub stop: Option<f32>,

    /// Mark (bit 1) tone in Hz [default: 1300]
    #[arg(long)]
    pub mark: Option<f32>,

    /// Space (bit 0) tone in Hz [default: 2100]
    #[arg(long)]
    pub space: Option<f32>,

    /// Idle line tone in Hz [default: 1500]
    #[arg(long)]
    pub idle: Option<f32>,

    /// TOML preset file providing any of the line settings
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,
}

impl LineArgs {
    /// Merge preset and flags into a validated line configuration.
    pub fn resolve(&self) -> anyhow::Result<LineConfig> {
        let preset = match &self.preset {
            Some(path) => LinePreset::load(path)?,
            None => LinePreset::default(),
        };
        let mut line = LineConfig::default();

        if let Some(baud) = self.baud.or(preset.baud) {
            line.baud_rate = baud;
        }
        if let Some(name) = self.encoding.as_deref().or(preset.encoding.as_deref()) {
            line.encoding = name.parse()?;
        }
        if let Some(name) = self.parity.as_deref().or(preset.parity.as_deref()) {
            line.format.parity = name.parse()?;
        }
        if let Some(stop) = self.stop.or(preset.stop) {
            line.format.stop_bits = StopBits::try_from(stop)?;
        }
        line.format.data_bits = match self.bits.or(preset.bits) {
            Some(bits) => DataBits::try_from(bits)?,
            None if line.encoding.needs_eight_data_bits() => DataBits::Eight,
            None => line.format.data_bits,
        };
        if let Some(mark) = self.mark.or(preset.mark) {
            line.tones.mark = mark;
        }
        if let Some(space) = self.space.or(preset.space) {
            line.tones.space = space;
        }
        if let Some(idle) = self.idle.or(preset.idle) {
            line.tones.idle = idle;
        }
        line.validate()?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tonos_modem::{Parity, TextEncoding};

    fn bare_args() -> LineArgs {
        LineArgs {
            baud: None,
            encoding: None,
            bits: None,
            parity: None,
            stop: None,
            mark: None,
            space: None,
            idle: None,
            preset: None,
        }
    }

    #[test]
    fn stock_line_when_nothing_is_given() {
        let line = bare_args().resolve().unwrap();
        assert_eq!(line.baud_rate, 1200.0);
        assert_eq!(line.encoding, TextEncoding::Ascii);
        assert_eq!(line.format.data_bits, DataBits::Seven);
        assert_eq!(line.format.parity, Parity::Even);
        assert_eq!(line.tones.mark, 1300.0);
    }

    #[test]
    fn wide_encodings_default_to_eight_data_bits() {
        let mut args = bare_args();
        args.encoding = Some("utf8".into());
        let line = args.resolve().unwrap();
        assert_eq!(line.format.data_bits, DataBits::Eight);
    }

    #[test]
    fn explicit_bits_beat_the_encoding_default() {
        let mut args = bare_args();
        args.encoding = Some("utf8".into());
        args.bits = Some(7);
        let line = args.resolve().unwrap();
        assert_eq!(line.format.data_bits, DataBits::Seven);
    }

    #[test]
    fn flags_override_preset_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "baud = 300\nencoding = \"latin1\"\n").unwrap();

        let mut args = bare_args();
        args.preset = Some(file.path().to_path_buf());
        args.baud = Some(75.0);
        let line = args.resolve().unwrap();

        assert_eq!(line.baud_rate, 75.0, "flag must beat the preset");
        assert_eq!(line.encoding, TextEncoding::Latin1, "preset fills the gaps");
        assert_eq!(line.format.data_bits, DataBits::Eight);
    }

    #[test]
    fn bad_names_are_rejected() {
        let mut args = bare_args();
        args.parity = Some("sometimes".into());
        assert!(args.resolve().is_err());

        let mut args = bare_args();
        args.encoding = Some("ebcdic".into());
        assert!(args.resolve().is_err());

        let mut args = bare_args();
        args.stop = Some(3.0);
        assert!(args.resolve().is_err());

        let mut args = bare_args();
        args.baud = Some(0.0);
        assert!(args.resolve().is_err());
    }

    #[test]
    fn waveform_names_parse_case_insensitively() {
        assert_eq!(parse_waveform("SINE").unwrap(), Waveform::Sine);
        assert_eq!(parse_waveform("sine2").unwrap(), Waveform::SineSquaredAlternating);
        assert_eq!(parse_waveform("tri").unwrap(), Waveform::Triangle);
        assert!(parse_waveform("noise").is_err());
    }

    #[test]
    fn negative_durations_are_rejected() {
        assert!(optional_duration(Some(-1.0)).is_err());
        assert!(optional_duration(Some(f32::NAN)).is_err());
        assert_eq!(optional_duration(None).unwrap(), None);
        assert_eq!(
            optional_duration(Some(1.5)).unwrap(),
            Some(Duration::from_millis(1500))
        );
    }
}
