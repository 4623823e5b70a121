//! Complete description of one transmit line.

use crate::framing::{FrameFormat, Symbol, ToneSet};
use crate::{Error, Result, TextEncoding};

/// Everything needed to turn text into line symbols.
///
/// The default is the Minitel uplink: 1200 baud, ASCII, 7E1 framing on
/// V.23 tones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineConfig {
    /// Symbol rate in bits per second.
    pub baud_rate: f32,
    /// Text-to-byte encoding.
    pub encoding: TextEncoding,
    /// Per-byte frame structure.
    pub format: FrameFormat,
    /// Mark, space and idle frequencies.
    pub tones: ToneSet,
}

impl Default for LineConfig {
    fn default() -> Self {
        LineConfig {
            baud_rate: 1200.0,
            encoding: TextEncoding::Ascii,
            format: FrameFormat::default(),
            tones: ToneSet::V23,
        }
    }
}

impl LineConfig {
    /// Standard baud rates offered by the original V.23 service.
    pub const BAUD_RATES: [f32; 4] = [75.0, 300.0, 600.0, 1200.0];

    /// Checks the parts that plain struct updates cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if !self.baud_rate.is_finite() || self.baud_rate <= 0.0 {
            return Err(Error::InvalidBaudRate(self.baud_rate));
        }
        Ok(())
    }

    /// Encodes and frames `text` into a fresh symbol buffer.
    ///
    /// Fails without output if any character cannot be encoded, so either
    /// the whole string goes to line or none of it does. Frequencies are
    /// baked into the symbols here; later tone changes only affect
    /// subsequent calls.
    pub fn encode_str(&self, text: &str) -> Result<Vec<Symbol>> {
        let bytes = self.encoding.encode_str(text)?;
        let mut symbols = Vec::with_capacity(bytes.len() * self.format.symbols_per_byte());
        for byte in &bytes {
            self.format.encode_byte(*byte, &self.tones, &mut symbols);
        }
        Ok(symbols)
    }

    /// Seconds of line time one framed byte occupies.
    pub fn seconds_per_byte(&self) -> f32 {
        self.format.bits_per_byte() / self.baud_rate
    }
}
