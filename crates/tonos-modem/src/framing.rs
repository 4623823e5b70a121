//! Asynchronous serial framing.
//!
//! Each byte goes to line as a start bit (space), its data bits LSB first,
//! an optional parity bit and a stop period held at mark. Fractional stop
//! durations (1.5 bits) are carried on a single symbol rather than split,
//! so the scheduler can time them exactly.

use core::fmt;
use core::str::FromStr;

use crate::{Error, Result};

/// Number of data bits per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataBits {
    /// Seven data bits, the V.23/Minitel default.
    #[default]
    Seven,
    /// Eight data bits, required for encodings that emit high bytes.
    Eight,
}

impl DataBits {
    /// The bit count as a number.
    pub fn count(self) -> u32 {
        match self {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(Error::InvalidDataBits(other)),
        }
    }
}

/// Parity bit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// No parity bit is sent.
    None,
    /// Parity bit makes the total count of one bits odd.
    Odd,
    /// Parity bit makes the total count of one bits even.
    #[default]
    Even,
}

impl Parity {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Parity::None => "none",
            Parity::Odd => "odd",
            Parity::Even => "even",
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "none" => Ok(Parity::None),
            "o" | "odd" => Ok(Parity::Odd),
            "e" | "even" => Ok(Parity::Even),
            _ => Err(Error::UnknownParity(s.to_string())),
        }
    }
}

/// Duration of the stop period, in bit times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    /// One stop bit.
    #[default]
    One,
    /// One and a half stop bits.
    OneAndHalf,
    /// Two stop bits.
    Two,
}

impl StopBits {
    /// Duration in bit times.
    pub fn duration_bits(self) -> f32 {
        match self {
            StopBits::One => 1.0,
            StopBits::OneAndHalf => 1.5,
            StopBits::Two => 2.0,
        }
    }
}

impl TryFrom<f32> for StopBits {
    type Error = Error;

    fn try_from(bits: f32) -> Result<Self> {
        if bits == 1.0 {
            Ok(StopBits::One)
        } else if bits == 1.5 {
            Ok(StopBits::OneAndHalf)
        } else if bits == 2.0 {
            Ok(StopBits::Two)
        } else {
            Err(Error::InvalidStopBits(bits))
        }
    }
}

/// The three tone frequencies of a frequency-shift keyed line, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSet {
    /// Frequency of a one bit.
    pub mark: f32,
    /// Frequency of a zero bit.
    pub space: f32,
    /// Frequency held between transmissions.
    pub idle: f32,
}

impl ToneSet {
    /// ITU-T V.23 mode 2 tones, as used by Minitel terminals.
    ///
    /// The idle tone sits between mark and space so a receiver squelch
    /// opens without decoding bits.
    pub const V23: ToneSet = ToneSet {
        mark: 1300.0,
        space: 2100.0,
        idle: 1500.0,
    };

    /// The tone carrying `bit`.
    pub fn for_bit(&self, bit: bool) -> f32 {
        if bit { self.mark } else { self.space }
    }
}

impl Default for ToneSet {
    fn default() -> Self {
        ToneSet::V23
    }
}

/// One transmission symbol: a tone held for a duration in bit times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    /// Tone frequency in Hz.
    pub frequency: f32,
    /// Duration in bit times at the line's baud rate.
    pub duration_bits: f32,
}

/// Frame structure applied to every transmitted byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFormat {
    /// Data bits per frame.
    pub data_bits: DataBits,
    /// Parity policy.
    pub parity: Parity,
    /// Stop period duration.
    pub stop_bits: StopBits,
}

impl FrameFormat {
    /// Symbols emitted per framed byte.
    ///
    /// The stop period is one symbol regardless of its duration.
    pub fn symbols_per_byte(&self) -> usize {
        let parity = usize::from(self.parity != Parity::None);
        1 + self.data_bits.count() as usize + parity + 1
    }

    /// Total frame duration in bit times.
    pub fn bits_per_byte(&self) -> f32 {
        let parity = if self.parity == Parity::None { 0.0 } else { 1.0 };
        1.0 + self.data_bits.count() as f32 + parity + self.stop_bits.duration_bits()
    }

    /// Frames `byte` into symbols, appended to `out`.
    pub fn encode_byte(&self, byte: u8, tones: &ToneSet, out: &mut Vec<Symbol>) {
        out.push(Symbol {
            frequency: tones.space,
            duration_bits: 1.0,
        });

        // Tracks whether a mark parity bit is needed. Starting from `true`
        // for odd parity folds both policies into one toggle chain.
        let mut parity_state = self.parity == Parity::Odd;
        for bit_index in 0..self.data_bits.count() {
            let bit = byte & (1 << bit_index) != 0;
            if bit {
                parity_state = !parity_state;
            }
            out.push(Symbol {
                frequency: tones.for_bit(bit),
                duration_bits: 1.0,
            });
        }

        if self.parity != Parity::None {
            out.push(Symbol {
                frequency: tones.for_bit(parity_state),
                duration_bits: 1.0,
            });
        }

        out.push(Symbol {
            frequency: tones.mark,
            duration_bits: self.stop_bits.duration_bits(),
        });
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        write!(
            f,
            "{}{}{}",
            self.data_bits.count(),
            parity,
            self.stop_bits.duration_bits()
        )
    }
}
