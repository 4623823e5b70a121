//! Asynchronous serial framing and symbol timing for AFSK transmission.
//!
//! This crate turns text into a stream of frequency/duration pairs ready to
//! drive an oscillator, following the classic asynchronous serial line
//! discipline: one space start bit, LSB-first data bits, an optional parity
//! bit and a mark stop period. The defaults mirror ITU-T V.23 mode 2 as used
//! by Minitel terminals (1300 Hz mark, 2100 Hz space, 1200 baud, 7E1).
//!
//! [`LineConfig`] describes the line, [`FrameFormat`] frames individual
//! bytes, and [`SymbolScheduler`] paces the resulting [`Symbol`]s against a
//! fixed sample rate without accumulating drift.
//!
//! ```
//! use tonos_modem::{LineConfig, SymbolScheduler};
//! use std::collections::VecDeque;
//!
//! let line = LineConfig::default();
//! let mut queue: VecDeque<_> = line.encode_str("A")?.into();
//!
//! // 1 start + 7 data + 1 parity + 1 stop symbol.
//! assert_eq!(queue.len(), 10);
//!
//! let mut scheduler = SymbolScheduler::new(44_100.0, line.baud_rate);
//! let first = scheduler.advance(&mut queue, line.tones.idle);
//! assert_eq!(first, Some(line.tones.space));
//! # Ok::<(), tonos_modem::Error>(())
//! ```

pub mod encoding;
pub mod framing;
pub mod line;
pub mod scheduler;

pub use encoding::TextEncoding;
pub use framing::{DataBits, FrameFormat, Parity, StopBits, Symbol, ToneSet};
pub use line::LineConfig;
pub use scheduler::SymbolScheduler;

/// Errors produced while describing or encoding a transmission.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A character has no representation in the selected encoding.
    #[error("character {character:?} is not representable in {encoding}")]
    Unencodable {
        /// The offending character.
        character: char,
        /// The encoding that rejected it.
        encoding: TextEncoding,
    },

    /// An encoding name was not recognized.
    #[error("unknown text encoding {0:?}")]
    UnknownEncoding(String),

    /// A parity name was not recognized.
    #[error("unknown parity {0:?} (expected none, odd or even)")]
    UnknownParity(String),

    /// A data bit count outside the supported range.
    #[error("unsupported data bit count {0} (expected 7 or 8)")]
    InvalidDataBits(u8),

    /// A stop bit duration outside the supported set.
    #[error("unsupported stop bit duration {0} (expected 1, 1.5 or 2)")]
    InvalidStopBits(f32),

    /// A baud rate that is zero, negative or not finite.
    #[error("baud rate must be positive and finite, got {0}")]
    InvalidBaudRate(f32),
}

/// Convenience result type for modem operations.
pub type Result<T> = std::result::Result<T, Error>;
