//! Text-to-byte encodings for the transmit path.
//!
//! Only encodings that a receiving terminal can plausibly decode are
//! offered. ASCII and Latin-1 reject characters outside their range instead
//! of substituting, so callers can report exactly which character failed.

use core::fmt;
use core::str::FromStr;

use crate::{Error, Result};

/// Byte encoding applied to text before framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// 7-bit ASCII. Rejects code points above U+007F.
    #[default]
    Ascii,
    /// ISO 8859-1. Rejects code points above U+00FF.
    Latin1,
    /// UTF-8, one to four bytes per character.
    Utf8,
    /// UTF-16, little-endian byte order.
    Utf16Le,
    /// UTF-16, big-endian byte order.
    Utf16Be,
    /// UTF-32, little-endian byte order.
    Utf32Le,
    /// UTF-32, big-endian byte order.
    Utf32Be,
}

impl TextEncoding {
    /// Every supported encoding, in display order.
    pub const ALL: [TextEncoding; 7] = [
        TextEncoding::Ascii,
        TextEncoding::Latin1,
        TextEncoding::Utf8,
        TextEncoding::Utf16Le,
        TextEncoding::Utf16Be,
        TextEncoding::Utf32Le,
        TextEncoding::Utf32Be,
    ];

    /// Canonical name, also accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16-le",
            TextEncoding::Utf16Be => "utf-16-be",
            TextEncoding::Utf32Le => "utf-32-le",
            TextEncoding::Utf32Be => "utf-32-be",
        }
    }

    /// Whether this encoding can emit bytes above 0x7F.
    ///
    /// Such bytes need all eight data bits; a seven-bit frame would
    /// silently truncate them.
    pub fn needs_eight_data_bits(self) -> bool {
        !matches!(self, TextEncoding::Ascii)
    }

    /// Appends the encoded form of `character` to `out`.
    pub fn encode_char(self, character: char, out: &mut Vec<u8>) -> Result<()> {
        match self {
            TextEncoding::Ascii => {
                let cp = character as u32;
                if cp > 0x7F {
                    return Err(Error::Unencodable {
                        character,
                        encoding: self,
                    });
                }
                out.push(cp as u8);
            }
            TextEncoding::Latin1 => {
                let cp = character as u32;
                if cp > 0xFF {
                    return Err(Error::Unencodable {
                        character,
                        encoding: self,
                    });
                }
                out.push(cp as u8);
            }
            TextEncoding::Utf8 => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(character.encode_utf8(&mut buf).as_bytes());
            }
            TextEncoding::Utf16Le => {
                let mut buf = [0u16; 2];
                for unit in character.encode_utf16(&mut buf) {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            TextEncoding::Utf16Be => {
                let mut buf = [0u16; 2];
                for unit in character.encode_utf16(&mut buf) {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            TextEncoding::Utf32Le => {
                out.extend_from_slice(&(character as u32).to_le_bytes());
            }
            TextEncoding::Utf32Be => {
                out.extend_from_slice(&(character as u32).to_be_bytes());
            }
        }
        Ok(())
    }

    /// Encodes `text` into a fresh byte buffer.
    ///
    /// Fails on the first unrepresentable character without returning any
    /// partial output, so a rejected string queues nothing.
    pub fn encode_str(self, text: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        for character in text.chars() {
            self.encode_char(character, &mut out)?;
        }
        Ok(out)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "us-ascii" => Ok(TextEncoding::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "utf-16-le" | "utf16le" => Ok(TextEncoding::Utf16Le),
            "utf-16-be" | "utf16be" => Ok(TextEncoding::Utf16Be),
            "utf-32-le" | "utf32le" => Ok(TextEncoding::Utf32Le),
            "utf-32-be" | "utf32be" => Ok(TextEncoding::Utf32Be),
            _ => Err(Error::UnknownEncoding(s.to_string())),
        }
    }
}
