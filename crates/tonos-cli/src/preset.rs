//! Preset file format for serial line parameters.
//!
//! Presets are small TOML files holding the line settings shared by the
//! `send` and `render` commands. Every field is optional; explicit CLI
//! flags override whatever the preset provides.
//!
//! ```toml
//! # minitel.toml
//! baud = 1200
//! encoding = "ascii"
//! parity = "even"
//! bits = 7
//! stop = 1.0
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Partial line settings loaded from a TOML preset.
#[derive(Debug, Default, Deserialize)]
pub struct LinePreset {
    /// Baud rate.
    pub baud: Option<f32>,
    /// Text encoding name.
    pub encoding: Option<String>,
    /// Data bits per frame, 7 or 8.
    pub bits: Option<u8>,
    /// Parity name: none, odd or even.
    pub parity: Option<String>,
    /// Stop bits: 1, 1.5 or 2.
    pub stop: Option<f32>,
    /// Mark (bit 1) tone in Hz.
    pub mark: Option<f32>,
    /// Space (bit 0) tone in Hz.
    pub space: Option<f32>,
    /// Idle line tone in Hz.
    pub idle: Option<f32>,
}

impl LinePreset {
    /// Load a preset from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading preset file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing preset file {}", path.display()))
    }
}
