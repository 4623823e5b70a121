//! Tonos Core - synthesis primitives for real-time tone generation
//!
//! This crate provides the sample-level building blocks shared by every tonos
//! engine: a phase-accumulator oscillator with selectable waveform shapes,
//! click-free level smoothing, and the pulse-cycle state machine behind the
//! siren-style alert generator. Everything here is allocation-free and safe to
//! run inside a real-time production loop.
//!
//! # Core Types
//!
//! - [`Waveform`] - shape function from phase angle to amplitude
//! - [`Oscillator`] - phase accumulator in radians, continuous across buffers
//! - [`SmoothedLevel`] - one-pole amplitude smoothing with a pending target
//! - [`Ramp`] - constant-rate per-sample riser
//! - [`PulseCycle`] - Resting/Ramping/Holding period state machine
//!
//! # Example
//!
//! ```rust
//! use tonos_core::{Oscillator, SmoothedLevel, Waveform};
//!
//! let mut osc = Oscillator::new(44100.0);
//! osc.set_frequency(440.0);
//! osc.set_waveform(Waveform::Triangle);
//!
//! let mut level = SmoothedLevel::new(0.0, 0.001);
//! level.set_target(0.5);
//!
//! let mut buffer = [0.0f32; 1000];
//! for sample in &mut buffer {
//!     *sample = osc.advance() * level.advance();
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (math via `libm`). Disable the default
//! `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tonos-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod oscillator;
pub mod pulse;
pub mod ramp;
pub mod smoothing;
pub mod waveform;

// Re-export main types at crate root
pub use oscillator::Oscillator;
pub use pulse::{PeriodMode, PulseCycle, PulseOutput};
pub use ramp::Ramp;
pub use smoothing::SmoothedLevel;
pub use waveform::Waveform;
