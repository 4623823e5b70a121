//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod pulse;
pub mod render;
pub mod send;
pub mod tone;
