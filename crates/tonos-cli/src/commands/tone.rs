//! Continuous tone command.

use std::sync::atomic::Ordering;
use std::thread;

use clap::Args;
use tonos_io::{EngineConfig, ToneEngine};

use super::common;

#[derive(Args)]
pub struct ToneArgs {
    /// Frequency in Hz
    #[arg(short, long, default_value_t = 440.0)]
    frequency: f32,

    /// Waveform: sine, sine2, sine3, triangle or square
    #[arg(short, long, default_value = "sine")]
    waveform: String,

    /// Output volume, 0 to 1
    #[arg(short, long, default_value_t = 0.8)]
    volume: f32,

    /// Playback length in seconds; plays until Ctrl+C when omitted
    #[arg(short, long)]
    duration: Option<f32>,

    /// Output device index or name fragment
    #[arg(long)]
    device: Option<String>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
}

pub fn run(args: ToneArgs) -> anyhow::Result<()> {
    let waveform = common::parse_waveform(&args.waveform)?;
    let limit = common::optional_duration(args.duration)?;

    let mut engine = ToneEngine::new(EngineConfig {
        sample_rate: args.sample_rate,
        device: args.device.clone(),
        ..EngineConfig::default()
    });
    engine.set_frequency(args.frequency)?;
    engine.set_waveform(waveform)?;
    engine.set_volume(args.volume)?;

    let running = common::interrupt_flag()?;
    engine.start()?;

    println!(
        "Playing {} Hz {} at volume {:.2}",
        args.frequency,
        args.waveform.to_ascii_lowercase(),
        engine.volume()
    );
    if limit.is_none() {
        println!("Press Ctrl+C to stop...");
    }

    common::wait_while_running(&running, limit);

    engine.set_volume(0.0)?;
    thread::sleep(common::FADE_OUT);
    engine.stop();

    if !running.load(Ordering::SeqCst) {
        println!("\nStopped.");
    }
    Ok(())
}
