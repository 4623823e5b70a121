//! Pulsed siren command.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use tonos_io::{EngineConfig, PulseEngine};

use super::common;

#[derive(Args)]
pub struct PulseArgs {
    /// Base frequency in Hz
    #[arg(short = 'f', long, default_value_t = 50.0)]
    base_frequency: f32,

    /// Waveform: sine, sine2, sine3, triangle or square
    #[arg(short, long, default_value = "sine")]
    waveform: String,

    /// Frequency ramp slope, fractions of the base per second
    #[arg(long, default_value_t = 4.0)]
    frequency_raise: f32,

    /// Envelope ramp slope, full scale per second
    #[arg(long, default_value_t = 4.0)]
    volume_raise: f32,

    /// Plateau length in seconds
    #[arg(long, default_value_t = 1.0)]
    hold: f32,

    /// Volume ceiling, 0 to 1
    #[arg(short, long, default_value_t = 0.5)]
    volume: f32,

    /// Pulses per minute; 0 keeps the pulse active until interrupted
    #[arg(short, long, default_value_t = 0)]
    rate: u32,

    /// How long each pulse stays active when repeating, in seconds
    #[arg(long, default_value_t = 2.0)]
    pulse_length: f32,

    /// Total run time in seconds; runs until Ctrl+C when omitted
    #[arg(short, long)]
    duration: Option<f32>,

    /// Output device index or name fragment
    #[arg(long)]
    device: Option<String>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 22050)]
    sample_rate: u32,
}

pub fn run(args: PulseArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.pulse_length.is_finite() && args.pulse_length > 0.0,
        "Pulse length must be a positive number of seconds"
    );
    let waveform = common::parse_waveform(&args.waveform)?;
    let limit = common::optional_duration(args.duration)?;

    let mut engine = PulseEngine::new(EngineConfig {
        sample_rate: args.sample_rate,
        device: args.device.clone(),
        ..EngineConfig::default()
    });
    engine.set_base_frequency(args.base_frequency)?;
    engine.set_waveform(waveform)?;
    engine.set_frequency_raise_rate(args.frequency_raise)?;
    engine.set_volume_raise_rate(args.volume_raise)?;
    engine.set_hold_duration(args.hold)?;
    engine.set_max_volume(args.volume)?;

    let running = common::interrupt_flag()?;
    engine.start()?;

    if args.rate == 0 {
        println!(
            "Pulsing from {} Hz, ceiling {:.2}. Press Ctrl+C to stop...",
            args.base_frequency,
            engine.settings().max_volume
        );
        engine.set_active(true)?;
        common::wait_while_running(&running, limit);
    } else {
        let period = Duration::from_secs_f32(60.0 / args.rate as f32);
        let pulse_length = Duration::from_secs_f32(args.pulse_length);
        println!(
            "Pulsing {}x per minute ({:.1} s every {:.1} s). Press Ctrl+C to stop...",
            args.rate,
            pulse_length.as_secs_f32(),
            period.as_secs_f32()
        );

        let started = Instant::now();
        let expired = |started: Instant| limit.is_some_and(|limit| started.elapsed() >= limit);
        while running.load(Ordering::SeqCst) && !expired(started) {
            let cycle_started = Instant::now();
            engine.set_active(true)?;
            while running.load(Ordering::SeqCst)
                && !expired(started)
                && cycle_started.elapsed() < pulse_length
            {
                thread::sleep(common::TICK);
            }
            engine.set_active(false)?;
            while running.load(Ordering::SeqCst)
                && !expired(started)
                && cycle_started.elapsed() < period
            {
                thread::sleep(common::TICK);
            }
        }
    }

    // Releasing the trigger collapses the envelope; give it time to land.
    engine.set_active(false)?;
    thread::sleep(common::FADE_OUT);
    engine.stop();

    if !running.load(Ordering::SeqCst) {
        println!("\nStopped.");
    }
    Ok(())
}
