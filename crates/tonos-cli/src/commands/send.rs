//! AFSK transmit command.

use std::io::Read;
use std::sync::atomic::Ordering;
use std::thread;

use anyhow::Context;
use clap::Args;
use tonos_io::{EngineConfig, Error, ModemEngine};

use super::common::{self, LineArgs};

#[derive(Args)]
pub struct SendArgs {
    /// Text to transmit; reads stdin to the end when omitted
    #[arg(short, long)]
    text: Option<String>,

    #[command(flatten)]
    line: LineArgs,

    /// Carrier volume, 0 to 1
    #[arg(short, long, default_value_t = 0.8)]
    volume: f32,

    /// Output device index or name fragment
    #[arg(long)]
    device: Option<String>,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
}

pub fn run(args: SendArgs) -> anyhow::Result<()> {
    let line = args.line.resolve()?;
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading text from stdin")?;
            text
        }
    };

    let mut engine = ModemEngine::new(EngineConfig {
        sample_rate: args.sample_rate,
        device: args.device.clone(),
        ..EngineConfig::default()
    });
    engine.set_baud_rate(line.baud_rate)?;
    engine.set_encoding(line.encoding);
    engine.set_data_bits(line.format.data_bits);
    engine.set_parity(line.format.parity);
    engine.set_stop_bits(line.format.stop_bits);
    engine.set_tones(line.tones)?;
    engine.set_volume(args.volume)?;

    let running = common::interrupt_flag()?;
    engine.start()?;

    println!(
        "Transmitting {} characters at {} baud, {} ({})",
        text.chars().count(),
        line.baud_rate,
        line.format,
        line.encoding
    );

    let mut sent = 0usize;
    let mut dropped = 0usize;
    for character in text.chars() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        // Bare LF goes out as CR LF; a preceding CR is folded into that.
        if character == '\r' {
            continue;
        }
        let wire = if character == '\n' {
            String::from("\r\n")
        } else {
            character.to_string()
        };
        match engine.write(&wire) {
            Ok(()) => sent += 1,
            Err(Error::Modem(error)) => {
                tracing::warn!("dropping character: {error}");
                dropped += 1;
            }
            Err(error) => return Err(error.into()),
        }
    }

    while running.load(Ordering::SeqCst) && !engine.is_idle() {
        thread::sleep(common::TICK);
    }

    engine.set_volume(0.0)?;
    thread::sleep(common::FADE_OUT);
    engine.stop();

    if dropped > 0 {
        println!("Sent {sent} characters, dropped {dropped} the encoding rejected.");
    } else {
        println!("Sent {sent} characters.");
    }
    Ok(())
}
