//! Offline modem rendering to WAV.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tonos_io::{render_message, write_wav};

use super::common::LineArgs;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV path
    output: PathBuf,

    /// Text to transmit; reads stdin to the end when omitted
    #[arg(short, long)]
    text: Option<String>,

    #[command(flatten)]
    line: LineArgs,

    /// Carrier volume, 0 to 1
    #[arg(short, long, default_value_t = 0.8)]
    volume: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
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
    // Line endings go out as CR LF regardless of how they came in.
    let text = text.replace("\r\n", "\n").replace('\n', "\r\n");

    let samples = render_message(&line, args.sample_rate, args.volume, &text)?;
    write_wav(&args.output, &samples, args.sample_rate)?;

    println!(
        "Wrote {} samples ({:.2} s at {} Hz) to {}",
        samples.len(),
        samples.len() as f32 / args.sample_rate as f32,
        args.sample_rate,
        args.output.display()
    );
    Ok(())
}
