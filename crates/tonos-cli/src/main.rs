//! tonos CLI - tone, pulse and AFSK modem waveform generators.

mod commands;
mod preset;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tonos")]
#[command(version, about = "Tone, pulse and Minitel-style modem audio generators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a continuous tone
    Tone(commands::tone::ToneArgs),

    /// Play the pulsed siren
    Pulse(commands::pulse::PulseArgs),

    /// Transmit text as an AFSK carrier over the speakers
    Send(commands::send::SendArgs),

    /// Render an AFSK transmission to a WAV file
    Render(commands::render::RenderArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tone(args) => commands::tone::run(args),
        Commands::Pulse(args) => commands::pulse::run(args),
        Commands::Send(args) => commands::send::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
