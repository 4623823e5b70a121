//! Audio output device listing.

use clap::Args;
use tonos_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;

    if devices.is_empty() {
        println!("No audio output devices found.");
        return Ok(());
    }

    println!("Output Devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!(
            "  [{}] {} ({} Hz, {} ch)",
            idx, device.name, device.default_sample_rate, device.channels
        );
    }
    println!();

    match default_output_device()? {
        Some(device) => println!("Default: {}", device.name),
        None => println!("Default: none"),
    }
    println!();
    println!("Tip: Pass a device index or partial name with --device:");
    println!("  tonos tone --device 0");
    println!("  tonos send --device \"USB\" --text \"hello\"");

    Ok(())
}
