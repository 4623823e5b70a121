//! Pulse cycle demo: waveform shapes, level smoothing, and the period state machine.
//!
//! Run with: cargo run -p tonos-core --example pulse_cycle_demo

use tonos_core::{Oscillator, PulseCycle, SmoothedLevel, Waveform};

fn main() {
    let sample_rate = 22_050.0;

    // --- Waveform shapes ---
    println!("=== Waveform Shapes at 100 Hz ===\n");

    let shapes = [
        ("Sine", Waveform::Sine),
        ("Sine squared", Waveform::SineSquaredAlternating),
        ("Sine cubed", Waveform::SineCubed),
        ("Triangle", Waveform::Triangle),
        ("Square", Waveform::Square),
    ];

    println!("{:<14} {:>8} {:>8} {:>8}", "Waveform", "Min", "Max", "RMS");
    println!("{:-<14} {:->8} {:->8} {:->8}", "", "", "", "");

    for (name, shape) in &shapes {
        let mut osc = Oscillator::new(sample_rate);
        osc.set_frequency(100.0);
        osc.set_waveform(*shape);

        // Two full periods so sign-alternating shapes show both halves.
        let samples = (sample_rate / 100.0) as usize * 2;
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum_sq = 0.0f32;
        for _ in 0..samples {
            let s = osc.advance();
            min = min.min(s);
            max = max.max(s);
            sum_sq += s * s;
        }
        println!(
            "{:<14} {:>8.3} {:>8.3} {:>8.3}",
            name,
            min,
            max,
            (sum_sq / samples as f32).sqrt()
        );
    }

    // --- Level smoothing ---
    println!("\n=== SmoothedLevel Rising Toward 0.8 (alpha 0.001) ===\n");

    let mut level = SmoothedLevel::new(0.0, 0.001);
    level.set_target(0.8);

    println!("{:>8} {:>10} {:>9}", "Sample", "Level", "Settled");
    println!("{:->8} {:->10} {:->9}", "", "", "");

    let mut elapsed = 0usize;
    for checkpoint in [0usize, 500, 1_000, 2_000, 4_000, 8_000] {
        while elapsed < checkpoint {
            level.advance();
            elapsed += 1;
        }
        println!(
            "{:>8} {:>10.6} {:>9}",
            elapsed,
            level.get(),
            if level.is_settled() { "yes" } else { "no" }
        );
    }

    let mut fresh = SmoothedLevel::new(0.0, 0.001);
    fresh.set_target(0.8);
    let mut to_settle = 0usize;
    while !fresh.is_settled() && to_settle < 100_000 {
        fresh.advance();
        to_settle += 1;
    }
    println!("\nLanded exactly on the target after {to_settle} samples.");

    // --- Pulse cycle transitions ---
    println!("\n=== Pulse Cycle: Stock Siren at 22.05 kHz ===\n");

    let mut cycle = PulseCycle::new(sample_rate);
    cycle.set_base_frequency(50.0);
    cycle.set_frequency_raise_rate(4.0);
    cycle.set_volume_raise_rate(4.0);
    cycle.set_max_volume(0.5);
    cycle.set_hold_duration(1.0);

    println!("Base 50 Hz, ceiling 100 Hz, quarter-second ramp, one-second hold.\n");

    cycle.set_active(true);

    println!(
        "{:>8} {:>8} {:<8} {:>10} {:>8}",
        "Sample", "Seconds", "Mode", "Hz", "Target"
    );
    println!("{:->8} {:->8} {:-<8} {:->10} {:->8}", "", "", "", "", "");
    println!(
        "{:>8} {:>8.3} {:<8} {:>10.1} {:>8.2}",
        0,
        0.0,
        format!("{:?}", cycle.mode()),
        cycle.frequency(),
        0.0
    );

    let mut last_mode = cycle.mode();
    let total = (3.0 * sample_rate) as usize;
    for n in 1..=total {
        let out = cycle.advance();
        if cycle.mode() != last_mode {
            last_mode = cycle.mode();
            println!(
                "{:>8} {:>8.3} {:<8} {:>10.1} {:>8.2}",
                n,
                n as f32 / sample_rate,
                format!("{:?}", last_mode),
                out.frequency,
                out.target_volume
            );
        }
    }

    // --- Trigger behavior ---
    println!("\n=== Trigger Behavior ===\n");

    cycle.set_active(true);
    for _ in 0..2_000 {
        cycle.advance();
    }
    println!("Mid-ramp frequency:    {:.1} Hz", cycle.frequency());

    cycle.set_active(true);
    println!("Right after retrigger: {:.1} Hz", cycle.frequency());

    cycle.set_active(false);
    let out = cycle.advance();
    println!(
        "After release:         mode {:?}, target volume {}",
        cycle.mode(),
        out.target_volume
    );

    println!("\nPulse cycle demo complete.");
}
