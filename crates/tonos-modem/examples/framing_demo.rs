//! Framing demo: frame anatomy, formats, encodings, and drift-free pacing.
//!
//! Run with: cargo run -p tonos-modem --example framing_demo

use std::collections::VecDeque;

use tonos_modem::{
    DataBits, FrameFormat, LineConfig, Parity, StopBits, Symbol, SymbolScheduler, TextEncoding,
};

fn main() {
    let line = LineConfig::default();

    // --- The anatomy of one frame ---
    println!(
        "=== Framing 'A' (0x41) as {} over V.23 tones ===\n",
        line.format
    );

    let mut symbols = Vec::new();
    line.format.encode_byte(b'A', &line.tones, &mut symbols);

    println!("{:<3} {:<8} {:<6} {:>6} {:>6}", "#", "Role", "Tone", "Hz", "Bits");
    println!("{:-<3} {:-<8} {:-<6} {:->6} {:->6}", "", "", "", "", "");

    let data_count = line.format.data_bits.count() as usize;
    for (index, symbol) in symbols.iter().enumerate() {
        let role = if index == 0 {
            "start".to_string()
        } else if index <= data_count {
            format!("data {}", index - 1)
        } else if index == symbols.len() - 1 {
            "stop".to_string()
        } else {
            "parity".to_string()
        };
        let tone = if symbol.frequency == line.tones.mark {
            "mark"
        } else {
            "space"
        };
        println!(
            "{:<3} {:<8} {:<6} {:>6.0} {:>6.1}",
            index, role, tone, symbol.frequency, symbol.duration_bits
        );
    }

    // --- Frame formats ---
    println!("\n=== Frame Formats at 1200 Baud ===\n");

    let formats = [
        FrameFormat::default(),
        FrameFormat {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        },
        FrameFormat {
            data_bits: DataBits::Seven,
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
        },
        FrameFormat {
            data_bits: DataBits::Eight,
            parity: Parity::Even,
            stop_bits: StopBits::OneAndHalf,
        },
    ];

    println!(
        "{:<8} {:>8} {:>6} {:>10} {:>9}",
        "Format", "Symbols", "Bits", "ms/byte", "bytes/s"
    );
    println!("{:-<8} {:->8} {:->6} {:->10} {:->9}", "", "", "", "", "");

    for format in formats {
        let line = LineConfig {
            format,
            ..LineConfig::default()
        };
        println!(
            "{:<8} {:>8} {:>6.1} {:>10.2} {:>9.1}",
            format.to_string(),
            format.symbols_per_byte(),
            format.bits_per_byte(),
            1000.0 * line.seconds_per_byte(),
            1.0 / line.seconds_per_byte()
        );
    }

    // --- Text encodings ---
    println!("\n=== Encoding \"A\u{e9}\" ===\n");

    println!("{:<10} {:>6}  {}", "Encoding", "8-bit", "Bytes");
    println!("{:-<10} {:->6}  {:-<24}", "", "", "");

    for encoding in TextEncoding::ALL {
        let eight = if encoding.needs_eight_data_bits() {
            "yes"
        } else {
            "no"
        };
        match encoding.encode_str("A\u{e9}") {
            Ok(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
                println!("{:<10} {:>6}  {}", encoding.name(), eight, hex.join(" "));
            }
            Err(error) => println!("{:<10} {:>6}  {}", encoding.name(), eight, error),
        }
    }

    // --- Symbol pacing ---
    println!("\n=== Pacing 1-Bit Symbols at 44.1 kHz, 1200 Baud ===\n");

    let ideal = 44_100.0 / 1200.0;
    println!("Ideal length is {ideal} samples per bit; emitted lengths are whole");
    println!("samples, with the rounding remainder carried to the next symbol.\n");

    let mut scheduler = SymbolScheduler::new(44_100.0, 1200.0);
    let mut queue: VecDeque<Symbol> = (0..12)
        .map(|_| Symbol {
            frequency: 1300.0,
            duration_bits: 1.0,
        })
        .collect();

    println!("{:>4} {:>8} {:>8}", "Bit", "Samples", "Drift");
    println!("{:->4} {:->8} {:->8}", "", "", "");

    let mut bit = 0u32;
    let mut emitted = 0u32;
    let mut length = 0u32;
    loop {
        match scheduler.advance(&mut queue, 1500.0) {
            Some(hz) => {
                if length > 0 {
                    bit += 1;
                    emitted += length;
                    println!(
                        "{:>4} {:>8} {:>8.2}",
                        bit,
                        length,
                        f64::from(emitted) - f64::from(bit) * f64::from(ideal)
                    );
                }
                if hz != 1300.0 {
                    break;
                }
                length = 1;
            }
            None => length += 1,
        }
    }

    // --- V.23 service rates ---
    println!("\n=== Throughput of the Stock 7E1 Line ===\n");

    println!("{:>6} {:>10} {:>9}", "Baud", "ms/char", "chars/s");
    println!("{:->6} {:->10} {:->9}", "", "", "");

    for baud_rate in LineConfig::BAUD_RATES {
        let line = LineConfig {
            baud_rate,
            ..LineConfig::default()
        };
        println!(
            "{:>6} {:>10.2} {:>9.1}",
            baud_rate,
            1000.0 * line.seconds_per_byte(),
            1.0 / line.seconds_per_byte()
        );
    }

    println!("\nFraming demo complete.");
}
