//! End-to-end tests: text through framing and onto the sample clock.

#![allow(missing_docs)]

use std::collections::VecDeque;

use tonos_modem::{
    DataBits, FrameFormat, LineConfig, Parity, StopBits, Symbol, SymbolScheduler, TextEncoding,
};

/// One tone event on the line: frequency and how many samples it held.
#[derive(Debug, PartialEq)]
struct ToneEvent {
    frequency: f32,
    samples: u32,
}

/// Plays a queue through a scheduler and records every tone change until
/// the line parks on idle.
fn transmit(
    scheduler: &mut SymbolScheduler,
    queue: &mut VecDeque<Symbol>,
    idle_hz: f32,
) -> Vec<ToneEvent> {
    let mut events: Vec<ToneEvent> = Vec::new();
    for _ in 0..1_000_000u32 {
        match scheduler.advance(queue, idle_hz) {
            Some(frequency) if frequency == idle_hz && queue.is_empty() => {
                return events;
            }
            Some(frequency) => events.push(ToneEvent {
                frequency,
                samples: 1,
            }),
            None => {
                if let Some(last) = events.last_mut() {
                    last.samples += 1;
                }
            }
        }
    }
    panic!("transmission never went idle");
}

#[test]
fn letter_a_becomes_ten_timed_tones() {
    let line = LineConfig::default();
    let mut queue: VecDeque<Symbol> = line.encode_str("A").unwrap().into();
    let mut scheduler = SymbolScheduler::new(44_100.0, line.baud_rate);

    let events = transmit(&mut scheduler, &mut queue, line.tones.idle);
    assert_eq!(events.len(), 10);

    // start, 1000001 LSB first, even parity space, stop mark.
    let expected = [
        line.tones.space,
        line.tones.mark,
        line.tones.space,
        line.tones.space,
        line.tones.space,
        line.tones.space,
        line.tones.space,
        line.tones.mark,
        line.tones.space,
        line.tones.mark,
    ];
    let frequencies: Vec<f32> = events.iter().map(|e| e.frequency).collect();
    assert_eq!(frequencies, expected);

    // Every bit lasts 36 or 37 samples and the whole character lands
    // within a sample of 367.5.
    for event in &events {
        assert!(event.samples == 36 || event.samples == 37, "{event:?}");
    }
    let total: u32 = events.iter().map(|e| e.samples).sum();
    assert!((f64::from(total) - 367.5).abs() <= 1.0, "total {total}");
}

#[test]
fn characters_transmit_in_call_order() {
    let line = LineConfig::default();
    let mut queue: VecDeque<Symbol> = VecDeque::new();
    queue.extend(line.encode_str("A").unwrap());
    queue.extend(line.encode_str("B").unwrap());

    let per_char = line.format.symbols_per_byte();
    assert_eq!(queue.len(), 2 * per_char);

    // 'A' = 1000001, 'B' = 1000010: they differ in data bits 0 and 1.
    let a_bit0 = queue[1].frequency;
    let b_bit0 = queue[per_char + 1].frequency;
    assert_eq!(a_bit0, line.tones.mark);
    assert_eq!(b_bit0, line.tones.space);
}

#[test]
fn eight_n_one_latin1_carries_high_bytes() {
    let line = LineConfig {
        encoding: TextEncoding::Latin1,
        format: FrameFormat {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        },
        ..LineConfig::default()
    };
    let symbols = line.encode_str("é").unwrap();

    // 0xE9 = 10010111 LSB first.
    assert_eq!(symbols.len(), 10);
    let bits: Vec<bool> = symbols[1..9]
        .iter()
        .map(|s| s.frequency == line.tones.mark)
        .collect();
    assert_eq!(
        bits,
        vec![true, false, false, true, false, true, true, true]
    );
}

#[test]
fn slow_line_stretches_symbols_proportionally() {
    let line = LineConfig {
        baud_rate: 300.0,
        ..LineConfig::default()
    };
    let mut queue: VecDeque<Symbol> = line.encode_str("HI").unwrap().into();
    let mut scheduler = SymbolScheduler::new(44_100.0, line.baud_rate);

    let events = transmit(&mut scheduler, &mut queue, line.tones.idle);
    let total: u32 = events.iter().map(|e| e.samples).sum();

    // Two 10-bit frames at 147 samples per bit.
    assert!((f64::from(total) - 2940.0).abs() <= 1.0, "total {total}");
}

#[test]
fn preamble_holds_the_idle_tone_before_data() {
    let line = LineConfig::default();
    let mut queue: VecDeque<Symbol> = line.encode_str("A").unwrap().into();
    let mut scheduler = SymbolScheduler::new(44_100.0, line.baud_rate);

    // A one second carrier preamble before the first start bit.
    scheduler.hold(44_100);
    assert!(scheduler.is_waiting());
    for _ in 0..44_100 {
        assert_eq!(scheduler.advance(&mut queue, line.tones.idle), None);
    }
    assert_eq!(
        scheduler.advance(&mut queue, line.tones.idle),
        Some(line.tones.space)
    );
}

#[test]
fn two_stop_bits_lengthen_the_frame() {
    let one = LineConfig::default();
    let two = LineConfig {
        format: FrameFormat {
            stop_bits: StopBits::Two,
            ..one.format
        },
        ..one
    };

    let short = one.encode_str("A").unwrap();
    let long = two.encode_str("A").unwrap();
    assert_eq!(short.len(), long.len());

    let short_bits: f32 = short.iter().map(|s| s.duration_bits).sum();
    let long_bits: f32 = long.iter().map(|s| s.duration_bits).sum();
    assert_eq!(short_bits, 10.0);
    assert_eq!(long_bits, 11.0);
}
