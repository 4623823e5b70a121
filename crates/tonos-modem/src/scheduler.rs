//! Sample-accurate symbol pacing.
//!
//! At 44.1 kHz and 1200 baud a bit lasts 36.75 samples. Rounding every
//! symbol to 37 samples would stretch a 1000-symbol burst by hundreds of
//! samples and eventually slip the receiver's bit clock. The scheduler
//! instead carries the rounding remainder from symbol to symbol, so each
//! symbol lands within one sample of its ideal start and the error never
//! accumulates.

use std::collections::VecDeque;

use crate::framing::Symbol;

/// Paces queued [`Symbol`]s against a fixed sample clock.
///
/// Call [`advance`](SymbolScheduler::advance) exactly once per output
/// sample. When it returns a frequency the caller retunes its oscillator
/// before rendering that sample, which makes the retuned sample the first
/// sample of the new symbol.
#[derive(Debug)]
pub struct SymbolScheduler {
    sample_rate: f64,
    baud_rate: f64,
    /// Samples left before the next symbol boundary.
    wait_samples: u32,
    /// Running difference between emitted and ideal symbol lengths.
    carried_error: f64,
}

impl SymbolScheduler {
    /// Creates a scheduler for the given sample clock and symbol rate.
    pub fn new(sample_rate: f32, baud_rate: f32) -> Self {
        SymbolScheduler {
            sample_rate: f64::from(sample_rate),
            baud_rate: f64::from(baud_rate),
            wait_samples: 0,
            carried_error: 0.0,
        }
    }

    /// Parks on the current tone for `samples` before the next pop.
    ///
    /// Used for the idle preamble at transmission start, giving the far
    /// end time to detect the carrier before data begins.
    pub fn hold(&mut self, samples: u32) {
        self.wait_samples = samples;
    }

    /// Changes the symbol rate for subsequently popped symbols.
    ///
    /// The symbol currently on line keeps its old timing. The carried
    /// remainder is meaningless across a rate change and starts over.
    pub fn set_baud_rate(&mut self, baud_rate: f32) {
        self.baud_rate = f64::from(baud_rate);
        self.carried_error = 0.0;
    }

    /// Current symbol rate in bits per second.
    pub fn baud_rate(&self) -> f32 {
        self.baud_rate as f32
    }

    /// True while a symbol (or hold period) still occupies the line.
    pub fn is_waiting(&self) -> bool {
        self.wait_samples > 0
    }

    /// Advances the line clock by one sample.
    ///
    /// Returns `Some(frequency)` when the oscillator must retune: either a
    /// new symbol starts on this sample, or the queue is empty and the
    /// line parks on `idle_hz`. Returns `None` mid-symbol.
    pub fn advance(&mut self, queue: &mut VecDeque<Symbol>, idle_hz: f32) -> Option<f32> {
        if self.wait_samples > 0 {
            self.wait_samples -= 1;
            return None;
        }
        match queue.pop_front() {
            Some(symbol) => {
                let ideal = f64::from(symbol.duration_bits) * self.sample_rate / self.baud_rate;
                let actual = (ideal - self.carried_error).round().max(1.0);
                self.carried_error += actual - ideal;
                // This sample is the first of `actual`, so wait out the rest.
                self.wait_samples = actual as u32 - 1;
                Some(symbol.frequency)
            }
            None => {
                // Transmission gap. Timing restarts fresh with the next burst.
                self.carried_error = 0.0;
                Some(idle_hz)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARK: f32 = 1300.0;
    const IDLE: f32 = 1500.0;

    fn bits(count: usize) -> VecDeque<Symbol> {
        (0..count)
            .map(|_| Symbol {
                frequency: MARK,
                duration_bits: 1.0,
            })
            .collect()
    }

    #[test]
    fn thousand_symbols_stay_on_clock() {
        let mut scheduler = SymbolScheduler::new(44_100.0, 1200.0);
        let mut queue = bits(1000);
        let ideal = 44_100.0 / 1200.0;

        let mut pops = Vec::new();
        let mut done_at = None;
        for t in 0..40_000u32 {
            match scheduler.advance(&mut queue, IDLE) {
                Some(f) if f == MARK => pops.push(t),
                Some(_) => {
                    done_at = Some(t);
                    break;
                }
                None => {}
            }
        }
        let done_at = done_at.unwrap();
        assert_eq!(pops.len(), 1000);

        // The burst as a whole ends within one sample of ideal.
        assert!((f64::from(done_at) - 1000.0 * ideal).abs() <= 1.0);

        // And no individual symbol is more than a sample off.
        for pair in pops.windows(2) {
            let elapsed = f64::from(pair[1] - pair[0]);
            assert!((elapsed - ideal).abs() < 1.0, "symbol length {elapsed}");
        }
        let last = f64::from(done_at - pops[999]);
        assert!((last - ideal).abs() < 1.0);
    }

    #[test]
    fn symbol_lengths_alternate_around_ideal() {
        // At 36.75 samples per bit the rounded lengths must mix 36s and
        // 37s; all-37 would mean the remainder is being dropped.
        let mut scheduler = SymbolScheduler::new(44_100.0, 1200.0);
        let mut queue = bits(8);
        let mut lengths = Vec::new();
        let mut current = 0u32;
        for _ in 0..400 {
            match scheduler.advance(&mut queue, IDLE) {
                Some(f) if f == MARK => {
                    if current > 0 {
                        lengths.push(current);
                    }
                    current = 1;
                }
                Some(_) => {
                    lengths.push(current);
                    break;
                }
                None => current += 1,
            }
        }
        assert_eq!(lengths.len(), 8);
        assert!(lengths.iter().any(|&n| n == 36));
        assert!(lengths.iter().any(|&n| n == 37));
        assert_eq!(lengths.iter().sum::<u32>(), 294); // 8 * 36.75
    }

    #[test]
    fn hold_delays_the_first_pop() {
        let mut scheduler = SymbolScheduler::new(8000.0, 1000.0);
        scheduler.hold(100);
        let mut queue = bits(1);
        for _ in 0..100 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
    }

    #[test]
    fn empty_queue_parks_on_idle() {
        let mut scheduler = SymbolScheduler::new(8000.0, 1000.0);
        let mut queue = VecDeque::new();
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));

        // A new burst starts on the very next sample.
        queue.push_back(Symbol {
            frequency: MARK,
            duration_bits: 1.0,
        });
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
    }

    #[test]
    fn idle_gap_resets_the_carried_remainder() {
        let mut scheduler = SymbolScheduler::new(44_100.0, 1200.0);
        let mut queue = bits(2);
        // Two pops leave a +0.5 remainder (37 + 37 emitted vs 73.5 ideal).
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        for _ in 0..36 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        for _ in 0..36 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        // Gap, then a fresh burst. With the remainder cleared the first
        // symbol is 37 samples; a stale +0.5 would shrink it to 36.
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
        queue = bits(1);
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        for _ in 0..36 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
    }

    #[test]
    fn baud_change_applies_to_the_next_symbol() {
        let mut scheduler = SymbolScheduler::new(48_000.0, 1200.0);
        let mut queue = bits(2);
        // 48000 / 1200 = 40 samples exactly.
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        scheduler.set_baud_rate(600.0);
        for _ in 0..39 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        // Second symbol runs at 600 baud: 80 samples.
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        for _ in 0..79 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
    }

    #[test]
    fn degenerate_durations_still_take_one_sample() {
        let mut scheduler = SymbolScheduler::new(8000.0, 1_000_000.0);
        let mut queue = bits(3);
        // Ideal length is 0.008 samples; each symbol must still occupy one.
        assert!(scheduler.advance(&mut queue, IDLE).is_some());
        assert!(scheduler.advance(&mut queue, IDLE).is_some());
        assert!(scheduler.advance(&mut queue, IDLE).is_some());
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
    }

    #[test]
    fn fractional_stop_bits_time_exactly() {
        let mut scheduler = SymbolScheduler::new(44_100.0, 1200.0);
        let mut queue: VecDeque<Symbol> = [Symbol {
            frequency: MARK,
            duration_bits: 1.5,
        }]
        .into();
        // 1.5 bits = 55.125 samples, rounded to 55.
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(MARK));
        for _ in 0..54 {
            assert_eq!(scheduler.advance(&mut queue, IDLE), None);
        }
        assert_eq!(scheduler.advance(&mut queue, IDLE), Some(IDLE));
    }
}
