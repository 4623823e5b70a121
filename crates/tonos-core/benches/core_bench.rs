//! Criterion benchmarks for tonos-core synthesis primitives
//!
//! Run with: cargo bench -p tonos-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tonos_core::{Oscillator, PulseCycle, SmoothedLevel, Waveform};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[250, 1000, 4000];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oscillator");

    let waveforms = [
        ("Sine", Waveform::Sine),
        ("SineSquaredAlternating", Waveform::SineSquaredAlternating),
        ("SineCubed", Waveform::SineCubed),
        ("Triangle", Waveform::Triangle),
        ("Square", Waveform::Square),
    ];

    for (name, waveform) in &waveforms {
        for &block_size in BLOCK_SIZES {
            group.bench_with_input(
                BenchmarkId::new(*name, block_size),
                &block_size,
                |b, &size| {
                    let mut osc = Oscillator::new(SAMPLE_RATE);
                    osc.set_frequency(440.0);
                    osc.set_waveform(*waveform);
                    b.iter(|| {
                        for _ in 0..size {
                            black_box(osc.advance());
                        }
                    });
                },
            );
        }
    }

    // Retune cost, paid once per frequency change
    group.bench_function("set_frequency", |b| {
        let mut osc = Oscillator::new(SAMPLE_RATE);
        b.iter(|| {
            osc.set_frequency(black_box(1300.0));
        });
    });

    group.finish();
}

fn bench_smoothed_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("SmoothedLevel");

    for &block_size in BLOCK_SIZES {
        // Gliding: a target is pending the whole block
        group.bench_with_input(
            BenchmarkId::new("gliding", block_size),
            &block_size,
            |b, &size| {
                let mut level = SmoothedLevel::new(0.0, 0.001);
                b.iter(|| {
                    level.set_target(black_box(0.5));
                    for _ in 0..size {
                        black_box(level.advance());
                    }
                });
            },
        );

        // Settled: fixed point reached, pending slot cleared
        group.bench_with_input(
            BenchmarkId::new("settled", block_size),
            &block_size,
            |b, &size| {
                let mut level = SmoothedLevel::new(0.5, 0.001);
                b.iter(|| {
                    for _ in 0..size {
                        black_box(level.advance());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_pulse_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("PulseCycle");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("active", block_size),
            &block_size,
            |b, &size| {
                let mut cycle = PulseCycle::new(SAMPLE_RATE);
                cycle.set_base_frequency(50.0);
                cycle.set_frequency_raise_rate(4.0);
                cycle.set_volume_raise_rate(1.0);
                cycle.set_max_volume(0.5);
                cycle.set_hold_rate(4.0);
                cycle.set_active(true);
                b.iter(|| {
                    for _ in 0..size {
                        black_box(cycle.advance());
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("resting", block_size),
            &block_size,
            |b, &size| {
                let mut cycle = PulseCycle::new(SAMPLE_RATE);
                cycle.set_base_frequency(50.0);
                b.iter(|| {
                    for _ in 0..size {
                        black_box(cycle.advance());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_smoothed_level, bench_pulse_cycle);

criterion_main!(benches);
