//! Benchmarks for the analog envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use teebee_dsp::dsp::{AnalogEnvelope, SampleRate};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let rate = SampleRate::CD;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (long attack keeps it there)
        let mut env = AnalogEnvelope::adsr(rate, 10_000.0, 100.0, 0.7, 300.0);
        env.set_hold(10_000.0);
        env.note_on(false, 60, 100);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = AnalogEnvelope::adsr(rate, 1.0, 1.0, 0.7, 300.0);
        env.note_on(false, 60, 100);
        // Advance past attack/decay
        for _ in 0..200 {
            env.get_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Release phase
        let mut env = AnalogEnvelope::adsr(rate, 1.0, 1.0, 0.7, 100_000.0);
        env.note_on(false, 60, 100);
        for _ in 0..200 {
            env.get_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
