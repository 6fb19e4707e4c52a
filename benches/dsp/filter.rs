//! Benchmarks for the ladder filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use teebee_dsp::dsp::{FilterMode, SampleRate, TeeBeeFilter};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // One representative per mode family
        for mode in [
            FilterMode::Tb303,
            FilterMode::Lowpass24,
            FilterMode::Highpass24,
            FilterMode::Bandpass12_12,
        ] {
            let mut filter = TeeBeeFilter::with_mode(mode, SampleRate::CD);
            filter.set_resonance(80.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // Cutoff modulated every sample, as under a filter envelope
        let mut filter = TeeBeeFilter::new(SampleRate::CD);
        filter.set_resonance(80.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("tb303_modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    filter.set_cutoff(500.0 + 10.0 * i as f32);
                    *sample = filter.get_sample(black_box(input[i]));
                }
            })
        });
    }

    group.finish();
}

pub fn bench_coefficients(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter_coefficients");

    let mut filter = TeeBeeFilter::with_mode(FilterMode::Lowpass24, SampleRate::CD);
    filter.set_resonance(70.0);
    group.bench_function("approx4", |b| {
        b.iter(|| {
            filter.stage_cutoff(black_box(1234.0));
            filter.calculate_coefficients_approx4();
        })
    });
    group.bench_function("exact", |b| {
        b.iter(|| {
            filter.stage_cutoff(black_box(1234.0));
            filter.calculate_coefficients_exact();
        })
    });

    group.finish();
}
