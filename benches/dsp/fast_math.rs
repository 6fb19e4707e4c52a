//! Benchmarks for the lookup tables against their libm counterparts.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use teebee_dsp::dsp::fast_math::{self, fast_saturate, rational_tanh, sin_cos};

use crate::BLOCK_SIZES;

pub fn bench_fast_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fast_math");
    fast_math::warm_up();

    for &size in BLOCK_SIZES {
        // Arguments spread over the saturation knee and several sine periods
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 12.0 - 6.0)
            .collect();
        let mut output = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("saturate_table", size), &size, |b, _| {
            b.iter(|| {
                for (y, &x) in output.iter_mut().zip(input.iter()) {
                    *y = fast_saturate(black_box(x));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("saturate_rational", size), &size, |b, _| {
            b.iter(|| {
                for (y, &x) in output.iter_mut().zip(input.iter()) {
                    *y = rational_tanh(black_box(x));
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("tanh_libm", size), &size, |b, _| {
            b.iter(|| {
                for (y, &x) in output.iter_mut().zip(input.iter()) {
                    *y = black_box(x).tanh();
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("sin_cos_table", size), &size, |b, _| {
            b.iter(|| {
                for (y, &x) in output.iter_mut().zip(input.iter()) {
                    let (s, c) = sin_cos(black_box(x));
                    *y = s + c;
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("sin_cos_libm", size), &size, |b, _| {
            b.iter(|| {
                for (y, &x) in output.iter_mut().zip(input.iter()) {
                    let (s, c) = black_box(x).sin_cos();
                    *y = s + c;
                }
            })
        });
    }

    group.finish();
}
