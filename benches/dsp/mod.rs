//! Benchmarks for the DSP primitives.

mod envelope;
mod fast_math;
mod filter;

pub use envelope::bench_envelope;
pub use fast_math::bench_fast_math;
pub use filter::{bench_coefficients, bench_filter};
