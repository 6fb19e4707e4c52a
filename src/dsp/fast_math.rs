//! Table-driven fast math
//!
//! The filter spends most of its per-sample budget inside a saturating
//! nonlinearity, and its exact coefficient path needs a sine/cosine pair.
//! Calling `tanh`/`sin`/`cos` from libm on every sample is too slow for a
//! voice that has to run at 4x oversampling, so both functions are read from
//! small precomputed tables instead.
//!
//! # How the Tables Work
//!
//! A table holds `N + 1` evenly spaced samples of a function, where `N` is a
//! power of two. The extra guard sample at the end repeats the wrap-around
//! value (sine) or the last in-range value (saturation), so interpolating
//! between `table[i]` and `table[i + 1]` never walks off the end:
//!
//!   index:   0     1     2    ...   N-1    N (guard)
//!           |-----|-----|--  ...  --|-----|
//!              linear interpolation in between
//!
//! The worst-case interpolation error for a smooth function is
//! `h² / 8 · max|f''|`, where `h` is the table spacing. With 1024 intervals
//! over one sine period that is about `4.7e-6`.
//!
//! # Saturation Curve
//!
//! Only the non-negative half of `tanh` over `[0, 5]` is stored. Negative
//! inputs are mirrored, and anything at or beyond the ceiling returns exactly
//! ±1 (tanh(5) is already 0.99991).
//!
//! # Non-finite Input
//!
//! NaN and infinities are not defended against: NaN propagates, ±∞ saturates.
//! Keeping control parameters finite is the caller's job.

use std::f32::consts::{SQRT_2, TAU};
use std::f64::consts::TAU as TAU_F64;
use std::sync::LazyLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// log2 of the number of table intervals.
pub const TABLE_BITS: u32 = 10;
/// Number of table intervals. Each table stores one more sample than this.
pub const TABLE_SIZE: usize = 1 << TABLE_BITS;
const TABLE_MASK: i64 = TABLE_SIZE as i64 - 1;

/// Input magnitude at which [`fast_saturate`] returns exactly ±1.
pub const SATURATION_CEILING: f32 = 5.0;

const SINE_INDEX_SCALE: f32 = TABLE_SIZE as f32 / TAU;
const QUARTER_PERIOD: f32 = (TABLE_SIZE / 4) as f32;
const SATURATION_INDEX_SCALE: f32 = TABLE_SIZE as f32 / SATURATION_CEILING;

/// An immutable, evenly sampled function with one guard sample.
pub struct LookupTable {
    samples: [f32; TABLE_SIZE + 1],
}

impl LookupTable {
    /// One period of a 2π-periodic function; the guard repeats sample 0.
    fn periodic(f: impl Fn(f64) -> f64) -> Self {
        let mut samples: [f32; TABLE_SIZE + 1] =
            std::array::from_fn(|i| f(TAU_F64 * i as f64 / TABLE_SIZE as f64) as f32);
        samples[TABLE_SIZE] = samples[0];
        Self { samples }
    }

    /// `f` sampled over `[0, domain]`, both ends included.
    fn bounded(domain: f64, f: impl Fn(f64) -> f64) -> Self {
        let samples = std::array::from_fn(|i| f(domain * i as f64 / TABLE_SIZE as f64) as f32);
        Self { samples }
    }

    /// Number of intervals (`samples().len() - 1`).
    pub fn intervals(&self) -> usize {
        TABLE_SIZE
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Linear interpolation at a fractional index in `0..=intervals()`.
    ///
    /// Integer indices return the stored sample exactly. An index of exactly
    /// `intervals()` lands on the guard sample.
    #[inline]
    pub fn lookup(&self, index: f32) -> f32 {
        let i = (index as usize).min(TABLE_SIZE - 1);
        let frac = index - i as f32;
        let v1 = self.samples[i];
        let v2 = self.samples[i + 1];
        v1 + frac * (v2 - v1)
    }
}

/// One period of `sin`, shared by every voice.
pub static SINE_TABLE: LazyLock<LookupTable> = LazyLock::new(|| LookupTable::periodic(f64::sin));

/// `tanh` over `[0, SATURATION_CEILING]`, shared by every voice.
pub static SATURATION_TABLE: LazyLock<LookupTable> =
    LazyLock::new(|| LookupTable::bounded(SATURATION_CEILING as f64, f64::tanh));

/// Builds both tables now instead of on first use.
///
/// Component constructors call this so the audio thread never pays for the
/// one-time initialisation.
pub fn warm_up() {
    LazyLock::force(&SINE_TABLE);
    LazyLock::force(&SATURATION_TABLE);
    tracing::trace!(intervals = TABLE_SIZE, "fast math tables ready");
}

#[inline]
fn periodic_lookup(argument: f32) -> f32 {
    let whole = argument.floor();
    let index = (whole as i64 & TABLE_MASK) as f32 + (argument - whole);
    SINE_TABLE.lookup(index)
}

/// Table sine of `x` radians. Any finite `x`, including negative values.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    periodic_lookup(x * SINE_INDEX_SCALE)
}

/// Table cosine of `x` radians, read from the sine table a quarter period on.
#[inline]
pub fn fast_cos(x: f32) -> f32 {
    periodic_lookup(x * SINE_INDEX_SCALE + QUARTER_PERIOD)
}

/// `(sin x, cos x)` from the table.
#[inline]
pub fn sin_cos(x: f32) -> (f32, f32) {
    (fast_sin(x), fast_cos(x))
}

/// Table `tanh`: odd, monotone, exactly ±1 beyond [`SATURATION_CEILING`].
#[inline]
pub fn fast_saturate(x: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude >= SATURATION_CEILING {
        return 1.0f32.copysign(x);
    }
    SATURATION_TABLE
        .lookup(magnitude * SATURATION_INDEX_SCALE)
        .copysign(x)
}

/// Rational approximation of `tanh`. Slope 1 at the origin, ±1 at infinity.
#[inline]
pub fn rational_tanh(x: f32) -> f32 {
    let a = (2.0 * x).abs();
    let b = 24.0 + a * (12.0 + a * (6.0 + a));
    2.0 * (x * b) / (a * b + 48.0)
}

/// Third-order polynomial soft clip `x - x³/6`, input limited to ±√2.
#[inline]
pub fn cubic_soft_clip(x: f32) -> f32 {
    const ONE_SIXTH: f32 = 1.0 / 6.0;
    let x = x.clamp(-SQRT_2, SQRT_2);
    x - ONE_SIXTH * x * x * x
}

/// The saturating nonlinearity used inside the filter's feedback path.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shaper {
    /// Table lookup of `tanh` ([`fast_saturate`]).
    #[default]
    Table,
    /// [`rational_tanh`].
    Rational,
    /// [`cubic_soft_clip`].
    Cubic,
}

impl Shaper {
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Shaper::Table => fast_saturate(x),
            Shaper::Rational => rational_tanh(x),
            Shaper::Cubic => cubic_soft_clip(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Interpolation error bound for sin/cos at this resolution, plus slack
    /// for single-precision argument scaling.
    fn trig_tolerance() -> f32 {
        let h = TAU / TABLE_SIZE as f32;
        h * h / 8.0 + 1e-5
    }

    #[test]
    fn integer_indices_return_stored_samples() {
        for table in [&*SINE_TABLE, &*SATURATION_TABLE] {
            for (i, &stored) in table.samples().iter().enumerate() {
                assert_eq!(table.lookup(i as f32), stored, "index {i}");
            }
        }
    }

    #[test]
    fn tables_carry_a_guard_sample() {
        assert_eq!(SINE_TABLE.samples().len(), SINE_TABLE.intervals() + 1);
        assert_eq!(SINE_TABLE.samples()[TABLE_SIZE], SINE_TABLE.samples()[0]);
        assert!((SATURATION_TABLE.samples()[TABLE_SIZE] - 5.0f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn half_index_interpolates_midpoint() {
        let s = SATURATION_TABLE.samples();
        let mid = SATURATION_TABLE.lookup(10.5);
        assert!((mid - 0.5 * (s[10] + s[11])).abs() < 1e-7);
    }

    #[test]
    fn fast_sin_and_cos_track_std_over_several_periods() {
        let tolerance = trig_tolerance();
        let mut x = -3.0 * TAU;
        while x < 3.0 * TAU {
            assert!(
                (fast_sin(x) - x.sin()).abs() < tolerance,
                "sin({x}) = {} vs {}",
                fast_sin(x),
                x.sin()
            );
            assert!(
                (fast_cos(x) - x.cos()).abs() < tolerance,
                "cos({x}) = {} vs {}",
                fast_cos(x),
                x.cos()
            );
            x += 0.0137;
        }
    }

    #[test]
    fn sin_cos_matches_individual_calls() {
        let (s, c) = sin_cos(0.7);
        assert_eq!(s, fast_sin(0.7));
        assert_eq!(c, fast_cos(0.7));
    }

    #[test]
    fn saturate_is_odd() {
        let mut x = 0.0;
        while x < 8.0 {
            assert_eq!(fast_saturate(-x), -fast_saturate(x), "x = {x}");
            x += 0.031;
        }
    }

    #[test]
    fn saturate_is_monotone_and_hits_unity_at_ceiling() {
        let mut previous = fast_saturate(0.0);
        let mut x = 0.0;
        while x < 7.0 {
            x += 0.005;
            let y = fast_saturate(x);
            // one ulp of slack where neighbouring samples are nearly equal
            assert!(y + f32::EPSILON >= previous, "not monotone at {x}: {y} < {previous}");
            assert!(y <= 1.0);
            previous = y;
        }
        assert_eq!(fast_saturate(SATURATION_CEILING), 1.0);
        assert_eq!(fast_saturate(12.0), 1.0);
        assert_eq!(fast_saturate(-12.0), -1.0);
        assert_eq!(fast_saturate(f32::INFINITY), 1.0);
    }

    #[test]
    fn saturate_tracks_tanh() {
        let mut x = -4.9;
        while x < 4.9 {
            assert!((fast_saturate(x) - x.tanh()).abs() < 1e-4, "x = {x}");
            x += 0.013;
        }
    }

    #[test]
    fn nan_propagates() {
        assert!(fast_saturate(f32::NAN).is_nan());
    }

    #[test]
    fn alternative_shapers_are_unity_slope_near_zero() {
        for shaper in [Shaper::Table, Shaper::Rational, Shaper::Cubic] {
            let y = shaper.apply(0.01);
            assert!((y - 0.01).abs() < 1e-4, "{shaper:?}: {y}");
            assert_eq!(shaper.apply(-0.3), -shaper.apply(0.3));
        }
        assert!((rational_tanh(50.0) - 1.0).abs() < 0.05);
        assert!((cubic_soft_clip(10.0) - cubic_soft_clip(SQRT_2)).abs() < 1e-7);
    }
}
