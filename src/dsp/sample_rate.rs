use std::f32::consts::TAU;

use crate::error::{Error, Result};

/// A validated audio sample rate in Hz.
///
/// Every component in this crate is built from a `SampleRate`, so there is
/// no "sample rate never set" state to fall into.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f32);

impl SampleRate {
    pub const CD: SampleRate = SampleRate(44_100.0);

    pub fn new(hz: f32) -> Result<Self> {
        if hz.is_finite() && hz > 0.0 {
            Ok(Self(hz))
        } else {
            Err(Error::InvalidSampleRate(hz))
        }
    }

    #[inline]
    pub fn hz(self) -> f32 {
        self.0
    }

    /// Seconds per sample.
    #[inline]
    pub fn period(self) -> f32 {
        1.0 / self.0
    }

    /// `2π / fs`, the factor that turns Hz into normalized radian frequency.
    #[inline]
    pub fn radians_per_hz(self) -> f32 {
        TAU / self.0
    }

    /// The rate after oversampling by `factor`.
    pub fn oversampled(self, factor: u32) -> Self {
        Self(self.0 * factor.max(1) as f32)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::CD
    }
}

impl TryFrom<f32> for SampleRate {
    type Error = Error;

    fn try_from(hz: f32) -> Result<Self> {
        Self::new(hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite_rates() {
        assert_eq!(SampleRate::new(0.0), Err(Error::InvalidSampleRate(0.0)));
        assert!(SampleRate::new(-48_000.0).is_err());
        assert!(SampleRate::new(f32::NAN).is_err());
        assert!(SampleRate::new(f32::INFINITY).is_err());
    }

    #[test]
    fn oversampling_multiplies_the_rate() {
        let rate = SampleRate::new(48_000.0).unwrap();
        assert_eq!(rate.oversampled(4).hz(), 192_000.0);
        assert_eq!(rate.oversampled(0).hz(), 48_000.0);
    }
}
