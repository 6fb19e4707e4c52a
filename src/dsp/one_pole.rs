//! First-order lowpass/highpass, used as the feedback highpass of the ladder.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::sample_rate::SampleRate;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnePoleMode {
    Lowpass,
    Highpass,
}

/// `y[n] = b0·x[n] + b1·x[n-1] + a1·y[n-1]` with the pole at `e^(-2π fc/fs)`.
#[derive(Debug, Clone)]
pub struct OnePoleFilter {
    b0: f32,
    b1: f32,
    a1: f32,
    x1: f32,
    y1: f32,

    cutoff_hz: f32,
    sample_rate: SampleRate,
    mode: OnePoleMode,
}

impl OnePoleFilter {
    pub fn new(mode: OnePoleMode, cutoff_hz: f32, sample_rate: SampleRate) -> Self {
        let mut filter = Self {
            b0: 1.0,
            b1: 0.0,
            a1: 0.0,
            x1: 0.0,
            y1: 0.0,
            cutoff_hz,
            sample_rate,
            mode,
        };
        filter.calculate_coefficients();
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: SampleRate) -> Self {
        Self::new(OnePoleMode::Lowpass, cutoff_hz, sample_rate)
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: SampleRate) -> Self {
        Self::new(OnePoleMode::Highpass, cutoff_hz, sample_rate)
    }

    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
        self.calculate_coefficients();
    }

    /// Negative cutoffs are treated as 0 Hz.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(0.0);
        self.calculate_coefficients();
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_mode(&mut self, mode: OnePoleMode) {
        self.mode = mode;
        self.calculate_coefficients();
    }

    pub fn mode(&self) -> OnePoleMode {
        self.mode
    }

    fn calculate_coefficients(&mut self) {
        let x = (-TAU * self.cutoff_hz / self.sample_rate.hz()).exp();
        self.a1 = x;
        match self.mode {
            OnePoleMode::Lowpass => {
                self.b0 = 1.0 - x;
                self.b1 = 0.0;
            }
            OnePoleMode::Highpass => {
                self.b0 = 0.5 * (1.0 + x);
                self.b1 = -0.5 * (1.0 + x);
            }
        }
    }

    #[inline]
    pub fn get_sample(&mut self, input: f32) -> f32 {
        self.y1 = self.b0 * input + self.b1 * self.x1 + self.a1 * self.y1;
        self.x1 = input;
        self.y1
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}
