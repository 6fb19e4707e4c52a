//! Leaky integrator: an RC lowpass whose time constant is set in milliseconds.
//!
//! In a 303 voice two of these in series smooth the accent pulse that gets
//! added to the filter envelope. [`LeakyIntegrator::normalizer`] gives the
//! gain that scales the peak of that two-stage impulse response to unity.

use super::sample_rate::SampleRate;

#[derive(Debug, Clone)]
pub struct LeakyIntegrator {
    coeff: f32,
    y1: f32,
    tau_ms: f32,
    sample_rate: SampleRate,
}

/// Pole of an RC stage with time constant `tau_ms`. Zero for `tau_ms <= 0`.
fn pole(tau_ms: f64, sample_rate: f64) -> f64 {
    if tau_ms > 0.0 {
        (-1.0 / (sample_rate * 0.001 * tau_ms)).exp()
    } else {
        0.0
    }
}

impl LeakyIntegrator {
    pub fn new(tau_ms: f32, sample_rate: SampleRate) -> Self {
        let mut integrator = Self {
            coeff: 0.0,
            y1: 0.0,
            tau_ms: tau_ms.max(0.0),
            sample_rate,
        };
        integrator.calculate_coefficient();
        integrator
    }

    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
        self.calculate_coefficient();
    }

    /// Time constant tau in milliseconds. Zero makes the integrator a wire.
    pub fn set_time_constant(&mut self, tau_ms: f32) {
        self.tau_ms = tau_ms.max(0.0);
        self.calculate_coefficient();
    }

    pub fn time_constant(&self) -> f32 {
        self.tau_ms
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    pub fn set_state(&mut self, state: f32) {
        self.y1 = state;
    }

    fn calculate_coefficient(&mut self) {
        self.coeff = pole(self.tau_ms as f64, self.sample_rate.hz() as f64) as f32;
    }

    #[inline]
    pub fn get_sample(&mut self, input: f32) -> f32 {
        self.y1 = input + self.coeff * (self.y1 - input);
        self.y1
    }

    pub fn reset(&mut self) {
        self.y1 = 0.0;
    }

    /// Gain that normalizes the peak of the impulse response of two cascaded
    /// integrators with time constants `tau1_ms` and `tau2_ms` to 1.
    pub fn normalizer(tau1_ms: f32, tau2_ms: f32, sample_rate: SampleRate) -> f32 {
        let fs = sample_rate.hz() as f64;
        let (t1, t2) = (0.001 * tau1_ms.max(0.0) as f64, 0.001 * tau2_ms.max(0.0) as f64);
        let (p1, p2) = (pole(tau1_ms as f64, fs), pole(tau2_ms as f64, fs));
        let gain = (1.0 - p1) * (1.0 - p2);

        // h[n] = g · Σ p1^k · p2^(n-k), k = 0..=n
        let response = |n: i32| -> f64 {
            if (p1 - p2).abs() < 1e-12 {
                gain * (n + 1) as f64 * p1.powi(n)
            } else {
                gain * (p1.powi(n + 1) - p2.powi(n + 1)) / (p1 - p2)
            }
        };

        // continuous-time peak of the two-RC response, refined on the sample grid
        let peak_time = if t1 == 0.0 || t2 == 0.0 {
            0.0
        } else if (t1 - t2).abs() < 1e-12 {
            t1
        } else {
            (t1 / t2).ln() / ((t1 - t2) / (t1 * t2))
        };
        let center = (fs * peak_time).round() as i32;
        let peak = (center - 2..=center + 2)
            .filter(|&n| n >= 0)
            .map(response)
            .fold(0.0f64, f64::max);

        if peak > 0.0 {
            (1.0 / peak) as f32
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: SampleRate = SampleRate::CD;

    #[test]
    fn step_response_reaches_63_percent_after_tau() {
        let mut integrator = LeakyIntegrator::new(10.0, RATE);
        let samples = (0.010 * RATE.hz()) as usize;
        let mut y = 0.0;
        for _ in 0..samples {
            y = integrator.get_sample(1.0);
        }
        assert!((y - 0.632).abs() < 0.01, "after one tau: {y}");
    }

    #[test]
    fn zero_time_constant_is_a_wire() {
        let mut integrator = LeakyIntegrator::new(0.0, RATE);
        assert_eq!(integrator.get_sample(0.7), 0.7);
        assert_eq!(integrator.get_sample(-0.2), -0.2);
    }

    #[test]
    fn normalizer_scales_cascade_peak_to_unity() {
        for (tau1, tau2) in [(3.0, 10.0), (10.0, 3.0), (5.0, 5.0), (0.0, 7.0)] {
            let mut a = LeakyIntegrator::new(tau1, RATE);
            let mut b = LeakyIntegrator::new(tau2, RATE);
            let gain = LeakyIntegrator::normalizer(tau1, tau2, RATE);

            let mut peak = 0.0f32;
            for n in 0..10_000 {
                let x = if n == 0 { gain } else { 0.0 };
                peak = peak.max(b.get_sample(a.get_sample(x)));
            }
            assert!((peak - 1.0).abs() < 1e-3, "taus {tau1}/{tau2}: peak {peak}");
        }
    }

    #[test]
    fn normalizer_of_two_wires_is_unity() {
        assert_eq!(LeakyIntegrator::normalizer(0.0, 0.0, RATE), 1.0);
    }
}
