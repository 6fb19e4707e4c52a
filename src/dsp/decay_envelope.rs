use super::sample_rate::SampleRate;

const MIN_TAU_MS: f32 = 0.01;

/// Pure exponential decay, retriggered to its peak.
///
/// The multiplicative accumulator `y *= c` is primed with `1/c` on trigger, so
/// the first sample after [`trigger`](Self::trigger) is exactly 1. With sum
/// normalization it is primed with `(1 - c)/c` instead and the impulse
/// response sums to 1, matching a leaky integrator.
#[derive(Debug, Clone)]
pub struct DecayEnvelope {
    c: f32,
    y: f32,
    y_init: f32,
    tau_ms: f32,
    sample_rate: SampleRate,
    normalize_sum: bool,
}

impl DecayEnvelope {
    pub fn new(sample_rate: SampleRate) -> Self {
        let mut env = Self {
            c: 1.0,
            y: 0.0,
            y_init: 1.0,
            tau_ms: 200.0,
            sample_rate,
            normalize_sum: false,
        };
        env.calculate_coefficient();
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        self.sample_rate = sample_rate;
        self.calculate_coefficient();
    }

    /// Decay time constant in milliseconds.
    pub fn set_decay_time_constant(&mut self, tau_ms: f32) {
        self.tau_ms = tau_ms.max(MIN_TAU_MS);
        self.calculate_coefficient();
    }

    pub fn decay_time_constant(&self) -> f32 {
        self.tau_ms
    }

    pub fn set_normalize_sum(&mut self, normalize_sum: bool) {
        self.normalize_sum = normalize_sum;
        self.calculate_coefficient();
    }

    fn calculate_coefficient(&mut self) {
        self.c = (-1.0 / (0.001 * self.tau_ms * self.sample_rate.hz())).exp();
        self.y_init = if self.normalize_sum {
            (1.0 - self.c) / self.c
        } else {
            1.0 / self.c
        };
    }

    pub fn trigger(&mut self) {
        self.y = self.y_init;
    }

    #[inline]
    pub fn get_sample(&mut self) -> f32 {
        self.y *= self.c;
        self.y
    }

    pub fn end_is_reached(&self, threshold: f32) -> bool {
        self.y < threshold
    }
}
