//! Impulse response statistics of a filter setting.

use rustfft::{num_complex::Complex, FftPlanner};
use teebee_dsp::dsp::{convert::amp_to_db, SampleRate, TeeBeeFilter};

const RESPONSE_LEN: usize = 1 << 14;

pub struct ImpulseReport {
    pub peak_index: usize,
    pub peak: f32,
    /// First sample after the peak from which the response stays below 1 %
    /// of it. `None` if it never settles within the analysed window.
    pub settle_index: Option<usize>,
    pub dominant_hz: f32,
}

impl ImpulseReport {
    pub fn peak_db(&self) -> f32 {
        amp_to_db(self.peak)
    }
}

pub fn impulse_response(filter: &mut TeeBeeFilter, len: usize) -> Vec<f32> {
    filter.reset();
    (0..len)
        .map(|n| filter.get_sample(if n == 0 { 1.0 } else { 0.0 }))
        .collect()
}

/// Frequency of the strongest non-DC bin.
pub fn dominant_frequency(samples: &[f32], sample_rate: SampleRate) -> f32 {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());
    let mut spectrum: Vec<Complex<f32>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut spectrum);

    let half = samples.len() / 2;
    let bin = spectrum[1..half]
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.norm_sqr().total_cmp(&b.norm_sqr()))
        .map_or(0, |(i, _)| i + 1);
    bin as f32 * sample_rate.hz() / samples.len() as f32
}

pub fn analyze(filter: &mut TeeBeeFilter) -> ImpulseReport {
    let response = impulse_response(filter, RESPONSE_LEN);

    let (peak_index, peak) = response
        .iter()
        .enumerate()
        .map(|(i, x)| (i, x.abs()))
        .fold((0, 0.0f32), |best, (i, x)| if x > best.1 { (i, x) } else { best });

    let floor = 0.01 * peak;
    let settle_index = response
        .iter()
        .rposition(|x| x.abs() >= floor)
        .map(|last| last + 1)
        .filter(|&i| i < response.len());

    ImpulseReport {
        peak_index,
        peak,
        settle_index,
        dominant_hz: dominant_frequency(&response, filter.sample_rate()),
    }
}
