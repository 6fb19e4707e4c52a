use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    convert::db_to_amp,
    fast_math::{self, Shaper},
    one_pole::OnePoleFilter,
    sample_rate::SampleRate,
};
use crate::error::Error;

/*
Ladder Filter
=============

Four one-pole lowpass stages in series with the output of the last stage fed
back, inverted, into the input. Around the cutoff every stage shifts the phase
by 45°, so the four of them turn the negative feedback into positive feedback
at exactly one frequency: that is the resonance peak, and with enough feedback
gain the filter rings on its own.

    in ──(+)──► [stage 1] ─► [stage 2] ─► [stage 3] ─► [stage 4] ──┬──► y4
          ▲ -                                                      │
          └──── highpass ◄── k · shape(·) ◄────────────────────────┘

The shaper in the loop is what keeps self-oscillation bounded: once y4 grows
large the effective feedback gain drops below the oscillation threshold. The
highpass in the loop removes DC from the feedback so resonance thins out the
bass the way the hardware does.


Output Modes
------------

Every stage output is available, and mixing them with binomial weights gives
the classic multimode family from a single ladder:

| mode        | c0 | c1 | c2 | c3 | c4 |
| ----------- | -- | -- | -- | -- | -- |
| flat        |  1 |    |    |    |    |
| lowpass 6   |    |  1 |    |    |    |
| lowpass 12  |    |    |  1 |    |    |
| lowpass 18  |    |    |    |  1 |    |
| lowpass 24  |    |    |    |    |  1 |
| highpass 6  |  1 | -1 |    |    |    |
| highpass 12 |  1 | -2 |  1 |    |    |
| highpass 18 |  1 | -3 |  3 | -1 |    |
| highpass 24 |  1 | -4 |  6 | -4 |  1 |
| bp 12/12    |    |    |  1 | -2 |  1 |
| bp 6/18     |    |    |    |  1 | -1 |
| bp 18/6     |    |  1 | -3 |  3 | -1 |
| bp 6/12     |    |    |  1 | -1 |    |
| bp 12/6     |    |  1 | -2 |  1 |    |
| bp 6/6      |    |  1 | -1 |    |    |

The TB-303 mode is not a weighting: the hardware ladder couples neighbouring
stages (diode ladder), so it runs its own update equations.


Coefficients
------------

Each stage computes `y[n] = b0·x[n] - a1·y[n-1]` with `b0 = 1 + a1`, i.e. a
leaky integrator with unity DC gain. Two ways to get `a1` and `k`:

  exact     solve for the pole that puts the resonance peak exactly on the
            cutoff, blend it with the plain pole by resonance, then divide
            the resonance by the ladder's gain at the peak to get `k`.

  approx4   polynomial fits in the normalized radian cutoff `wc`, valid up to
            `wc = π/4` (an eighth of the sample rate) and held at `π/2`
            beyond that. The TB-303 fits for `b0`, `k` and `g` see the
            unheld cutoff. Cheap enough to run on every cutoff change at audio
            rate. At 4x oversampling the whole audio band is inside the fit.

Setters always go through approx4.
*/

const DENORMAL_GUARD: f32 = 1.0e-18;

/// Highest normalized radian cutoff fed to the polynomial fits. Past a
/// quarter of the sample rate the pole fit leaves the unit circle.
const MAX_APPROX_WC: f32 = FRAC_PI_2;

pub const MIN_CUTOFF: f32 = 200.0;
pub const MAX_CUTOFF: f32 = 20_000.0;
pub const DEFAULT_FEEDBACK_HIGHPASS: f32 = 150.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Flat,
    Lowpass6,
    Lowpass12,
    Lowpass18,
    Lowpass24,
    Highpass6,
    Highpass12,
    Highpass18,
    Highpass24,
    Bandpass12_12,
    Bandpass6_18,
    Bandpass18_6,
    Bandpass6_12,
    Bandpass12_6,
    Bandpass6_6,
    #[default]
    Tb303,
}

impl FilterMode {
    pub const ALL: [FilterMode; 16] = [
        FilterMode::Flat,
        FilterMode::Lowpass6,
        FilterMode::Lowpass12,
        FilterMode::Lowpass18,
        FilterMode::Lowpass24,
        FilterMode::Highpass6,
        FilterMode::Highpass12,
        FilterMode::Highpass18,
        FilterMode::Highpass24,
        FilterMode::Bandpass12_12,
        FilterMode::Bandpass6_18,
        FilterMode::Bandpass18_6,
        FilterMode::Bandpass6_12,
        FilterMode::Bandpass12_6,
        FilterMode::Bandpass6_6,
        FilterMode::Tb303,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Flat => "flat",
            FilterMode::Lowpass6 => "lowpass6",
            FilterMode::Lowpass12 => "lowpass12",
            FilterMode::Lowpass18 => "lowpass18",
            FilterMode::Lowpass24 => "lowpass24",
            FilterMode::Highpass6 => "highpass6",
            FilterMode::Highpass12 => "highpass12",
            FilterMode::Highpass18 => "highpass18",
            FilterMode::Highpass24 => "highpass24",
            FilterMode::Bandpass12_12 => "bandpass12_12",
            FilterMode::Bandpass6_18 => "bandpass6_18",
            FilterMode::Bandpass18_6 => "bandpass18_6",
            FilterMode::Bandpass6_12 => "bandpass6_12",
            FilterMode::Bandpass12_6 => "bandpass12_6",
            FilterMode::Bandpass6_6 => "bandpass6_6",
            FilterMode::Tb303 => "tb303",
        }
    }

    pub fn topology(self) -> Topology {
        let weights = match self {
            FilterMode::Flat => [1.0, 0.0, 0.0, 0.0, 0.0],
            FilterMode::Lowpass6 => [0.0, 1.0, 0.0, 0.0, 0.0],
            FilterMode::Lowpass12 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::Lowpass18 => [0.0, 0.0, 0.0, 1.0, 0.0],
            FilterMode::Lowpass24 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::Highpass6 => [1.0, -1.0, 0.0, 0.0, 0.0],
            FilterMode::Highpass12 => [1.0, -2.0, 1.0, 0.0, 0.0],
            FilterMode::Highpass18 => [1.0, -3.0, 3.0, -1.0, 0.0],
            FilterMode::Highpass24 => [1.0, -4.0, 6.0, -4.0, 1.0],
            FilterMode::Bandpass12_12 => [0.0, 0.0, 1.0, -2.0, 1.0],
            FilterMode::Bandpass6_18 => [0.0, 0.0, 0.0, 1.0, -1.0],
            FilterMode::Bandpass18_6 => [0.0, 1.0, -3.0, 3.0, -1.0],
            FilterMode::Bandpass6_12 => [0.0, 0.0, 1.0, -1.0, 0.0],
            FilterMode::Bandpass12_6 => [0.0, 1.0, -2.0, 1.0, 0.0],
            FilterMode::Bandpass6_6 => [0.0, 1.0, -1.0, 0.0, 0.0],
            FilterMode::Tb303 => return Topology::Authentic,
        };
        Topology::Cascade(ModeWeights(weights))
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterMode {
    type Err = Error;

    /// Case-insensitive; `-` may stand in for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        FilterMode::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

/// Output weights `c0..c4` applied to the input stage and the four ladder
/// stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeWeights(pub [f32; 5]);

impl ModeWeights {
    #[inline]
    fn mix(&self, y: [f32; 5]) -> f32 {
        let c = &self.0;
        c[0] * y[0] + c[1] * y[1] + c[2] * y[2] + c[3] * y[3] + c[4] * y[4]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Topology {
    /// Four decoupled one-pole stages, mixed by weight.
    Cascade(ModeWeights),
    /// Coupled stages of the TB-303 diode ladder.
    Authentic,
}

/// Snapshot of the per-sample coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub a1: f32,
    pub b0: f32,
    /// Feedback gain.
    pub k: f32,
    /// Output gain.
    pub g: f32,
}

pub struct TeeBeeFilter {
    coefficients: Coefficients,
    y1: f32,
    y2: f32,
    y3: f32,
    y4: f32,

    topology: Topology,
    mode: FilterMode,
    shaper: Shaper,
    feedback_highpass: OnePoleFilter,

    cutoff: f32,
    drive: f32,
    drive_factor: f32,
    resonance_raw: f32,
    resonance_skewed: f32,
    sample_rate: SampleRate,
}

impl TeeBeeFilter {
    pub fn new(sample_rate: SampleRate) -> Self {
        fast_math::warm_up();

        let mut filter = Self {
            coefficients: Coefficients {
                a1: -1.0,
                b0: 0.0,
                k: 0.0,
                g: 1.0,
            },
            y1: 0.0,
            y2: 0.0,
            y3: 0.0,
            y4: 0.0,

            topology: FilterMode::Tb303.topology(),
            mode: FilterMode::Tb303,
            shaper: Shaper::default(),
            feedback_highpass: OnePoleFilter::highpass(DEFAULT_FEEDBACK_HIGHPASS, sample_rate),

            cutoff: 1000.0,
            drive: 0.0,
            drive_factor: 1.0,
            resonance_raw: 0.0,
            resonance_skewed: 0.0,
            sample_rate,
        };
        filter.calculate_coefficients_approx4();
        filter
    }

    /// A filter in `mode` with the other parameters at their defaults.
    pub fn with_mode(mode: FilterMode, sample_rate: SampleRate) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_mode(mode);
        filter
    }

    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        tracing::debug!(sample_rate = sample_rate.hz(), "tee bee filter sample rate");
        self.sample_rate = sample_rate;
        self.feedback_highpass.set_sample_rate(sample_rate);
        self.calculate_coefficients_approx4();
    }

    /// Cutoff in Hz, clamped to [`MIN_CUTOFF`]..=[`MAX_CUTOFF`].
    pub fn set_cutoff(&mut self, hz: f32) {
        self.stage_cutoff(hz);
        self.calculate_coefficients_approx4();
    }

    /// Stores a new cutoff without recomputing coefficients. Call
    /// [`update_coefficients`](Self::update_coefficients) once all staged
    /// parameters are in.
    pub fn stage_cutoff(&mut self, hz: f32) {
        self.cutoff = hz.clamp(MIN_CUTOFF, MAX_CUTOFF);
    }

    /// Resonance in percent, clamped to 0..=100.
    pub fn set_resonance(&mut self, percent: f32) {
        self.stage_resonance(percent);
        self.calculate_coefficients_approx4();
    }

    pub fn stage_resonance(&mut self, percent: f32) {
        self.resonance_raw = 0.01 * percent.clamp(0.0, 100.0);
        self.resonance_skewed = (1.0 - (-3.0 * self.resonance_raw).exp()) / (1.0 - (-3.0f32).exp());
    }

    pub fn update_coefficients(&mut self) {
        self.calculate_coefficients_approx4();
    }

    /// Input gain in dB; not applied in [`FilterMode::Tb303`].
    pub fn set_drive(&mut self, db: f32) {
        self.drive = db;
        self.drive_factor = db_to_amp(db);
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        tracing::debug!(mode = %mode, "tee bee filter mode");
        self.mode = mode;
        self.topology = mode.topology();
        self.calculate_coefficients_approx4();
    }

    pub fn set_feedback_highpass_cutoff(&mut self, hz: f32) {
        self.feedback_highpass.set_cutoff(hz);
    }

    pub fn set_shaper(&mut self, shaper: Shaper) {
        self.shaper = shaper;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Resonance in percent.
    pub fn resonance(&self) -> f32 {
        self.resonance_raw * 100.0
    }

    /// Resonance after the exponential skew, 0..=1.
    pub fn resonance_skewed(&self) -> f32 {
        self.resonance_skewed
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn shaper(&self) -> Shaper {
        self.shaper
    }

    pub fn feedback_highpass_cutoff(&self) -> f32 {
        self.feedback_highpass.cutoff()
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Solves for the resonance-tuned pole directly. Sets `g = 1`.
    pub fn calculate_coefficients_exact(&mut self) {
        let wc = self.sample_rate.radians_per_hz() * self.cutoff;
        let (s, c) = fast_math::sin_cos(wc);
        let t = (0.25 * (wc - PI)).tan();
        let r = self.resonance_skewed;

        // pole that puts the resonance peak on the cutoff, and the plain one
        let a1_full_res = t / (s - c * t);
        let a1_no_res = -(-wc).exp();
        let a1 = r * a1_full_res + (1.0 - r) * a1_no_res;
        let b0 = 1.0 + a1;

        // feedback = resonance / ladder magnitude at the peak
        let gsq = b0 * b0 / (1.0 + a1 * a1 + 2.0 * a1 * c);
        let mut k = r / (gsq * gsq);
        if self.topology == Topology::Authentic {
            k *= 4.25;
        }

        self.coefficients = Coefficients { a1, b0, k, g: 1.0 };
    }

    /// Polynomial fits of the exact solution at full resonance, accurate up
    /// to an eighth of the sample rate and held at [`MAX_APPROX_WC`] above a
    /// quarter of it. The TB-303 mode replaces `b0`, `k` and `g` by fits
    /// measured on the hardware ladder, which follow the cutoff unheld.
    #[allow(clippy::excessive_precision)]
    pub fn calculate_coefficients_approx4(&mut self) {
        let wc_raw = self.sample_rate.radians_per_hz() * self.cutoff;
        let wc = wc_raw.min(MAX_APPROX_WC);
        let wc2 = wc * wc;
        let r = self.resonance_skewed;

        const PA12: f32 = -1.341281325101042e-02;
        const PA11: f32 = 8.168739417977708e-02;
        const PA10: f32 = -2.365036766021623e-01;
        const PA09: f32 = 4.439739664918068e-01;
        const PA08: f32 = -6.297350825423579e-01;
        const PA07: f32 = 7.529691648678890e-01;
        const PA06: f32 = -8.249882473764324e-01;
        const PA05: f32 = 8.736418933533319e-01;
        const PA04: f32 = -9.164580250284832e-01;
        const PA03: f32 = 9.583192455599817e-01;
        const PA02: f32 = -9.999994950291231e-01;
        const PA01: f32 = 9.999999927726119e-01;
        const PA00: f32 = -9.999999999857464e-01;

        // nested quadratic factors instead of plain Horner
        let mut tmp = wc2 * PA12 + PA11 * wc + PA10;
        tmp = wc2 * tmp + PA09 * wc + PA08;
        tmp = wc2 * tmp + PA07 * wc + PA06;
        tmp = wc2 * tmp + PA05 * wc + PA04;
        tmp = wc2 * tmp + PA03 * wc + PA02;
        let a1 = wc2 * tmp + PA01 * wc + PA00;
        let mut b0 = 1.0 + a1;

        const PR8: f32 = -4.554677015609929e-05;
        const PR7: f32 = -2.022131730719448e-05;
        const PR6: f32 = 2.784706718370008e-03;
        const PR5: f32 = 2.079921151733780e-03;
        const PR4: f32 = -8.333236384240325e-02;
        const PR3: f32 = -1.666668203490468e-01;
        const PR2: f32 = 1.000000012124230e+00;
        const PR1: f32 = 3.999999999650040e+00;
        const PR0: f32 = 4.000000000000113e+00;

        let mut tmp = wc2 * PR8 + PR7 * wc + PR6;
        tmp = wc2 * tmp + PR5 * wc + PR4;
        tmp = wc2 * tmp + PR3 * wc + PR2;
        tmp = wc2 * tmp + PR1 * wc + PR0;
        let mut k = r * tmp;
        let mut g = 1.0;

        if self.topology == Topology::Authentic {
            // the hardware fit is bounded over the whole cutoff range
            let fx = wc_raw * FRAC_1_SQRT_2 / TAU;
            b0 = (0.00045522346 + 6.1922189 * fx) / (1.0 + 12.358354 * fx + 4.4156345 * (fx * fx));
            k = fx * (fx * (fx * (fx * (fx * (fx + 7198.6997) - 5837.7917) - 476.47308) + 614.95611) + 213.87126)
                + 16.998792;
            g = k * (1.0 / 17.0);
            g = (g - 1.0) * r + 1.0;
            g *= 1.0 + r;
            k *= r;
        }

        self.coefficients = Coefficients { a1, b0, k, g };
    }

    /// Clears the ladder stages and the feedback highpass.
    pub fn reset(&mut self) {
        self.y1 = 0.0;
        self.y2 = 0.0;
        self.y3 = 0.0;
        self.y4 = 0.0;
        self.feedback_highpass.reset();
    }

    #[inline]
    pub fn get_sample(&mut self, input: f32) -> f32 {
        let Coefficients { a1, b0, k, g } = self.coefficients;
        let input = input + DENORMAL_GUARD;
        let feedback = self
            .feedback_highpass
            .get_sample(k * self.shaper.apply(self.y4));

        match self.topology {
            Topology::Authentic => {
                let y0 = input - feedback;
                self.y1 += 2.0 * b0 * (y0 - self.y1 + self.y2);
                self.y2 += b0 * (self.y1 - 2.0 * self.y2 + self.y3);
                self.y3 += b0 * (self.y2 - 2.0 * self.y3 + self.y4);
                self.y4 += b0 * (self.y3 - 2.0 * self.y4);
                2.0 * g * self.y4
            }
            Topology::Cascade(weights) => {
                let y0 = 0.125 * self.drive_factor * input - feedback;
                self.y1 = b0 * y0 - a1 * self.y1;
                self.y2 = b0 * self.y1 - a1 * self.y2;
                self.y3 = b0 * self.y2 - a1 * self.y3;
                self.y4 = b0 * self.y3 - a1 * self.y4;
                8.0 * weights.mix([y0, self.y1, self.y2, self.y3, self.y4])
            }
        }
    }

    /// Filter a block in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.get_sample(*sample);
        }
    }
}
