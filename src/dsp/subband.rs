//! 12th order elliptic quarter-band lowpass.
//!
//! Passes up to a quarter of its running sample rate and rejects the rest.
//! Running the voice at 4x oversampling, feeding every sample through this
//! filter and keeping one in four decimates back to the host rate without
//! folding the filter's distortion products into the audible band.

const A: [f64; 12] = [
    -9.189_160_465_218_947,
    40.177_553_696_870_497,
    -110.116_366_617_711_78,
    210.185_066_120_781_95,
    -293.847_447_719_032_4,
    308.163_455_583_592_34,
    -244.067_867_803_842_43,
    144.818_779_113_927_38,
    -62.770_692_151_724_198,
    18.867_762_095_902_137,
    -3.532_709_423_055_184_8,
    0.311_831_892_752_031_49,
];

const B0: f64 = 1.367_173_209_994_562_8e-4;
const B: [f64; 12] = [
    -5.553_850_126_560_638_4e-4,
    1.368_188_763_629_638_7e-3,
    -2.215_856_649_071_185_2e-3,
    2.832_009_100_727_832_2e-3,
    -2.977_693_315_109_041_3e-3,
    3.028_362_824_351_499_1e-3,
    -2.977_693_315_109_041_3e-3,
    2.832_009_100_727_833_1e-3,
    -2.215_856_649_071_186_1e-3,
    1.368_188_763_629_639_3e-3,
    -5.553_850_126_560_638_4e-4,
    1.367_173_209_994_563_6e-4,
];

const DENORMAL_GUARD: f64 = 1.0e-18;

/// Direct form II implementation; `w[0]` is the most recent state.
///
/// State and coefficients are kept in double precision: the poles sit close
/// to the unit circle and single precision moves them noticeably.
#[derive(Debug, Clone, Default)]
pub struct EllipticQuarterBandFilter {
    w: [f64; 12],
}

impl EllipticQuarterBandFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.w = [0.0; 12];
    }

    #[inline]
    pub fn get_sample(&mut self, input: f32) -> f32 {
        let w = &self.w;

        // paired sums give the out-of-order core independent additions
        let feedback = ((A[0] * w[0] + A[1] * w[1]) + (A[2] * w[2] + A[3] * w[3]))
            + ((A[4] * w[4] + A[5] * w[5]) + (A[6] * w[6] + A[7] * w[7]))
            + ((A[8] * w[8] + A[9] * w[9]) + (A[10] * w[10] + A[11] * w[11]));
        let tmp = (input as f64 + DENORMAL_GUARD) - feedback;

        let y = B0 * tmp
            + ((B[0] * w[0] + B[1] * w[1]) + (B[2] * w[2] + B[3] * w[3]))
            + ((B[4] * w[4] + B[5] * w[5]) + (B[6] * w[6] + B[7] * w[7]))
            + ((B[8] * w[8] + B[9] * w[9]) + (B[10] * w[10] + B[11] * w[11]));

        self.w.copy_within(0..11, 1);
        self.w[0] = tmp;
        y as f32
    }
}
