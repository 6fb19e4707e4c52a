//! A monophonic acid voice assembled from the library components.

use teebee_dsp::{
    dsp::{
        convert::{db_to_amp, midi_note_to_freq},
        AnalogEnvelope, DecayEnvelope, EllipticQuarterBandFilter, LeakyIntegrator, SampleRate,
        TeeBeeFilter,
    },
    patch::VoicePatch,
};

const OVERSAMPLING: u32 = 4;

/// Naive (aliasing) sawtooth. Good enough when the voice runs oversampled.
#[derive(Default)]
pub struct Saw {
    phase: f32,
    increment: f32,
}

impl Saw {
    pub fn set_frequency(&mut self, hz: f32, sample_rate: SampleRate) {
        self.increment = hz * sample_rate.period();
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = 2.0 * self.phase - 1.0;
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }
}

pub struct AcidVoice {
    core: VoiceCore,
    anti_alias: Option<EllipticQuarterBandFilter>,
}

/// Everything that runs at the internal rate.
struct VoiceCore {
    patch: VoicePatch,
    saw: Saw,
    filter: TeeBeeFilter,
    amp_env: AnalogEnvelope,
    filter_env: DecayEnvelope,
    accent_attack: LeakyIntegrator,
    accent_decay: LeakyIntegrator,
    accent_gain: f32,
    accent_pulse: f32,
    internal_rate: SampleRate,
}

impl AcidVoice {
    pub fn new(patch: VoicePatch, host_rate: SampleRate) -> Self {
        let internal_rate = if patch.oversample {
            host_rate.oversampled(OVERSAMPLING)
        } else {
            host_rate
        };

        let mut filter = TeeBeeFilter::new(internal_rate);
        let mut amp_env = AnalogEnvelope::new(internal_rate);
        patch.apply_to(&mut filter, &mut amp_env);

        let filter_env = DecayEnvelope::new(internal_rate);
        let mut accent_attack = LeakyIntegrator::new(0.0, internal_rate);
        let mut accent_decay = LeakyIntegrator::new(0.0, internal_rate);
        let accent_gain = patch
            .accent
            .apply_to_smoothing(&mut accent_attack, &mut accent_decay);

        let anti_alias = patch.oversample.then(EllipticQuarterBandFilter::new);

        tracing::debug!(
            rate = internal_rate.hz(),
            oversample = patch.oversample,
            "acid voice ready"
        );

        let core = VoiceCore {
            patch,
            saw: Saw::default(),
            filter,
            amp_env,
            filter_env,
            accent_attack,
            accent_decay,
            accent_gain,
            accent_pulse: 0.0,
            internal_rate,
        };
        Self { core, anti_alias }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, accent: bool) {
        self.core.note_on(note, velocity, accent);
    }

    pub fn note_off(&mut self) {
        self.core.amp_env.note_off();
    }

    /// Renders one block at the host rate.
    pub fn render(&mut self, out: &mut [f32]) {
        let core = &mut self.core;
        match self.anti_alias.as_mut() {
            Some(decimator) => {
                for sample in out.iter_mut() {
                    let mut y = 0.0;
                    for _ in 0..OVERSAMPLING {
                        y = decimator.get_sample(core.tick());
                    }
                    *sample = y;
                }
            }
            None => {
                for sample in out.iter_mut() {
                    *sample = core.tick();
                }
            }
        }
    }
}

impl VoiceCore {
    fn note_on(&mut self, note: u8, velocity: u8, accent: bool) {
        self.saw
            .set_frequency(midi_note_to_freq(note), self.internal_rate);
        self.patch.accent.apply_to(&mut self.filter_env, accent);
        self.filter_env.trigger();

        let boost = if accent {
            db_to_amp(self.patch.accent.accent_gain_db)
        } else {
            1.0
        };
        self.amp_env.set_peak_scale(boost);
        self.amp_env.note_on(false, note, velocity);

        if accent {
            self.accent_pulse = self.accent_gain;
        }
    }

    #[inline]
    fn tick(&mut self) -> f32 {
        let accent = self
            .accent_decay
            .get_sample(self.accent_attack.get_sample(self.accent_pulse));
        self.accent_pulse = 0.0;

        let accent_patch = &self.patch.accent;
        let octaves = accent_patch.env_mod_octaves * self.filter_env.get_sample()
            + accent_patch.accent_octaves * accent;
        self.filter
            .set_cutoff(self.patch.filter.cutoff_hz * octaves.exp2());

        let filtered = self.filter.get_sample(self.saw.next_sample());
        filtered * self.amp_env.get_sample()
    }
}

/// A sixteen-step acid line: MIDI note and accent flag.
pub const ACID_LINE: [(u8, bool); 16] = [
    (36, false),
    (36, true),
    (48, false),
    (36, false),
    (39, false),
    (36, true),
    (41, false),
    (43, false),
    (36, false),
    (48, true),
    (46, false),
    (36, false),
    (39, true),
    (41, false),
    (36, false),
    (34, true),
];
