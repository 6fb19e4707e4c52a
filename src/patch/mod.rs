//! Serializable voice settings.
//!
//! Every field carries the unit its component setter accepts, so applying a
//! patch is a straight sequence of setter calls. Missing fields fall back to
//! the component defaults when deserializing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    fast_math::Shaper,
    filter::{FilterMode, TeeBeeFilter, DEFAULT_FEEDBACK_HIGHPASS},
    AnalogEnvelope, DecayEnvelope, LeakyIntegrator,
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPatch {
    pub mode: FilterMode,
    pub cutoff_hz: f32,
    /// Percent, 0..=100.
    pub resonance: f32,
    pub drive_db: f32,
    pub feedback_highpass_hz: f32,
    pub shaper: Shaper,
}

impl Default for FilterPatch {
    fn default() -> Self {
        Self {
            mode: FilterMode::Tb303,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            drive_db: 0.0,
            feedback_highpass_hz: DEFAULT_FEEDBACK_HIGHPASS,
            shaper: Shaper::Table,
        }
    }
}

impl FilterPatch {
    pub fn apply_to(&self, filter: &mut TeeBeeFilter) {
        filter.set_mode(self.mode);
        filter.stage_cutoff(self.cutoff_hz);
        filter.stage_resonance(self.resonance);
        filter.update_coefficients();
        filter.set_drive(self.drive_db);
        filter.set_feedback_highpass_cutoff(self.feedback_highpass_hz);
        filter.set_shaper(self.shaper);
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopePatch {
    pub attack_ms: f32,
    pub hold_ms: f32,
    pub decay_ms: f32,
    pub release_ms: f32,
    pub start: f32,
    pub peak: f32,
    pub sustain: f32,
    pub end: f32,
    /// Peak multiplier at velocity 127.
    pub peak_by_velocity: f32,
    pub time_scale: f32,
    pub tau_scale: f32,
}

impl Default for EnvelopePatch {
    fn default() -> Self {
        Self {
            attack_ms: 0.0,
            hold_ms: 0.0,
            decay_ms: 1000.0,
            release_ms: 10.0,
            start: 0.0,
            peak: 1.0,
            sustain: 0.5,
            end: 0.0,
            peak_by_velocity: 1.0,
            time_scale: 1.0,
            tau_scale: 1.0,
        }
    }
}

impl EnvelopePatch {
    pub fn apply_to(&self, env: &mut AnalogEnvelope) {
        env.set_attack(self.attack_ms);
        env.set_hold(self.hold_ms);
        env.set_decay(self.decay_ms);
        env.set_release(self.release_ms);
        env.set_start_level(self.start);
        env.set_peak_level(self.peak);
        env.set_sustain_level(self.sustain);
        env.set_end_level(self.end);
        env.set_peak_level_by_vel(self.peak_by_velocity);
        env.set_time_scale(self.time_scale);
        env.set_tau_scale(self.tau_scale);
    }
}

/// Filter envelope modulation and the accent circuit of a 303 voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct AccentPatch {
    /// Decay of the filter envelope on unaccented notes.
    pub normal_decay_ms: f32,
    /// Decay of the filter envelope on accented notes.
    pub accent_decay_ms: f32,
    /// Filter envelope depth in octaves above the cutoff.
    pub env_mod_octaves: f32,
    /// Extra cutoff push of an accent, in octaves.
    pub accent_octaves: f32,
    /// Attack and decay of the two integrators smoothing the accent pulse.
    pub smoothing_attack_ms: f32,
    pub smoothing_decay_ms: f32,
    /// Amplitude boost of accented notes.
    pub accent_gain_db: f32,
}

impl Default for AccentPatch {
    fn default() -> Self {
        Self {
            normal_decay_ms: 1000.0,
            accent_decay_ms: 200.0,
            env_mod_octaves: 2.0,
            accent_octaves: 1.0,
            smoothing_attack_ms: 3.0,
            smoothing_decay_ms: 30.0,
            accent_gain_db: 6.0,
        }
    }
}

impl AccentPatch {
    /// Loads the decay time for the next note into the filter envelope.
    pub fn apply_to(&self, filter_env: &mut DecayEnvelope, accented: bool) {
        let decay = if accented {
            self.accent_decay_ms
        } else {
            self.normal_decay_ms
        };
        filter_env.set_decay_time_constant(decay);
    }

    /// Configures the accent smoothing cascade and returns the gain that
    /// normalizes its impulse response to a unit peak.
    pub fn apply_to_smoothing(&self, attack: &mut LeakyIntegrator, decay: &mut LeakyIntegrator) -> f32 {
        attack.set_time_constant(self.smoothing_attack_ms);
        decay.set_time_constant(self.smoothing_decay_ms);
        LeakyIntegrator::normalizer(self.smoothing_attack_ms, self.smoothing_decay_ms, attack.sample_rate())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoicePatch {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    pub filter: FilterPatch,
    pub amp_envelope: EnvelopePatch,
    pub accent: AccentPatch,
    /// Run the voice at 4x the host rate and decimate through the
    /// quarter-band filter.
    pub oversample: bool,
}

impl Default for VoicePatch {
    fn default() -> Self {
        Self {
            name: "init".to_string(),
            description: None,
            filter: FilterPatch::default(),
            amp_envelope: EnvelopePatch {
                attack_ms: 0.0,
                decay_ms: 1230.0,
                sustain: 0.0,
                release_ms: 0.5,
                ..EnvelopePatch::default()
            },
            accent: AccentPatch::default(),
            oversample: false,
        }
    }
}

impl VoicePatch {
    /// Applies filter and amplitude envelope settings.
    pub fn apply_to(&self, filter: &mut TeeBeeFilter, amp_env: &mut AnalogEnvelope) {
        tracing::debug!(patch = %self.name, mode = %self.filter.mode, "applying voice patch");
        self.filter.apply_to(filter);
        self.amp_envelope.apply_to(amp_env);
    }
}
