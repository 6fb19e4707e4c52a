use super::{
    convert::{db_to_amp, semitones_to_factor},
    fast_math,
    sample_rate::SampleRate,
};

/*
Analog (RC) Envelope Implementation
===================================

This module implements the envelope generator of an analog voice: a
stair-step control voltage feeding an RC lowpass. Instead of ramping the
output linearly, each phase switches the RC unit to a new target level and a
new time constant, and the output glides towards the target exponentially.


Vocabulary
----------

  target      The level the RC unit is currently being charged towards: the
              (scaled) peak during attack/hold, the sustain level during
              decay/sustain, the end level during release.

  tau         The time constant of the RC unit: the time after which a step
              has covered 63.2% of the distance to its target. The attack,
              decay and release times configured on the envelope are taus,
              not durations.

  tau scale   Multiplier on every tau. A tau scale of 2 means the configured
              time now reaches only 39.3% of the step (1 - e^-0.5).

  time scale  Multiplier on how fast the phase clock runs. 2.0 halves every
              phase duration and every tau. Used for key/velocity tracking.

  cursor      Seconds since the last note-on, compared against the phase
              breakpoints to decide which branch the next sample takes.


The Shape: Exponential Segments
-------------------------------

  Level
   peak ┐    .-~~-.
        │   /      `-.__
    S   │  /            `~~~~~~~~~~.
        │ /                         `.
    end └/____________________________`-.___→ Time
         Attack  Decay     Sustain     Release
         (+Hold)

Every segment approaches its target asymptotically, so the nominal target is
never exactly reached within the phase. The output is always a convex blend
of the previous output and the current target, so the envelope cannot
overshoot a segment's target.


The Math: One RC Step per Sample
--------------------------------

    out = previous + coeff * (target - previous)
    coeff = 1 - exp(-increment / (tau * tau_scale))
    increment = time_scale / sample_rate            (seconds per sample)

After tau seconds of a fixed target:  1 - (1 - coeff)^(tau / increment)
                                    = 1 - e^-1 ≈ 0.632 of the step.


Phase Selection
---------------

The cursor is compared against three accumulated breakpoints, in this order:

    cursor <= attack + hold                     → attack/hold  (towards peak)
    cursor <= attack + hold + decay             → decay        (towards sustain)
    note held                                   → sustain      (cursor frozen)
    otherwise                                   → release      (towards end)

note_off() does not inspect the current phase. It moves the cursor to just
past the decay breakpoint, so the very next sample is a release sample
starting from whatever level the envelope holds at that moment.
*/

/// Output magnitude under which a released envelope counts as finished
/// (-40 dB).
pub const END_FLOOR: f32 = 0.01;

/// Which branch the next call to [`AnalogEnvelope::get_sample`] will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    AttackHold,
    Decay,
    Sustain,
    Release,
}

pub struct AnalogEnvelope {
    // Levels (raw linear amplitude)
    start_level: f32,
    peak_level: f32,
    sustain_level: f32,
    end_level: f32,

    // Phase times in seconds
    attack_time: f32,
    hold_time: f32,
    decay_time: f32,
    release_time: f32,

    // Accumulated breakpoints, non-decreasing
    att_plus_hld: f64,
    att_plus_hld_plus_dec: f64,
    att_plus_hld_plus_dec_plus_rel: f64,

    // Scaling
    time_scale: f32,
    tau_scale: f32,
    peak_scale: f32,
    peak_by_vel: f32,
    velocity_factor: f32,

    // Runtime state
    time: f64,
    increment: f64,
    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
    previous_output: f32,
    note_is_on: bool,
    key: u8,
    velocity: u8,

    sample_rate: SampleRate,
}

impl AnalogEnvelope {
    /// A 0 ms attack, 1 s decay to 0.5 and 10 ms release from 0 to 1.
    ///
    /// The envelope starts idle: until the first note-on it releases towards
    /// the end level.
    pub fn new(sample_rate: SampleRate) -> Self {
        fast_math::warm_up();

        let mut env = Self {
            start_level: 0.0,
            peak_level: 1.0,
            sustain_level: 0.5,
            end_level: 0.0,

            attack_time: 0.0,
            hold_time: 0.0,
            decay_time: 1.0,
            release_time: 0.01,

            att_plus_hld: 0.0,
            att_plus_hld_plus_dec: 0.0,
            att_plus_hld_plus_dec_plus_rel: 0.0,

            time_scale: 1.0,
            tau_scale: 1.0,
            peak_scale: 1.0,
            peak_by_vel: 1.0,
            velocity_factor: 1.0,

            time: f64::INFINITY,
            increment: 0.0,
            attack_coeff: 1.0,
            decay_coeff: 1.0,
            release_coeff: 1.0,
            previous_output: 0.0,
            note_is_on: false,
            key: 64,
            velocity: 64,

            sample_rate,
        };
        env.set_sample_rate(sample_rate);
        env
    }

    /// Convenience constructor taking times in milliseconds and a raw
    /// sustain level; start, peak and end levels keep their defaults.
    pub fn adsr(
        sample_rate: SampleRate,
        attack_ms: f32,
        decay_ms: f32,
        sustain: f32,
        release_ms: f32,
    ) -> Self {
        let mut env = Self::new(sample_rate);
        env.set_attack(attack_ms);
        env.set_decay(decay_ms);
        env.set_sustain_level(sustain);
        env.set_release(release_ms);
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        tracing::debug!(sample_rate = sample_rate.hz(), "analog envelope sample rate");
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    /*
    Levels
    ------
    */

    pub fn set_start_level(&mut self, level: f32) {
        self.start_level = level;
    }

    pub fn set_start_in_decibels(&mut self, db: f32) {
        self.set_start_level(db_to_amp(db));
    }

    pub fn set_start_in_semitones(&mut self, semitones: f32) {
        self.set_start_level(semitones_to_factor(semitones));
    }

    pub fn set_peak_level(&mut self, level: f32) {
        self.peak_level = level;
    }

    pub fn set_peak_in_decibels(&mut self, db: f32) {
        self.set_peak_level(db_to_amp(db));
    }

    pub fn set_peak_in_semitones(&mut self, semitones: f32) {
        self.set_peak_level(semitones_to_factor(semitones));
    }

    /// Peak multiplier applied to velocity-127 notes. Velocity 1 uses the
    /// reciprocal, velocity 64 leaves the peak unchanged. Latched at note-on.
    pub fn set_peak_level_by_vel(&mut self, factor: f32) {
        self.peak_by_vel = factor;
    }

    pub fn set_peak_by_vel_in_decibels(&mut self, db: f32) {
        self.set_peak_level_by_vel(db_to_amp(db));
    }

    pub fn set_peak_by_vel_in_semitones(&mut self, semitones: f32) {
        self.set_peak_level_by_vel(semitones_to_factor(semitones));
    }

    pub fn set_sustain_level(&mut self, level: f32) {
        self.sustain_level = level;
    }

    pub fn set_sustain_in_decibels(&mut self, db: f32) {
        self.set_sustain_level(db_to_amp(db));
    }

    pub fn set_sustain_in_semitones(&mut self, semitones: f32) {
        self.set_sustain_level(semitones_to_factor(semitones));
    }

    pub fn set_end_level(&mut self, level: f32) {
        self.end_level = level;
    }

    pub fn set_end_in_decibels(&mut self, db: f32) {
        self.set_end_level(db_to_amp(db));
    }

    pub fn set_end_in_semitones(&mut self, semitones: f32) {
        self.set_end_level(semitones_to_factor(semitones));
    }

    /// Runtime multiplier on the peak, e.g. for accent.
    pub fn set_peak_scale(&mut self, scale: f32) {
        self.peak_scale = scale;
    }

    /// Overwrites the RC unit's memory.
    pub fn set_internal_state(&mut self, state: f32) {
        self.previous_output = state;
    }

    /*
    Times
    -----
    Setters take milliseconds; zero or negative means an instant step.
    */

    pub fn set_attack(&mut self, ms: f32) {
        self.attack_time = seconds(ms);
        self.attack_coeff = self.coefficient(self.attack_time);
        self.calculate_accumulated_times();
    }

    /// Hold extends the attack phase; it shares the attack coefficient.
    pub fn set_hold(&mut self, ms: f32) {
        self.hold_time = seconds(ms);
        self.calculate_accumulated_times();
    }

    pub fn set_decay(&mut self, ms: f32) {
        self.decay_time = seconds(ms);
        self.decay_coeff = self.coefficient(self.decay_time);
        self.calculate_accumulated_times();
    }

    pub fn set_release(&mut self, ms: f32) {
        self.release_time = seconds(ms);
        self.release_coeff = self.coefficient(self.release_time);
        self.calculate_accumulated_times();
    }

    /// Speeds up (> 1) or slows down (< 1) the whole envelope. Non-positive
    /// values are ignored.
    pub fn set_time_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.time_scale = scale;
            self.update_increment();
        }
    }

    /// Rescales every tau. Non-positive values are ignored.
    pub fn set_tau_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.tau_scale = scale;
            self.update_coefficients();
        }
    }

    fn update_increment(&mut self) {
        self.increment = self.time_scale as f64 / self.sample_rate.hz() as f64;
        self.update_coefficients();
        self.calculate_accumulated_times();
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = self.coefficient(self.attack_time);
        self.decay_coeff = self.coefficient(self.decay_time);
        self.release_coeff = self.coefficient(self.release_time);
    }

    /// One-pole coefficient for a phase time in seconds.
    fn coefficient(&self, time: f32) -> f32 {
        if time > 0.0 {
            let tau = time as f64 * self.tau_scale as f64;
            (1.0 - (-self.increment / tau).exp()) as f32
        } else {
            1.0
        }
    }

    fn calculate_accumulated_times(&mut self) {
        self.att_plus_hld = self.attack_time as f64 + self.hold_time as f64;
        self.att_plus_hld_plus_dec = self.att_plus_hld + self.decay_time as f64;
        self.att_plus_hld_plus_dec_plus_rel = self.att_plus_hld_plus_dec + self.release_time as f64;
    }

    /*
    Getters
    -------
    Times come back in milliseconds, levels raw.
    */

    pub fn attack(&self) -> f32 {
        self.attack_time * 1000.0
    }

    pub fn hold(&self) -> f32 {
        self.hold_time * 1000.0
    }

    pub fn decay(&self) -> f32 {
        self.decay_time * 1000.0
    }

    pub fn release(&self) -> f32 {
        self.release_time * 1000.0
    }

    pub fn start_level(&self) -> f32 {
        self.start_level
    }

    pub fn peak_level(&self) -> f32 {
        self.peak_level
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }

    pub fn end_level(&self) -> f32 {
        self.end_level
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn tau_scale(&self) -> f32 {
        self.tau_scale
    }

    /// Cursor positions where decay, sustain/release and the end of release
    /// begin, in seconds.
    pub fn breakpoints(&self) -> [f64; 3] {
        [
            self.att_plus_hld,
            self.att_plus_hld_plus_dec,
            self.att_plus_hld_plus_dec_plus_rel,
        ]
    }

    pub fn is_note_on(&self) -> bool {
        self.note_is_on
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// The most recent output sample.
    pub fn level(&self) -> f32 {
        self.previous_output
    }

    pub fn phase(&self) -> EnvelopePhase {
        if self.time <= self.att_plus_hld {
            EnvelopePhase::AttackHold
        } else if self.time <= self.att_plus_hld_plus_dec {
            EnvelopePhase::Decay
        } else if self.note_is_on {
            EnvelopePhase::Sustain
        } else {
            EnvelopePhase::Release
        }
    }

    /// True once the note is released and the output fell under
    /// [`END_FLOOR`].
    pub fn end_is_reached(&self) -> bool {
        !self.note_is_on && self.previous_output.abs() < END_FLOOR
    }

    /*
    Gate
    ----
    */

    /// Restarts the attack. With `start_from_current_level` the RC unit keeps
    /// its state (legato retrigger), otherwise it jumps to the start level.
    pub fn note_on(&mut self, start_from_current_level: bool, key: u8, velocity: u8) {
        if !start_from_current_level {
            self.previous_output = self.start_level;
        }
        self.key = key;
        self.velocity = velocity.min(127);
        let exponent = (self.velocity as f32 - 64.0) / 63.0;
        self.velocity_factor = self.peak_by_vel.powf(exponent);
        self.time = 0.0;
        self.note_is_on = true;
    }

    /// Jumps straight into the release phase from the current level.
    pub fn note_off(&mut self) {
        self.note_is_on = false;
        self.time = self.att_plus_hld_plus_dec + self.increment;
    }

    /// Rewinds the cursor to the start of the attack; levels are untouched.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /*
    Processing
    ----------
    */

    /// Advance the envelope by one sample.
    #[inline]
    pub fn get_sample(&mut self) -> f32 {
        let previous = self.previous_output;

        let out = if self.time <= self.att_plus_hld {
            let target = self.peak_level * self.peak_scale * self.velocity_factor;
            self.time += self.increment;
            previous + self.attack_coeff * (target - previous)
        } else if self.time <= self.att_plus_hld_plus_dec {
            self.time += self.increment;
            previous + self.decay_coeff * (self.sustain_level - previous)
        } else if self.note_is_on {
            // sustain: the cursor stays put while the note is held
            previous + self.decay_coeff * (self.sustain_level - previous)
        } else {
            self.time += self.increment;
            previous + self.release_coeff * (self.end_level - previous)
        };

        self.previous_output = out;
        out
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.get_sample();
        }
    }
}

fn seconds(ms: f32) -> f32 {
    if ms > 0.0 {
        ms * 0.001
    } else {
        0.0
    }
}
