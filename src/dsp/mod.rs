//! Low-level DSP primitives of the voice.
//!
//! Everything here is allocation-free and realtime-safe once constructed:
//! the per-sample methods never lock, allocate or log, so the components can
//! be embedded directly inside an audio callback.

/// Decibel, semitone and MIDI pitch conversions.
pub mod convert;
/// Pure exponential decay envelope.
pub mod decay_envelope;
/// Analog (RC) envelope generator.
pub mod envelope;
/// Lookup-table sine/cosine and saturation.
pub mod fast_math;
/// TB-303 style ladder filter.
pub mod filter;
/// Leaky integrator (RC lowpass) used for accent smoothing.
pub mod leaky_integrator;
/// First-order lowpass/highpass.
pub mod one_pole;
/// Validated sample rate newtype.
pub mod sample_rate;
/// Elliptic quarter-band filter for 4x oversampling.
pub mod subband;

pub use decay_envelope::DecayEnvelope;
pub use envelope::{AnalogEnvelope, EnvelopePhase};
pub use fast_math::Shaper;
pub use filter::{Coefficients, FilterMode, ModeWeights, TeeBeeFilter, Topology};
pub use leaky_integrator::LeakyIntegrator;
pub use one_pole::{OnePoleFilter, OnePoleMode};
pub use sample_rate::SampleRate;
pub use subband::EllipticQuarterBandFilter;
