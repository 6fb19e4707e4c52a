//! Realtime signal-processing kernel of a TB-303 style monosynth voice: the
//! ladder filter, the analog envelope and the table-driven math beneath them.

#[cfg(feature = "rtrb")]
pub mod control; // Lock-free parameter queues for the audio thread
pub mod dsp;
pub mod error;
pub mod patch; // Serializable voice settings

pub use error::{Error, Result};

/// Largest block the control wrappers expect per render call.
pub const MAX_BLOCK_SIZE: usize = 2048;
