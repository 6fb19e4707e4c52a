//! Wait-free parameter queues between a control thread and the audio thread.
//!
//! Each wrapper is split into two halves when it is built: the `Shared*`
//! half owns the DSP component and lives on the audio thread, the `*Handle`
//! half is moved to whichever thread turns knobs. Messages travel through an
//! `rtrb` single-producer single-consumer ring and are applied at the start
//! of the next rendered block, so parameter changes are block-accurate.

pub mod envelope;
pub mod filter;

pub use envelope::{EnvelopeHandle, EnvelopeMessage, SharedEnvelope};
pub use filter::{FilterHandle, FilterMessage, SharedFilter};

/// Capacity of every control queue. A handle that outruns the audio thread by
/// more than this many messages gets [`crate::Error::QueueFull`].
pub const CONTROL_QUEUE_SIZE: usize = 64;
