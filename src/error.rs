use thiserror::Error;

/// Errors raised at the configuration boundary of the kernel.
///
/// Nothing on the per-sample path returns an error: out-of-range parameters
/// are clamped there. These variants only cover construction-time contracts
/// and the control queues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("{0} control queue is full, message dropped")]
    QueueFull(&'static str),

    #[error("unknown filter mode `{0}`")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
