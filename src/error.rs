use thiserror::Error;

use crate::audio::frame::Channel;

/// Rejected transform configuration. Fatal at construction; no partially
/// initialized engine or processor is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("transform size must be a power of two >= 4, got {0}")]
    InvalidTransformSize(usize),
    #[error("output length must be half the transform size (expected {expected}, got {got})")]
    OutputLengthMismatch { expected: usize, got: usize },
}

/// A supplied channel buffer did not match the transform size. Recoverable:
/// the tick is skipped and the processor's buffers keep their prior values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{channel} channel has {got} bytes, expected {expected}")]
pub struct InputLengthError {
    pub channel: Channel,
    pub expected: usize,
    pub got: usize,
}
