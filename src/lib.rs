//! Audio sampling and spectral-transform core for overlay music visualizers.
//!
//! A fixed-size, table-driven FFT engine plus the per-tick processor that
//! turns raw 8-bit time-domain snapshots into smoothed/decimated stereo
//! buffers and per-channel magnitude spectra. The crate performs no I/O:
//! samples arrive from an external capture collaborator (or are pushed by
//! the caller), and the outputs are plain numeric buffers for a downstream
//! renderer.

pub mod audio;
pub mod config;
pub mod error;

pub use audio::fft::FftEngine;
pub use audio::frame::{Channel, ProcessedFrame, RawFrame, RenderSnapshot, SpectrumOutput};
pub use audio::processor::{AudioProcessor, LiveSource, SourceHandle, SourceMode};
pub use config::{load_config, Config, TransformConfig, TransformOptions};
pub use error::{ConfigError, InputLengthError};
