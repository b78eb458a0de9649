use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Validated transform configuration shared by the FFT engine and the audio
/// processor. Constructed once; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    transform_size: usize,
    output_length: usize,
    equalize: bool,
}

impl TransformConfig {
    /// `transform_size` must be a power of two >= 4. The spectrum length is
    /// always half the transform size.
    pub fn new(transform_size: usize, equalize: bool) -> Result<Self, ConfigError> {
        if transform_size < 4 || !transform_size.is_power_of_two() {
            return Err(ConfigError::InvalidTransformSize(transform_size));
        }
        Ok(Self {
            transform_size,
            output_length: transform_size / 2,
            equalize,
        })
    }

    /// Like [`TransformConfig::new`], but also checks an externally supplied
    /// spectrum length against the `output_length == transform_size / 2`
    /// invariant.
    pub fn with_output_length(
        transform_size: usize,
        output_length: usize,
        equalize: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self::new(transform_size, equalize)?;
        if output_length != config.output_length {
            return Err(ConfigError::OutputLengthMismatch {
                expected: config.output_length,
                got: output_length,
            });
        }
        Ok(config)
    }

    /// Padded working length of one transform call.
    pub fn transform_size(&self) -> usize {
        self.transform_size
    }

    /// Number of magnitude bins returned per channel.
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Whether the high-frequency compensation curve is applied.
    pub fn equalize(&self) -> bool {
        self.equalize
    }
}

impl Default for TransformConfig {
    /// The historical configuration: 1024-sample transform, 512 bins,
    /// equalization on.
    fn default() -> Self {
        Self {
            transform_size: 1024,
            output_length: 512,
            equalize: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transform: TransformOptions,
}

#[derive(Debug, Deserialize)]
pub struct TransformOptions {
    #[serde(default = "default_transform_size")]
    pub transform_size: usize,
    /// Optional; must equal `transform_size / 2` when present.
    #[serde(default)]
    pub output_length: Option<usize>,
    #[serde(default = "default_equalize")]
    pub equalize: bool,
}

impl TransformOptions {
    pub fn resolve(&self) -> Result<TransformConfig, ConfigError> {
        match self.output_length {
            Some(len) => TransformConfig::with_output_length(self.transform_size, len, self.equalize),
            None => TransformConfig::new(self.transform_size, self.equalize),
        }
    }
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            transform_size: default_transform_size(),
            output_length: None,
            equalize: default_equalize(),
        }
    }
}

fn default_transform_size() -> usize { 1024 }
fn default_equalize() -> bool { true }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Failed to parse config {}: {}", path.display(), err);
            None
        }
    }
}
