use std::fmt;
use std::time::Duration;

/// Channel identifier used by frames, spectra, and length errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Mono,
    Left,
    Right,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Mono => write!(f, "mono"),
            Channel::Left => write!(f, "left"),
            Channel::Right => write!(f, "right"),
        }
    }
}

/// One tick's raw time-domain snapshot: three byte buffers of
/// `transform_size` samples each. A byte encodes a signed sample as
/// `value + 128`, so 128 is silence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub mono: Vec<u8>,
    pub left: Vec<u8>,
    pub right: Vec<u8>,
}

impl RawFrame {
    /// All-silence frame (every byte 128) with `len` samples per channel.
    pub fn silence(len: usize) -> Self {
        Self {
            mono: vec![128; len],
            left: vec![128; len],
            right: vec![128; len],
        }
    }

    pub fn channel(&self, channel: Channel) -> &[u8] {
        match channel {
            Channel::Mono => &self.mono,
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    pub fn channel_mut(&mut self, channel: Channel) -> &mut Vec<u8> {
        match channel {
            Channel::Mono => &mut self.mono,
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }
}

/// Working buffers the processor overwrites in place every tick. Allocated
/// once at construction; lengths never change.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    /// Centered samples (`byte - 128`), `transform_size` per channel.
    pub mono: Vec<f32>,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    /// 2-tap boxcar output for the stereo channels, `transform_size` each.
    pub smoothed_left: Vec<f32>,
    pub smoothed_right: Vec<f32>,
    /// Every even-indexed smoothed sample, `transform_size / 2` each.
    pub decimated_left: Vec<f32>,
    pub decimated_right: Vec<f32>,
}

impl ProcessedFrame {
    pub(crate) fn new(transform_size: usize) -> Self {
        Self {
            mono: vec![0.0; transform_size],
            left: vec![0.0; transform_size],
            right: vec![0.0; transform_size],
            smoothed_left: vec![0.0; transform_size],
            smoothed_right: vec![0.0; transform_size],
            decimated_left: vec![0.0; transform_size / 2],
            decimated_right: vec![0.0; transform_size / 2],
        }
    }
}

/// Magnitude spectra for the current tick, `output_length` bins per channel.
/// Fully overwritten on every processed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumOutput {
    pub mono: Vec<f32>,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl SpectrumOutput {
    pub(crate) fn zeroed(output_length: usize) -> Self {
        Self {
            mono: vec![0.0; output_length],
            left: vec![0.0; output_length],
            right: vec![0.0; output_length],
        }
    }

    pub fn channel(&self, channel: Channel) -> &[f32] {
        match channel {
            Channel::Mono => &self.mono,
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }
}

/// Bundle handed to a downstream renderer that performs its own analysis:
/// the raw byte snapshot plus a monotonic timestamp. Spectra are a separate,
/// independently consumable output and are deliberately not included.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub frame: RawFrame,
    /// Monotonic time since the processor was created.
    pub elapsed: Duration,
}
