use std::time::Instant;

use crate::audio::fft::FftEngine;
use crate::audio::frame::{Channel, ProcessedFrame, RawFrame, RenderSnapshot, SpectrumOutput};
use crate::config::TransformConfig;
use crate::error::InputLengthError;

/// Opaque identifier for a producer node inside the live source's own
/// connection graph. The processor forwards handles verbatim and never
/// interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub u64);

/// External capture collaborator: owns the audio graph the processor taps.
pub trait LiveSource {
    /// Register a producer in the collaborator's connection graph.
    fn connect(&mut self, handle: SourceHandle);

    /// Remove a previously registered producer.
    fn disconnect(&mut self, handle: SourceHandle);

    /// Write the current tick's byte snapshot into `frame`. Returns `false`
    /// while nothing is connected; the frame is then left untouched and the
    /// caller skips the tick.
    fn snapshot(&mut self, frame: &mut RawFrame) -> bool;
}

/// Whether samples are pulled from a capture collaborator or pushed by the
/// caller. Fixed for the processor's entire lifetime.
pub enum SourceMode {
    /// `sample` pulls each tick from the boxed collaborator.
    LiveCapture(Box<dyn LiveSource>),
    /// Frames arrive through `ingest`; `sample` is a no-op.
    PushOnly,
}

/// Per-tick audio pipeline: centers raw bytes, boxcar-smooths and decimates
/// the stereo pair, then runs one shared FFT engine over all three channels.
/// All buffers are allocated at construction and overwritten in place each
/// tick, so two ticks with identical input produce identical output.
pub struct AudioProcessor {
    config: TransformConfig,
    fft: FftEngine,
    mode: SourceMode,
    raw: RawFrame,
    pull_staging: RawFrame,
    processed: ProcessedFrame,
    spectra: SpectrumOutput,
    started: Instant,
}

impl AudioProcessor {
    pub fn new(config: TransformConfig, mode: SourceMode) -> Self {
        let size = config.transform_size();
        log::debug!(
            "audio processor: transform_size={}, output_length={}, equalize={}",
            size,
            config.output_length(),
            config.equalize()
        );
        Self {
            fft: FftEngine::new(&config),
            mode,
            raw: RawFrame::silence(size),
            pull_staging: RawFrame::silence(size),
            processed: ProcessedFrame::new(size),
            spectra: SpectrumOutput::zeroed(config.output_length()),
            started: Instant::now(),
            config,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Push model: consume one tick's raw frame. All three channel lengths
    /// are validated before anything is copied, so a failed tick leaves
    /// every stored buffer at its prior value.
    pub fn ingest(&mut self, frame: &RawFrame) -> Result<(), InputLengthError> {
        self.check_lengths(frame)?;
        self.consume(frame);
        Ok(())
    }

    /// Pull model: ask the attached live source for the current tick.
    /// Returns `Ok(false)` without touching any buffer when the processor is
    /// push-only or the source has nothing connected.
    pub fn sample(&mut self) -> Result<bool, InputLengthError> {
        let mut staging = std::mem::take(&mut self.pull_staging);
        let pulled = match &mut self.mode {
            SourceMode::LiveCapture(source) => source.snapshot(&mut staging),
            SourceMode::PushOnly => {
                log::debug!("sample() called on a push-only processor; ignoring");
                false
            }
        };
        let result = if pulled {
            match self.check_lengths(&staging) {
                Ok(()) => {
                    self.consume(&staging);
                    Ok(true)
                }
                Err(err) => Err(err),
            }
        } else {
            Ok(false)
        };
        self.pull_staging = staging;
        result
    }

    /// Forward a producer registration to the capture collaborator. No-op in
    /// push-only mode.
    pub fn attach_source(&mut self, handle: SourceHandle) {
        if let SourceMode::LiveCapture(source) = &mut self.mode {
            source.connect(handle);
        }
    }

    /// Remove a producer registration from the capture collaborator. No-op
    /// in push-only mode.
    pub fn detach_source(&mut self, handle: SourceHandle) {
        if let SourceMode::LiveCapture(source) = &mut self.mode {
            source.disconnect(handle);
        }
    }

    /// Magnitude spectra computed on the most recent processed tick.
    pub fn current_spectra(&self) -> &SpectrumOutput {
        &self.spectra
    }

    /// Centered, smoothed, and decimated buffers from the most recent tick.
    pub fn processed(&self) -> &ProcessedFrame {
        &self.processed
    }

    /// Raw byte snapshot plus monotonic timestamp for a renderer that does
    /// its own analysis. Spectra are exposed separately via
    /// [`AudioProcessor::current_spectra`].
    pub fn current_render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            frame: self.raw.clone(),
            elapsed: self.started.elapsed(),
        }
    }

    fn check_lengths(&self, frame: &RawFrame) -> Result<(), InputLengthError> {
        let expected = self.config.transform_size();
        for channel in [Channel::Mono, Channel::Left, Channel::Right] {
            let got = frame.channel(channel).len();
            if got != expected {
                return Err(InputLengthError {
                    channel,
                    expected,
                    got,
                });
            }
        }
        Ok(())
    }

    /// Runs the tick on a length-validated frame.
    fn consume(&mut self, frame: &RawFrame) {
        self.raw.mono.copy_from_slice(&frame.mono);
        self.raw.left.copy_from_slice(&frame.left);
        self.raw.right.copy_from_slice(&frame.right);
        self.process_tick();
    }

    fn process_tick(&mut self) {
        let size = self.config.transform_size();
        let raw = &self.raw;
        let out = &mut self.processed;

        // Center, smooth, and decimate in one pass. The first sample is its
        // own predecessor, so smoothed[0] passes through unchanged; no state
        // carries across ticks.
        let mut last = 0usize;
        let mut half = 0usize;
        for i in 0..size {
            out.mono[i] = raw.mono[i] as f32 - 128.0;
            out.left[i] = raw.left[i] as f32 - 128.0;
            out.right[i] = raw.right[i] as f32 - 128.0;

            out.smoothed_left[i] = 0.5 * (out.left[i] + out.left[last]);
            out.smoothed_right[i] = 0.5 * (out.right[i] + out.right[last]);

            if i % 2 == 0 {
                out.decimated_left[half] = out.smoothed_left[i];
                out.decimated_right[half] = out.smoothed_right[i];
                half += 1;
            }
            last = i;
        }

        // The spectra come from the centered samples; the smoothed buffers
        // feed waveform rendering only.
        self.fft
            .transform_into(&self.processed.mono, &mut self.spectra.mono);
        self.fft
            .transform_into(&self.processed.left, &mut self.spectra.left);
        self.fft
            .transform_into(&self.processed.right, &mut self.spectra.right);
    }
}
