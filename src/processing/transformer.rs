//! Sample buffer transformations through ffmpeg

use std::time::Duration;

use log::{debug, warn};

use crate::audio::{SampleBuffer, SampleFormat};
use crate::error::{AudioFfmpegError, Result};
use crate::ffmpeg::{
    FfmpegCommand, FfmpegTool, MediaTranscoder, ProcessOutcome, SubprocessTranscoder,
    tempo_options, trim_options,
};
use super::decoder::{DecodeOptions, decode_output};

/// Stream layout and behaviour for one call
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    /// Interleaved channels in the input buffer.
    pub channels: u16,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Element type of the result; `None` keeps the input type.
    pub output_format: Option<SampleFormat>,
    /// Log the command line at info level and let ffmpeg write to our stderr.
    pub verbose: bool,
    /// Kill ffmpeg after this long.
    pub timeout: Option<Duration>,
    /// Peak-normalize float output.
    pub normalize: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 16000,
            output_format: None,
            verbose: false,
            timeout: None,
            normalize: true,
        }
    }
}

impl TransformParams {
    pub fn new(channels: u16, sample_rate: u32) -> Self {
        Self { channels, sample_rate, ..Default::default() }
    }

    pub fn with_output_format(mut self, format: SampleFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(AudioFfmpegError::invalid_argument("Channel count must be greater than 0"));
        }
        if self.sample_rate == 0 {
            return Err(AudioFfmpegError::invalid_argument("Sample rate must be greater than 0"));
        }
        Ok(())
    }
}

/// Runs ffmpeg over in-memory sample buffers.
///
/// The tool is resolved by the caller (see [`FfmpegTool::locate`]).
#[derive(Debug, Clone)]
pub struct AudioTransformer<T: MediaTranscoder = SubprocessTranscoder> {
    tool: FfmpegTool,
    transcoder: T,
}

impl AudioTransformer<SubprocessTranscoder> {
    pub fn new(tool: FfmpegTool) -> Self {
        Self { tool, transcoder: SubprocessTranscoder }
    }

    /// Locate ffmpeg on `PATH` and use the real subprocess runner.
    pub fn system() -> Result<Self> {
        Ok(Self::new(FfmpegTool::locate()?))
    }
}

impl<T: MediaTranscoder> AudioTransformer<T> {
    pub fn with_transcoder(tool: FfmpegTool, transcoder: T) -> Self {
        Self { tool, transcoder }
    }

    pub fn tool(&self) -> &FfmpegTool {
        &self.tool
    }

    /// Pipe `buffer` through ffmpeg with extra options around the input declaration.
    pub fn transform<B, A>(
        &self,
        buffer: &SampleBuffer,
        params: &TransformParams,
        before_input: &[B],
        after_input: &[A],
    ) -> Result<SampleBuffer>
    where
        B: AsRef<str>,
        A: AsRef<str>,
    {
        params.validate()?;

        let input_format = buffer.format();
        let output_format = params.output_format.unwrap_or(input_format);
        let command = FfmpegCommand::raw_pipe(
            &self.tool,
            input_format,
            params.sample_rate,
            params.channels,
            before_input,
            after_input,
        );

        let input = buffer.to_le_bytes();
        debug!("Piping {} bytes of {} through ffmpeg", input.len(), input_format);

        let outcome = self.transcoder.run(&command, &input, params.timeout, params.verbose)?;
        let stdout = into_stdout(outcome, &command, params)?;

        decode_output(
            &stdout,
            &DecodeOptions {
                input_format,
                output_format,
                channels: params.channels,
                normalize: params.normalize,
            },
        )
    }

    /// Change playback speed by `tempo` without changing pitch (`atempo` filter).
    pub fn change_tempo(&self, buffer: &SampleBuffer, tempo: f64, params: &TransformParams) -> Result<SampleBuffer> {
        if !tempo.is_finite() || tempo <= 0.0 {
            return Err(AudioFfmpegError::invalid_argument(format!(
                "Tempo must be a positive number, got {}", tempo
            )));
        }
        let none: [&str; 0] = [];
        self.transform(buffer, params, &none, &tempo_options(tempo))
    }

    /// Keep `duration` seconds starting at `time_offset`.
    ///
    /// Windows past the end of the buffer are left to ffmpeg, which returns
    /// fewer samples or none.
    pub fn trim(
        &self,
        buffer: &SampleBuffer,
        time_offset: f64,
        duration: f64,
        params: &TransformParams,
    ) -> Result<SampleBuffer> {
        for (name, value) in [("Time offset", time_offset), ("Duration", duration)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AudioFfmpegError::invalid_argument(format!(
                    "{} must be a non-negative number of seconds, got {}", name, value
                )));
            }
        }
        let none: [&str; 0] = [];
        self.transform(buffer, params, &none, &trim_options(time_offset, duration))
    }
}

fn into_stdout(outcome: ProcessOutcome, command: &FfmpegCommand, params: &TransformParams) -> Result<Vec<u8>> {
    // With verbose output ffmpeg's stderr already went to the terminal.
    let captured = |stderr: Option<Vec<u8>>| {
        if params.verbose {
            None
        } else {
            stderr.map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        }
    };

    match outcome {
        ProcessOutcome::Success(bytes) => Ok(bytes),
        ProcessOutcome::Timeout { stderr } => {
            warn!("ffmpeg timed out: {}", command);
            Err(AudioFfmpegError::Timeout {
                timeout: params.timeout.unwrap_or_default(),
                command: command.to_string(),
                stderr: captured(stderr),
            })
        }
        ProcessOutcome::Failure { status, stderr } => {
            warn!("ffmpeg failed with status {:?}: {}", status, command);
            Err(AudioFfmpegError::ProcessFailure {
                status,
                command: command.to_string(),
                stderr: captured(stderr),
            })
        }
    }
}
