//! ffmpeg command line construction

use std::ffi::OsString;
use std::fmt;
use std::process::Command;

use crate::audio::SampleFormat;
use crate::ffmpeg::FfmpegTool;

/// Input source: the child's stdin.
pub const INPUT_PIPE: &str = "pipe:0";
/// Output target: the child's stdout.
pub const OUTPUT_PIPE: &str = "-";

/// A fully built ffmpeg invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCommand {
    program: OsString,
    args: Vec<String>,
}

impl FfmpegCommand {
    /// Raw PCM in on stdin, same format/rate/channels out on stdout.
    ///
    /// `before_input` lands ahead of `-i`, `after_input` between `-i` and the
    /// output declaration. Neither list is inspected.
    pub fn raw_pipe<B, A>(
        tool: &FfmpegTool,
        format: SampleFormat,
        sample_rate: u32,
        channels: u16,
        before_input: &[B],
        after_input: &[A],
    ) -> Self
    where
        B: AsRef<str>,
        A: AsRef<str>,
    {
        let raw_stream = [
            "-f".to_string(),
            format.tag().to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            channels.to_string(),
        ];

        let mut args = Vec::with_capacity(2 * raw_stream.len() + before_input.len() + after_input.len() + 3);
        args.extend(raw_stream.iter().cloned());
        args.extend(before_input.iter().map(|opt| opt.as_ref().to_string()));
        args.push("-i".to_string());
        args.push(INPUT_PIPE.to_string());
        args.extend(after_input.iter().map(|opt| opt.as_ref().to_string()));
        args.extend(raw_stream);
        args.push(OUTPUT_PIPE.to_string());

        Self {
            program: tool.path().as_os_str().to_os_string(),
            args,
        }
    }

    /// An arbitrary program and argument list.
    pub fn from_parts(program: OsString, args: Vec<String>) -> Self {
        Self { program, args }
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// After-input options for a tempo change; none when `tempo == 1.0`.
pub fn tempo_options(tempo: f64) -> Vec<String> {
    if tempo == 1.0 {
        Vec::new()
    } else {
        vec!["-af".to_string(), format!("atempo={}", tempo)]
    }
}

/// After-input options selecting `duration` seconds starting at `time_offset`.
pub fn trim_options(time_offset: f64, duration: f64) -> Vec<String> {
    vec![
        "-ss".to_string(),
        time_offset.to_string(),
        "-t".to_string(),
        duration.to_string(),
    ]
}
