//! ffmpeg Process Boundary
//!
//! Locating the executable, building raw-PCM pipe commands, and running them
//! with an optional timeout.

pub mod command;
pub mod runner;
pub mod tool;

pub use command::{FfmpegCommand, tempo_options, trim_options};
pub use runner::{MediaTranscoder, ProcessOutcome, SubprocessTranscoder};
pub use tool::FfmpegTool;
