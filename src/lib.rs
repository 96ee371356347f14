//! audio-ffmpeg - Tempo change and trimming of sample buffers through ffmpeg
//!
//! Samples are streamed to an `ffmpeg` subprocess as headerless PCM on stdin
//! and read back from its stdout in the same format, rate and channel layout.

pub mod audio;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod processing;

pub use audio::{SampleBuffer, SampleFormat};
pub use config::{Args, Config, Operation};
pub use error::{AudioFfmpegError, Result};
pub use ffmpeg::{FfmpegTool, MediaTranscoder, ProcessOutcome, SubprocessTranscoder};
pub use processing::{AudioTransformer, TransformParams};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("RUST_LOG")
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
