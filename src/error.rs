//! Error Types

use std::time::Duration;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum AudioFfmpegError {
    #[error("Not supported type: {name}")]
    UnsupportedType { name: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("command not found: {tool}. Please install")]
    ToolNotFound { tool: String },

    #[error("TimeoutExpired: {}[s]. {command}{}", .timeout.as_secs_f64(), stderr_suffix(.stderr))]
    Timeout {
        timeout: Duration,
        command: String,
        stderr: Option<String>,
    },

    #[error("ffmpeg failed ({}): {command}{}", status_label(.status), stderr_suffix(.stderr))]
    ProcessFailure {
        status: Option<i32>,
        command: String,
        stderr: Option<String>,
    },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) if !text.is_empty() => format!("\n{}", text.trim_end()),
        _ => String::new(),
    }
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl AudioFfmpegError {
    pub fn unsupported_type<S: Into<String>>(name: S) -> Self { Self::UnsupportedType { name: name.into() } }
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self { Self::InvalidArgument { message: msg.into() } }
    pub fn tool_not_found<S: Into<String>>(tool: S) -> Self { Self::ToolNotFound { tool: tool.into() } }
    pub fn decode<S: Into<String>>(msg: S) -> Self { Self::Decode { message: msg.into() } }
    pub fn audio<S: Into<String>>(msg: S) -> Self { Self::Audio { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { Self::Config { message: msg.into() } }
}

pub type Result<T> = std::result::Result<T, AudioFfmpegError>;

impl From<hound::Error> for AudioFfmpegError {
    fn from(err: hound::Error) -> Self { Self::audio(format!("WAV: {}", err)) }
}
