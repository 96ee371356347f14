//! Configuration management for ffmpeg transforms

use crate::audio::SampleFormat;
use crate::error::{AudioFfmpegError, Result};
use crate::processing::TransformParams;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub ffmpeg: FfmpegConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// Explicit ffmpeg executable; searched on `PATH` when unset.
    pub path: Option<PathBuf>,
    pub timeout_secs: Option<f64>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Default stream layout for library callers; WAV input overrides both.
    pub sample_rate: u32,
    pub channels: u16,
    /// Element type name such as `float32`; unset keeps the input type.
    pub output_format: Option<String>,
    pub normalize: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("input.wav"),
            output_path: PathBuf::from("output.wav"),
            ffmpeg: FfmpegConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            output_format: None,
            normalize: true,
        }
    }
}

impl Config {
    /// Get verbose mode (convenience method)
    pub fn verbose(&self) -> bool {
        self.ffmpeg.verbose
    }

    /// Get timeout as a duration
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.ffmpeg
            .timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| AudioFfmpegError::config(format!("Invalid timeout {}: {}", secs, e)))
            })
            .transpose()
    }

    /// Get parsed output format
    pub fn output_format(&self) -> Result<Option<SampleFormat>> {
        self.audio.output_format.as_deref().map(str::parse::<SampleFormat>).transpose()
    }

    /// Build call parameters from this config
    pub fn transform_params(&self) -> Result<TransformParams> {
        Ok(TransformParams {
            channels: self.audio.channels,
            sample_rate: self.audio.sample_rate,
            output_format: self.output_format()?,
            verbose: self.verbose(),
            timeout: self.timeout()?,
            normalize: self.audio.normalize,
        })
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "audio-ffmpeg", about = "Change tempo or trim WAV audio through ffmpeg", version, author)]
pub struct Args {
    #[arg(short = 'i', long = "input", help = "Input audio file path (WAV format)")]
    pub input: Option<PathBuf>,

    #[arg(short = 'o', long = "output", help = "Output audio file path [default: output.wav]")]
    pub output: Option<PathBuf>,

    #[arg(long = "ffmpeg", help = "ffmpeg executable (searched on PATH by default)")]
    pub ffmpeg: Option<PathBuf>,

    #[arg(short = 't', long = "timeout", help = "Kill ffmpeg after this many seconds")]
    pub timeout: Option<f64>,

    #[arg(short = 'f', long = "output-format", help = "Output sample type: int16, int32, float32, float64")]
    pub output_format: Option<String>,

    #[arg(long = "no-normalize", help = "Do not peak-normalize float output")]
    pub no_normalize: bool,

    #[arg(short = 'v', long = "verbose", help = "Print the ffmpeg command and its log")]
    pub verbose: bool,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "write-default-config", help = "Write a default config file and exit")]
    pub write_default_config: Option<PathBuf>,

    #[command(subcommand)]
    pub operation: Option<Operation>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Operation {
    /// Speed up or slow down without changing pitch
    Tempo {
        #[arg(help = "Tempo multiplier, e.g. 2.0 plays twice as fast")]
        tempo: f64,
    },
    /// Keep a time window
    Trim {
        #[arg(help = "Start offset in seconds")]
        offset: f64,
        #[arg(help = "Window length in seconds")]
        duration: f64,
    },
    /// Pass raw ffmpeg options after the input declaration
    Filter {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        options: Vec<String>,
    },
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args_and_config(args: Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments override config file settings
        if let Some(input) = args.input {
            config.input_path = input;
        }
        if let Some(output) = args.output {
            config.output_path = output;
        }
        if args.ffmpeg.is_some() {
            config.ffmpeg.path = args.ffmpeg;
        }
        if args.timeout.is_some() {
            config.ffmpeg.timeout_secs = args.timeout;
        }
        if args.output_format.is_some() {
            config.audio.output_format = args.output_format;
        }
        config.ffmpeg.verbose |= args.verbose;
        if args.no_normalize {
            config.audio.normalize = false;
        }

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AudioFfmpegError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AudioFfmpegError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(AudioFfmpegError::config("Sample rate must be greater than 0"));
        }
        if self.audio.sample_rate > 384000 {
            return Err(AudioFfmpegError::config("Sample rate cannot exceed 384000 Hz"));
        }

        if self.audio.channels == 0 || self.audio.channels > 64 {
            return Err(AudioFfmpegError::config("Channel count must be in range [1, 64]"));
        }

        if let Some(timeout) = self.ffmpeg.timeout_secs {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(AudioFfmpegError::config("Timeout must be a positive number of seconds"));
            }
        }
        self.timeout()?;

        self.output_format()
            .map_err(|e| AudioFfmpegError::config(format!("Invalid output format: {}", e)))?;

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AudioFfmpegError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AudioFfmpegError::config(format!("Failed to write config file: {}", e)))
    }

    /// Create default config file
    pub fn create_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}
