//! Audio Data Module
//!
//! Typed sample buffers exchanged with ffmpeg, plus WAV file reading and
//! writing for the command-line tool.

pub mod sample;
pub mod wav;

pub use sample::{FORMAT_TAGS, Sample, SampleBuffer, SampleFormat, SampleKind, format_tag};
pub use wav::{AudioHeader, WavAudio};
