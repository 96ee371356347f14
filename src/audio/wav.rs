//! WAV audio file processing

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat as WavSampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::{ArrayD, Ix2};

use crate::audio::{Sample, SampleBuffer, SampleFormat};
use crate::error::{AudioFfmpegError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct AudioHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub format: SampleFormat,
    /// Samples per channel.
    pub total_frames: usize,
    pub duration: f64,
}

impl AudioHeader {
    pub fn new(sample_rate: u32, channels: u16, format: SampleFormat, total_frames: usize) -> Self {
        let duration = if sample_rate == 0 { 0.0 } else { total_frames as f64 / sample_rate as f64 };
        Self { sample_rate, channels, format, total_frames, duration }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AudioFfmpegError::audio("Sample rate cannot be 0"));
        }
        if self.channels == 0 {
            return Err(AudioFfmpegError::audio("Channel count cannot be 0"));
        }
        Ok(())
    }

    pub fn to_wav_spec(&self) -> Result<WavSpec> {
        let (bits_per_sample, sample_format) = match self.format {
            SampleFormat::S16 => (16, WavSampleFormat::Int),
            SampleFormat::S32 => (32, WavSampleFormat::Int),
            SampleFormat::F32 | SampleFormat::F64 => (32, WavSampleFormat::Float),
            SampleFormat::U32 => {
                return Err(AudioFfmpegError::unsupported_type("uint32 (WAV has no unsigned 32-bit PCM)"));
            }
        };
        Ok(WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample,
            sample_format,
        })
    }
}

/// A WAV file held as one interleaved sample buffer.
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub header: AudioHeader,
    /// Interleaved, 1-D.
    pub samples: SampleBuffer,
}

impl WavAudio {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            AudioFfmpegError::audio(format!("Cannot open audio file {}: {}", path.display(), e))
        })?;
        let reader = WavReader::new(file)
            .map_err(|e| AudioFfmpegError::audio(format!("Cannot create WAV reader: {}", e)))?;

        let spec = reader.spec();
        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (WavSampleFormat::Int, 16) => read_samples::<i16, _>(reader)?,
            (WavSampleFormat::Int, 32) => read_samples::<i32, _>(reader)?,
            (WavSampleFormat::Float, 32) => read_samples::<f32, _>(reader)?,
            (format, bits) => {
                return Err(AudioFfmpegError::unsupported_type(format!(
                    "{}-bit {:?} WAV", bits, format
                )));
            }
        };

        let channels = spec.channels.max(1);
        let header = AudioHeader::new(
            spec.sample_rate,
            spec.channels,
            samples.format(),
            samples.len() / channels as usize,
        );
        header.validate()?;

        Ok(Self { header, samples })
    }

    /// Wrap decoded output: 1-D for mono, `[channels, frames]` otherwise.
    pub fn from_output(sample_rate: u32, output: SampleBuffer) -> Result<Self> {
        let (channels, samples) = match output.ndim() {
            1 => (1, output),
            2 => {
                let channels = output.shape()[0];
                (channels, interleave(&output)?)
            }
            n => {
                return Err(AudioFfmpegError::audio(format!(
                    "Expected 1 or 2 dimensional output, got {} dimensions", n
                )));
            }
        };

        let channels = u16::try_from(channels)
            .map_err(|_| AudioFfmpegError::audio(format!("Too many channels: {}", channels)))?;
        let frames = if channels == 0 { 0 } else { samples.len() / channels as usize };
        let header = AudioHeader::new(sample_rate, channels, samples.format(), frames);
        header.validate()?;

        Ok(Self { header, samples })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AudioFfmpegError::audio(format!("Cannot create output directory: {}", e))
            })?;
        }

        let spec = self.header.to_wav_spec()?;
        let file = File::create(path).map_err(|e| {
            AudioFfmpegError::audio(format!("Cannot create output file {}: {}", path.display(), e))
        })?;
        let mut writer = WavWriter::new(std::io::BufWriter::new(file), spec)
            .map_err(|e| AudioFfmpegError::audio(format!("Cannot create WAV writer: {}", e)))?;

        match &self.samples {
            SampleBuffer::S16(data) => data.iter().try_for_each(|&s| writer.write_sample(s))?,
            SampleBuffer::S32(data) => data.iter().try_for_each(|&s| writer.write_sample(s))?,
            SampleBuffer::F32(data) => data.iter().try_for_each(|&s| writer.write_sample(s))?,
            SampleBuffer::F64(data) => data.iter().try_for_each(|&s| writer.write_sample(s as f32))?,
            SampleBuffer::U32(_) => unreachable!("rejected by to_wav_spec"),
        }

        writer
            .finalize()
            .map_err(|e| AudioFfmpegError::audio(format!("Failed to finalize WAV writing: {}", e)))
    }

    pub fn sample_rate(&self) -> u32 {
        self.header.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.header.channels
    }

    pub fn total_frames(&self) -> usize {
        self.header.total_frames
    }

    pub fn duration(&self) -> f64 {
        self.header.duration
    }

    pub fn format(&self) -> SampleFormat {
        self.header.format
    }
}

fn read_samples<T, R>(reader: WavReader<R>) -> Result<SampleBuffer>
where
    T: Sample + hound::Sample,
    R: std::io::Read,
{
    let samples = reader
        .into_samples::<T>()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| AudioFfmpegError::audio(format!("Failed to read sample: {}", e)))?;
    Ok(SampleBuffer::from_vec(samples))
}

/// `[channels, frames]` back to interleaved frame order.
fn interleave(buffer: &SampleBuffer) -> Result<SampleBuffer> {
    fn weave<T: Sample>(data: &ArrayD<T>) -> Result<SampleBuffer> {
        let planar = data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| AudioFfmpegError::audio(format!("Expected [channels, frames]: {}", e)))?;
        let interleaved: Vec<T> = planar.t().iter().copied().collect();
        Ok(SampleBuffer::from_vec(interleaved))
    }

    match buffer {
        SampleBuffer::F64(data) => weave(data),
        SampleBuffer::F32(data) => weave(data),
        SampleBuffer::S16(data) => weave(data),
        SampleBuffer::S32(data) => weave(data),
        SampleBuffer::U32(data) => weave(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::decoder::deinterleave;
    use tempfile::TempDir;

    #[test]
    fn test_audio_header_creation() {
        let header = AudioHeader::new(16000, 1, SampleFormat::F32, 1000);
        assert_eq!(header.sample_rate, 16000);
        assert_eq!(header.channels, 1);
        assert_eq!(header.total_frames, 1000);
        assert!((header.duration - 0.0625).abs() < f64::EPSILON);
    }

    #[test]
    fn test_audio_header_validation() {
        assert!(AudioHeader::new(16000, 2, SampleFormat::S16, 10).validate().is_ok());
        assert!(AudioHeader::new(0, 1, SampleFormat::S16, 10).validate().is_err());
        assert!(AudioHeader::new(16000, 0, SampleFormat::S16, 10).validate().is_err());
    }

    #[test]
    fn test_wav_spec_per_format() {
        let spec = AudioHeader::new(8000, 1, SampleFormat::F64, 0).to_wav_spec().unwrap();
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, WavSampleFormat::Float);

        let spec = AudioHeader::new(8000, 1, SampleFormat::S16, 0).to_wav_spec().unwrap();
        assert_eq!(spec.bits_per_sample, 16);

        assert!(AudioHeader::new(8000, 1, SampleFormat::U32, 0).to_wav_spec().is_err());
    }

    #[test]
    fn test_stereo_output_is_reinterleaved() {
        let interleaved = SampleBuffer::from(vec![1i16, -1, 2, -2, 3, -3]);
        let planar = deinterleave(&interleaved, 2).unwrap();

        let audio = WavAudio::from_output(22050, planar).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.total_frames(), 3);
        assert_eq!(audio.samples, interleaved);
    }

    #[test]
    fn test_wav_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("stereo.wav");

        let planar = deinterleave(&SampleBuffer::from(vec![100i16, 200, 300, 400]), 2).unwrap();
        let original = WavAudio::from_output(16000, planar).unwrap();
        original.save_to_file(&path).unwrap();

        let loaded = WavAudio::from_file(&path).unwrap();
        assert_eq!(loaded.sample_rate(), 16000);
        assert_eq!(loaded.channels(), 2);
        assert_eq!(loaded.format(), SampleFormat::S16);
        assert_eq!(loaded.samples, original.samples);
    }

    #[test]
    fn test_float64_saved_as_float32() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mono.wav");

        let audio = WavAudio::from_output(8000, SampleBuffer::from(vec![0.5f64, -0.25])).unwrap();
        audio.save_to_file(&path).unwrap();

        let loaded = WavAudio::from_file(&path).unwrap();
        assert_eq!(loaded.format(), SampleFormat::F32);
        assert_eq!(loaded.samples.to_f64_vec(), vec![0.5, -0.25]);
    }

    #[test]
    fn test_missing_file() {
        let err = WavAudio::from_file("/nonexistent/input.wav").unwrap_err();
        assert!(matches!(err, AudioFfmpegError::Audio { .. }));
    }
}
