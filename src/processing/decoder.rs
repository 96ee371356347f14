//! Output decoding - raw ffmpeg bytes back to typed samples

use log::debug;
use ndarray::{Array2, ArrayD, Ix1};

use crate::audio::{Sample, SampleBuffer, SampleFormat};
use crate::audio::sample::with_samples;
use crate::error::{AudioFfmpegError, Result};

/// How the raw output stream is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Element type written to ffmpeg's stdin; the output stream uses the same width.
    pub input_format: SampleFormat,
    pub output_format: SampleFormat,
    pub channels: u16,
    pub normalize: bool,
}

/// Decode ffmpeg's stdout into the requested output buffer.
pub fn decode_output(bytes: &[u8], options: &DecodeOptions) -> Result<SampleBuffer> {
    let flat = SampleBuffer::from_le_bytes(options.input_format, bytes)?;
    let mut audio = flat.cast(options.output_format);

    if options.channels > 1 {
        audio = deinterleave(&audio, options.channels as usize)?;
    }

    debug!(
        "Decoded {} bytes into {} {} samples, shape {:?}",
        bytes.len(), audio.len(), audio.format(), audio.shape()
    );

    if audio.is_empty() {
        return Ok(audio);
    }

    if options.normalize && options.output_format.is_float() {
        normalize(&mut audio, options.input_format);
    }

    Ok(audio)
}

/// Reshape interleaved samples into `[channels, frames]`.
pub fn deinterleave(buffer: &SampleBuffer, channels: usize) -> Result<SampleBuffer> {
    fn split<T: Sample>(data: &ArrayD<T>, channels: usize) -> Result<SampleBuffer> {
        let flat = data
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|e| AudioFfmpegError::decode(format!("Expected a flat sample buffer: {}", e)))?;

        let frames = flat.len() / channels;
        let interleaved = Array2::from_shape_vec((frames, channels), flat.to_vec())
            .map_err(|e| AudioFfmpegError::decode(format!("Cannot reshape samples: {}", e)))?;

        let planar = interleaved.reversed_axes().as_standard_layout().into_owned();
        Ok(T::wrap(planar.into_dyn()))
    }

    if channels == 0 {
        return Err(AudioFfmpegError::invalid_argument("Channel count must be greater than 0"));
    }
    if buffer.len() % channels != 0 {
        return Err(AudioFfmpegError::decode(format!(
            "{} samples cannot be split evenly into {} channels",
            buffer.len(), channels
        )));
    }

    with_samples!(buffer, data => split(data, channels))
}

/// Scale float output into [-1, 1].
///
/// Divides by the peak magnitude. A silent buffer from an integer source is
/// divided by the source type's full-scale value instead.
pub fn normalize(buffer: &mut SampleBuffer, source_format: SampleFormat) {
    let peak = buffer
        .to_f64_vec()
        .into_iter()
        .fold(0.0f64, |peak, s| peak.max(s.abs()));

    let divisor = if peak > 0.0 {
        peak
    } else if source_format.is_int() {
        source_format.max_magnitude()
    } else {
        return;
    };

    match buffer {
        SampleBuffer::F64(data) => data.mapv_inplace(|s| s / divisor),
        SampleBuffer::F32(data) => data.mapv_inplace(|s| (s as f64 / divisor) as f32),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(input: SampleFormat, output: SampleFormat, channels: u16) -> DecodeOptions {
        DecodeOptions { input_format: input, output_format: output, channels, normalize: true }
    }

    #[test]
    fn test_same_type_passthrough() {
        let input = SampleBuffer::from(vec![5i16, -7, 1024]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::S16, SampleFormat::S16, 1)).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_deinterleave_stereo() {
        let input = SampleBuffer::from(vec![1i32, 10, 2, 20, 3, 30]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::S32, SampleFormat::S32, 2)).unwrap();

        assert_eq!(decoded.shape(), &[2, 3]);
        let data = decoded.as_array::<i32>().unwrap();
        assert_eq!(data.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 10, 20, 30]);
    }

    #[test]
    fn test_uneven_channels_fail() {
        let input = SampleBuffer::from(vec![1i16, 2, 3, 4, 5]);
        let err = decode_output(&input.to_le_bytes(), &options(SampleFormat::S16, SampleFormat::S16, 2)).unwrap_err();
        assert!(matches!(err, AudioFfmpegError::Decode { .. }));
    }

    #[test]
    fn test_empty_output_is_returned_unchanged() {
        let decoded = decode_output(&[], &options(SampleFormat::S16, SampleFormat::F32, 2)).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.format(), SampleFormat::F32);
        assert_eq!(decoded.shape(), &[2, 0]);
    }

    #[test]
    fn test_peak_normalization() {
        let input = SampleBuffer::from(vec![100i16, -400, 200]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::S16, SampleFormat::F64, 1)).unwrap();
        let data = decoded.as_array::<f64>().unwrap();
        assert_eq!(data.iter().copied().collect::<Vec<_>>(), vec![0.25, -1.0, 0.5]);
    }

    #[test]
    fn test_silence_stays_zero() {
        let input = SampleBuffer::from(vec![0i16; 64]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::S16, SampleFormat::F32, 1)).unwrap();
        assert!(decoded.to_f64_vec().iter().all(|&s| s == 0.0));

        let input = SampleBuffer::from(vec![0.0f32; 16]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::F32, SampleFormat::F32, 1)).unwrap();
        assert!(decoded.to_f64_vec().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_normalize_disabled_keeps_scale() {
        let input = SampleBuffer::from(vec![100i16, -400]);
        let mut opts = options(SampleFormat::S16, SampleFormat::F32, 1);
        opts.normalize = false;
        let decoded = decode_output(&input.to_le_bytes(), &opts).unwrap();
        assert_eq!(decoded.to_f64_vec(), vec![100.0, -400.0]);
    }

    #[test]
    fn test_integer_output_is_not_normalized() {
        let input = SampleBuffer::from(vec![0.5f32, -0.25]);
        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::F32, SampleFormat::F64, 1)).unwrap();
        assert_eq!(decoded.to_f64_vec(), vec![1.0, -0.5]);

        let decoded = decode_output(&input.to_le_bytes(), &options(SampleFormat::F32, SampleFormat::S32, 1)).unwrap();
        assert_eq!(decoded.to_f64_vec(), vec![0.0, 0.0]);
    }
}
