//! Sample element types and typed sample buffers
//!
//! ffmpeg reads and writes headerless little-endian PCM. The element type of a
//! buffer decides the raw format tag passed on the command line and the byte
//! width used when the output stream is read back.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayD};
use serde::{Deserialize, Serialize};

use crate::error::{AudioFfmpegError, Result};

/// Supported sample element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 64-bit float
    F64,
    /// 32-bit float
    F32,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Unsigned 32-bit integer
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Float,
    Signed,
    Unsigned,
}

/// Element type to ffmpeg raw format, in lookup order.
pub const FORMAT_TAGS: [(SampleFormat, &str); 5] = [
    (SampleFormat::F64, "f64le"),
    (SampleFormat::F32, "f32le"),
    (SampleFormat::S16, "s16le"),
    (SampleFormat::S32, "s32le"),
    (SampleFormat::U32, "u32le"),
];

/// Look up the raw format tag for an element type name such as `int16` or `f32`.
pub fn format_tag(type_name: &str) -> Result<&'static str> {
    let format: SampleFormat = type_name.parse()?;
    Ok(format.tag())
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 5] = [Self::F64, Self::F32, Self::S16, Self::S32, Self::U32];

    /// ffmpeg raw format tag (`-f` argument).
    pub fn tag(&self) -> &'static str {
        FORMAT_TAGS
            .iter()
            .find(|(format, _)| format == self)
            .map(|(_, tag)| *tag)
            .unwrap_or_else(|| unreachable!("every sample format has a tag"))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::F64 => "float64",
            Self::F32 => "float32",
            Self::S16 => "int16",
            Self::S32 => "int32",
            Self::U32 => "uint32",
        }
    }

    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 | Self::S32 | Self::U32 => 4,
            Self::S16 => 2,
        }
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            Self::F64 | Self::F32 => SampleKind::Float,
            Self::S16 | Self::S32 => SampleKind::Signed,
            Self::U32 => SampleKind::Unsigned,
        }
    }

    pub fn is_float(&self) -> bool {
        self.kind() == SampleKind::Float
    }

    pub fn is_int(&self) -> bool {
        !self.is_float()
    }

    /// Largest representable magnitude, used to scale integer samples into [-1, 1].
    pub fn max_magnitude(&self) -> f64 {
        match self {
            Self::F64 => f64::MAX,
            Self::F32 => f32::MAX as f64,
            Self::S16 => i16::MAX as f64,
            Self::S32 => i32::MAX as f64,
            Self::U32 => u32::MAX as f64,
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = AudioFfmpegError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f64" | "float64" | "double" | "f64le" => Ok(Self::F64),
            "f32" | "float32" | "float" | "f32le" => Ok(Self::F32),
            "i16" | "int16" | "s16" | "s16le" => Ok(Self::S16),
            "i32" | "int32" | "s32" | "s32le" => Ok(Self::S32),
            "u32" | "uint32" | "u32le" => Ok(Self::U32),
            _ => Err(AudioFfmpegError::unsupported_type(s)),
        }
    }
}

/// A primitive that can travel through the raw PCM pipe.
pub trait Sample: Copy + Default + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const FORMAT: SampleFormat;

    fn write_le(self, out: &mut Vec<u8>);
    /// `bytes` is exactly `FORMAT.bytes_per_sample()` long.
    fn read_le(bytes: &[u8]) -> Self;
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;

    fn wrap(data: ArrayD<Self>) -> SampleBuffer;
    fn view(buffer: &SampleBuffer) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_sample {
    ($ty:ty, $variant:ident) => {
        impl Sample for $ty {
            const FORMAT: SampleFormat = SampleFormat::$variant;

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            fn wrap(data: ArrayD<Self>) -> SampleBuffer {
                SampleBuffer::$variant(data)
            }

            fn view(buffer: &SampleBuffer) -> Option<&ArrayD<Self>> {
                match buffer {
                    SampleBuffer::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

impl_sample!(f64, F64);
impl_sample!(f32, F32);
impl_sample!(i16, S16);
impl_sample!(i32, S32);
impl_sample!(u32, U32);

/// Samples of one element type, in any shape.
///
/// Input buffers are serialized in logical (row-major) order. Decoded output is
/// 1-D for mono and `[channels, frames]` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    F64(ArrayD<f64>),
    F32(ArrayD<f32>),
    S16(ArrayD<i16>),
    S32(ArrayD<i32>),
    U32(ArrayD<u32>),
}

macro_rules! with_samples {
    ($buffer:expr, $data:ident => $body:expr) => {
        match $buffer {
            SampleBuffer::F64($data) => $body,
            SampleBuffer::F32($data) => $body,
            SampleBuffer::S16($data) => $body,
            SampleBuffer::S32($data) => $body,
            SampleBuffer::U32($data) => $body,
        }
    };
}

pub(crate) use with_samples;

impl SampleBuffer {
    pub fn from_vec<T: Sample>(samples: Vec<T>) -> Self {
        T::wrap(Array1::from(samples).into_dyn())
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Self::F64(_) => SampleFormat::F64,
            Self::F32(_) => SampleFormat::F32,
            Self::S16(_) => SampleFormat::S16,
            Self::S32(_) => SampleFormat::S32,
            Self::U32(_) => SampleFormat::U32,
        }
    }

    /// Total number of samples across all channels.
    pub fn len(&self) -> usize {
        with_samples!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &[usize] {
        with_samples!(self, data => data.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Typed view when the buffer holds `T`.
    pub fn as_array<T: Sample>(&self) -> Option<&ArrayD<T>> {
        T::view(self)
    }

    /// Samples in logical order, converted to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_samples!(self, data => data.iter().map(|&s| s.to_f64()).collect())
    }

    /// Serialize in logical order as little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        fn encode<T: Sample>(data: &ArrayD<T>) -> Vec<u8> {
            let mut out = Vec::with_capacity(data.len() * T::FORMAT.bytes_per_sample());
            for &sample in data.iter() {
                sample.write_le(&mut out);
            }
            out
        }
        with_samples!(self, data => encode(data))
    }

    /// Reinterpret raw little-endian bytes as a flat buffer of `format`.
    pub fn from_le_bytes(format: SampleFormat, bytes: &[u8]) -> Result<Self> {
        fn decode<T: Sample>(bytes: &[u8]) -> SampleBuffer {
            let width = T::FORMAT.bytes_per_sample();
            let samples: Vec<T> = bytes.chunks_exact(width).map(T::read_le).collect();
            SampleBuffer::from_vec(samples)
        }

        let width = format.bytes_per_sample();
        if bytes.len() % width != 0 {
            return Err(AudioFfmpegError::decode(format!(
                "{} bytes is not a whole number of {} samples ({} bytes each)",
                bytes.len(), format, width
            )));
        }

        Ok(match format {
            SampleFormat::F64 => decode::<f64>(bytes),
            SampleFormat::F32 => decode::<f32>(bytes),
            SampleFormat::S16 => decode::<i16>(bytes),
            SampleFormat::S32 => decode::<i32>(bytes),
            SampleFormat::U32 => decode::<u32>(bytes),
        })
    }

    /// Element-wise conversion, keeping the shape. Float to integer truncates and saturates.
    pub fn cast(&self, format: SampleFormat) -> SampleBuffer {
        if format == self.format() {
            return self.clone();
        }

        fn convert<S: Sample, T: Sample>(data: &ArrayD<S>) -> SampleBuffer {
            T::wrap(data.mapv(|s| T::from_f64(s.to_f64())))
        }

        with_samples!(self, data => match format {
            SampleFormat::F64 => convert::<_, f64>(data),
            SampleFormat::F32 => convert::<_, f32>(data),
            SampleFormat::S16 => convert::<_, i16>(data),
            SampleFormat::S32 => convert::<_, i32>(data),
            SampleFormat::U32 => convert::<_, u32>(data),
        })
    }
}

impl<T: Sample> From<Vec<T>> for SampleBuffer {
    fn from(samples: Vec<T>) -> Self {
        Self::from_vec(samples)
    }
}

impl<T: Sample> From<Array1<T>> for SampleBuffer {
    fn from(samples: Array1<T>) -> Self {
        T::wrap(samples.into_dyn())
    }
}

impl<T: Sample> From<ArrayD<T>> for SampleBuffer {
    fn from(samples: ArrayD<T>) -> Self {
        T::wrap(samples)
    }
}
