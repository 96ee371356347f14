//! Audio Transformation Pipeline

pub mod decoder;
pub mod transformer;

pub use decoder::{DecodeOptions, decode_output};
pub use transformer::{AudioTransformer, TransformParams};
