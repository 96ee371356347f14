use criterion::{black_box, criterion_group, criterion_main, Criterion};

use audio_ffmpeg::processing::{DecodeOptions, decode_output};
use audio_ffmpeg::{SampleBuffer, SampleFormat};

fn bench_decode(c: &mut Criterion) {
    let samples: Vec<i16> = (0..96_000).map(|i| ((i * 37) % 65_536 - 32_768) as i16).collect();
    let bytes = SampleBuffer::from(samples).to_le_bytes();

    let mono_float = DecodeOptions {
        input_format: SampleFormat::S16,
        output_format: SampleFormat::F32,
        channels: 1,
        normalize: true,
    };
    let stereo_int = DecodeOptions {
        input_format: SampleFormat::S16,
        output_format: SampleFormat::S16,
        channels: 2,
        normalize: false,
    };

    c.bench_function("decode_s16_to_f32_mono", |b| {
        b.iter(|| decode_output(black_box(&bytes), &mono_float).unwrap())
    });
    c.bench_function("decode_s16_stereo_deinterleave", |b| {
        b.iter(|| decode_output(black_box(&bytes), &stereo_int).unwrap())
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
