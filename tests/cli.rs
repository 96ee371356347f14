//! Command-line tool tests.

use assert_cmd::Command;
use audio_ffmpeg::audio::WavAudio;
use audio_ffmpeg::{Config, FfmpegTool, SampleBuffer, SampleFormat};
use tempfile::TempDir;

fn write_tone(path: &std::path::Path, frames: usize) {
    let samples: Vec<i16> = (0..frames)
        .map(|i| ((i as f32 * 0.05).sin() * 12000.0) as i16)
        .collect();
    WavAudio::from_output(16000, SampleBuffer::from(samples))
        .unwrap()
        .save_to_file(path)
        .unwrap();
}

#[test]
fn test_help() {
    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn test_write_default_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audio-ffmpeg.toml");

    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .arg("--write-default-config")
        .arg(&path)
        .assert()
        .success();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.audio.sample_rate, 16000);
}

#[test]
fn test_missing_operation_fails() {
    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .args(["-i", "whatever.wav"])
        .assert()
        .failure();
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .arg("-i")
        .arg(dir.path().join("missing.wav"))
        .args(["tempo", "2.0"])
        .assert()
        .failure();
}

#[test]
fn test_trim_wav() {
    if FfmpegTool::locate().is_err() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_tone(&input, 16000);

    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["trim", "0.25", "0.5"])
        .assert()
        .success();

    let result = WavAudio::from_file(&output).unwrap();
    assert_eq!(result.format(), SampleFormat::S16);
    assert!((7800..=8200).contains(&result.total_frames()));
}

#[test]
fn test_tempo_to_float_wav() {
    if FfmpegTool::locate().is_err() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_tone(&input, 8000);

    Command::cargo_bin("audio-ffmpeg")
        .unwrap()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--output-format", "float32", "tempo", "2.0"])
        .assert()
        .success();

    let result = WavAudio::from_file(&output).unwrap();
    assert_eq!(result.format(), SampleFormat::F32);
    assert!((3600..=4400).contains(&result.total_frames()));
}
