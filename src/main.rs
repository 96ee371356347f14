//! audio-ffmpeg - WAV tempo change and trimming through ffmpeg

use anyhow::{Context, bail};
use audio_ffmpeg::audio::WavAudio;
use audio_ffmpeg::{init_logging, Args, AudioTransformer, Config, FfmpegTool, Operation};
use clap::Parser;
use log::info;
use std::process;

fn main() {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        println!("{}", audio_ffmpeg::get_library_info());
        println!();
    }

    if let Some(path) = &args.write_default_config {
        Config::create_default_config(path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let Some(operation) = args.operation.clone() else {
        bail!("No operation given; use one of: tempo, trim, filter");
    };

    let config = Config::from_args_and_config(args)?;

    if !config.input_path.exists() {
        bail!("Input file does not exist: {}", config.input_path.display());
    }

    let tool = FfmpegTool::from_config(config.ffmpeg.path.as_deref())?;
    info!("Using ffmpeg at {}", tool.path().display());
    let transformer = AudioTransformer::new(tool);

    let audio = WavAudio::from_file(&config.input_path)
        .with_context(|| format!("Reading {}", config.input_path.display()))?;
    info!(
        "Input: {} ({} Hz, {} ch, {}, {:.2}s)",
        config.input_path.display(),
        audio.sample_rate(),
        audio.channels(),
        audio.format(),
        audio.duration()
    );

    let mut params = config.transform_params()?;
    params.channels = audio.channels();
    params.sample_rate = audio.sample_rate();

    let output = match &operation {
        Operation::Tempo { tempo } => transformer.change_tempo(&audio.samples, *tempo, &params)?,
        Operation::Trim { offset, duration } => transformer.trim(&audio.samples, *offset, *duration, &params)?,
        Operation::Filter { options } => {
            let none: [&str; 0] = [];
            transformer.transform(&audio.samples, &params, &none, options)?
        }
    };

    let result = WavAudio::from_output(audio.sample_rate(), output)?;
    result
        .save_to_file(&config.output_path)
        .with_context(|| format!("Writing {}", config.output_path.display()))?;

    info!(
        "Output: {} ({} frames, {:.2}s)",
        config.output_path.display(),
        result.total_frames(),
        result.duration()
    );

    Ok(())
}
