// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! framereel - visually encodes arbitrary binary files as a sequence of
//! three-valued 4K image frames, muxes them into a lossless video, and
//! decodes them back byte-identical.
//! NOTE: relies on an external ffmpeg-compatible binary; no effort has been
//! made to vendor or replace it.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::Receiver;

use framereel::cli::{Cli, Command, DecodeArgs, EncodeArgs, TestArgs};
use framereel::events::Event;
use framereel::meta::fnv1a64;
use framereel::pipeline::{self, CancellationToken};
use framereel::video::FfmpegMuxer;

mod utils;

/// Times the execution of `code` and prints the measured time.
macro_rules! timed_block {
    ($name:expr, $code:block) => {
        println!("Starting {}", $name);
        let start = std::time::Instant::now();
        $code
        println!("Finished {} after: {}", $name, utils::format_duration(start.elapsed()));
    };
}

fn init_logging() {
    let level = if std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}

/// Drain `rx` onto stdout until the sender side is dropped.
fn print_events(rx: Receiver<Event>) {
    for event in rx {
        match event {
            Event::Spin(text) => println!("{text}"),
            Event::Bar { text, percent } => {
                print!("\r{text} [{:>5.1}%]", percent * 100.0);
                let _ = std::io::stdout().flush();
            }
            Event::Text(text) => println!("\n{text}"),
        }
    }
}

fn run_encode(args: &EncodeArgs, events: &crossbeam_channel::Sender<Event>, cancel: &CancellationToken) -> Result<()> {
    if !args.input.exists() {
        bail!("input file {:?} does not exist", args.input);
    }
    if args.output.exists() && !args.overwrite {
        bail!("{:?} already exists (use --overwrite)", args.output);
    }

    let config = args.pipeline.to_pipeline_config();
    let muxer = FfmpegMuxer::new(args.pipeline.ffmpeg_path.clone());

    timed_block!("frame generation and muxing", {
        pipeline::encode::encode(&args.input, &args.output, &config, &muxer, events, cancel)?;
    });
    Ok(())
}

fn run_decode(args: &DecodeArgs, events: &crossbeam_channel::Sender<Event>, cancel: &CancellationToken) -> Result<()> {
    if !args.video.exists() {
        bail!("video file {:?} does not exist", args.video);
    }
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {:?}", args.output_dir))?;

    let config = args.pipeline.to_pipeline_config();
    let muxer = FfmpegMuxer::new(args.pipeline.ffmpeg_path.clone());

    let mut dest = None;
    timed_block!("video demuxing and file reconstruction", {
        dest = Some(pipeline::decode::decode(
            &args.video,
            &args.output_dir,
            args.overwrite,
            &config,
            &muxer,
            events,
            cancel,
        )?);
    });
    if let Some(dest) = dest {
        println!("Recovered file written to {}", dest.display());
    }
    Ok(())
}

fn run_test(args: &TestArgs, events: &crossbeam_channel::Sender<Event>, cancel: &CancellationToken) -> Result<()> {
    if !args.input.exists() {
        bail!("input file {:?} does not exist", args.input);
    }

    let workdir = match &args.workdir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            PersistentOrTemp::Persistent(dir.clone())
        }
        None => PersistentOrTemp::Temp(tempfile::tempdir().context("creating scratch directory")?),
    };
    let video_path = workdir.path().join("framereel_test.mov");
    let decode_dir = workdir.path().join("decoded");
    std::fs::create_dir_all(&decode_dir)?;

    let config = args.pipeline.to_pipeline_config();
    let muxer = FfmpegMuxer::new(args.pipeline.ffmpeg_path.clone());

    timed_block!("round-trip encode", {
        pipeline::encode::encode(&args.input, &video_path, &config, &muxer, events, cancel)?;
    });

    let original = std::fs::read(&args.input)?;
    if original.is_empty() {
        println!("Input is empty; trivially equal without a round trip.");
        return Ok(());
    }

    let mut recovered_path = None;
    timed_block!("round-trip decode", {
        recovered_path = Some(pipeline::decode::decode(
            &video_path,
            &decode_dir,
            true,
            &config,
            &muxer,
            events,
            cancel,
        )?);
    });
    let recovered_path = recovered_path.expect("set by timed_block");
    let recovered = std::fs::read(&recovered_path)?;

    if original == recovered {
        println!(
            "OK: recovered file matches byte-for-byte (checksum {})",
            utils::bytes_to_hex_string(&fnv1a64(&original).to_be_bytes())
        );
    } else {
        println!(
            "MISMATCH: original {} bytes (checksum {}), recovered {} bytes (checksum {})",
            original.len(),
            utils::bytes_to_hex_string(&fnv1a64(&original).to_be_bytes()),
            recovered.len(),
            utils::bytes_to_hex_string(&fnv1a64(&recovered).to_be_bytes()),
        );
        bail!("recovered file does not match the original");
    }
    Ok(())
}

/// Either a user-supplied scratch directory we must not delete, or an owned
/// temporary one cleaned up on drop.
enum PersistentOrTemp {
    Persistent(PathBuf),
    Temp(tempfile::TempDir),
}

impl PersistentOrTemp {
    fn path(&self) -> &Path {
        match self {
            PersistentOrTemp::Persistent(p) => p,
            PersistentOrTemp::Temp(t) => t.path(),
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (events_tx, events_rx) = crossbeam_channel::unbounded::<Event>();
    let printer = thread::spawn(move || print_events(events_rx));
    let cancel = CancellationToken::new();

    let main_start = Instant::now();
    let result = match &cli.command {
        Command::Encode(args) => run_encode(args, &events_tx, &cancel),
        Command::Decode(args) => run_decode(args, &events_tx, &cancel),
        Command::Test(args) => run_test(args, &events_tx, &cancel),
    };
    drop(events_tx);
    let _ = printer.join();

    println!(
        "Total execution time: {}",
        utils::format_duration(main_start.elapsed())
    );
    result
}
