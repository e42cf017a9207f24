// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! cli - Command line interface tooling.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::FFMPEG_EXECUTABLE_PATH;
use crate::pipeline::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "framereel", version, about, long_about = None)]
/// Command line argument handler.
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to run.
    pub command: Command,
}

#[derive(Subcommand, Debug)]
/// Top-level operating modes.
pub enum Command {
    /// Encode a file into a video.
    Encode(EncodeArgs),
    /// Decode a video back into its original file.
    Decode(DecodeArgs),
    /// Round-trip a file through encode and decode, then compare the result.
    Test(TestArgs),
}

#[derive(ClapArgs, Debug)]
/// Shared tunables for every subcommand that drives a pipeline.
pub struct PipelineArgs {
    #[arg(long, help = "Number of frame workers (default: CPUs + 1).")]
    pub workers: Option<usize>,
    #[arg(
        long,
        default_value = FFMPEG_EXECUTABLE_PATH,
        help = "Path to the ffmpeg-compatible binary."
    )]
    pub ffmpeg_path: String,
}

impl PipelineArgs {
    /// Build a [`PipelineConfig`] from these shared flags.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workers: self.workers,
            ffmpeg_path: self.ffmpeg_path.clone(),
        }
    }
}

#[derive(ClapArgs, Debug)]
/// Arguments for `framereel encode`.
pub struct EncodeArgs {
    /// File to encode.
    pub input: PathBuf,
    /// Video file to produce.
    pub output: PathBuf,
    #[arg(short = 'y', long, default_value_t = false)]
    /// Overwrite the output video if it already exists.
    pub overwrite: bool,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(ClapArgs, Debug)]
/// Arguments for `framereel decode`.
pub struct DecodeArgs {
    /// Video to decode.
    pub video: PathBuf,
    /// Directory the recovered file is written into.
    pub output_dir: PathBuf,
    #[arg(short = 'y', long, default_value_t = false)]
    /// Overwrite the recovered file if it already exists.
    pub overwrite: bool,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(ClapArgs, Debug)]
/// Arguments for `framereel test`.
pub struct TestArgs {
    /// File to round-trip.
    pub input: PathBuf,
    #[arg(long, help = "Scratch directory for the intermediate video and frames.")]
    pub workdir: Option<PathBuf>,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}
