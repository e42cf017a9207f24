// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! External muxer/demuxer interface.
//!
//! Wraps the `ffmpeg`-compatible subprocess behind a narrow [`Muxer`] trait
//! so pipeline logic can be exercised in tests without a real video encoder
//! on `PATH` (per the "process invocation of external codec" design note).

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::FrameReelError;

/// Narrow interface standing in for the external video codec.
pub trait Muxer {
    /// Mux the PNG frames in `frames_dir` (`out_%08d.png`) into `out_video`.
    fn encode_frames(&self, frames_dir: &Path, out_video: &Path) -> Result<(), FrameReelError>;

    /// Demux `video` into PNG frames written to `frames_dir` (`out_%08d.png`).
    fn extract_frames(&self, video: &Path, frames_dir: &Path) -> Result<(), FrameReelError>;
}

/// Production [`Muxer`] backed by an external `ffmpeg`-compatible binary.
pub struct FfmpegMuxer {
    /// Path to the `ffmpeg` executable.
    pub binary_path: String,
}

impl FfmpegMuxer {
    /// Build a muxer invoking `binary_path` (e.g. `config::FFMPEG_EXECUTABLE_PATH`).
    pub fn new(binary_path: impl Into<String>) -> Self {
        FfmpegMuxer {
            binary_path: binary_path.into(),
        }
    }
}

impl Muxer for FfmpegMuxer {
    fn encode_frames(&self, frames_dir: &Path, out_video: &Path) -> Result<(), FrameReelError> {
        let pattern = frames_dir.join("out_%08d.png");
        let status = Command::new(&self.binary_path)
            .args([
                "-y",
                "-framerate",
                "30",
                "-i",
                &pattern.to_string_lossy(),
                "-c:v",
                "prores",
                "-profile:v",
                "3",
                "-pix_fmt",
                "yuv422p10",
                &out_video.to_string_lossy(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| FrameReelError::Muxer(format!("failed to spawn ffmpeg: {e}")))?;

        if !status.success() {
            return Err(FrameReelError::Muxer(format!(
                "ffmpeg exited with status {status}"
            )));
        }
        Ok(())
    }

    fn extract_frames(&self, video: &Path, frames_dir: &Path) -> Result<(), FrameReelError> {
        let pattern = frames_dir.join("out_%08d.png");
        let status = Command::new(&self.binary_path)
            .args([
                "-y",
                "-i",
                &video.to_string_lossy(),
                &pattern.to_string_lossy(),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| FrameReelError::Muxer(format!("failed to spawn ffmpeg: {e}")))?;

        if !status.success() {
            return Err(FrameReelError::Muxer(format!(
                "ffmpeg exited with status {status}"
            )));
        }
        Ok(())
    }
}

pub mod test_support {
    //! A [`Muxer`] test double that copies pre-generated PNGs instead of
    //! shelling out, so pipeline tests run without `ffmpeg` installed.
    //!
    //! Not `#[cfg(test)]`-gated: integration tests under `tests/` compile
    //! against this crate as an ordinary dependency, so a unit-test-only
    //! module would be invisible to them.
    use super::*;
    use std::fs;

    /// Fake muxer: "encode" copies the frames dir's PNGs next to a marker
    /// file standing in for the video; "extract" copies them back out.
    pub struct FakeMuxer;

    impl Muxer for FakeMuxer {
        fn encode_frames(&self, frames_dir: &Path, out_video: &Path) -> Result<(), FrameReelError> {
            if let Some(parent) = out_video.parent() {
                fs::create_dir_all(parent).map_err(|e| FrameReelError::io(parent, e))?;
            }
            // Stand in for "the video": a directory holding the same PNGs.
            fs::create_dir_all(out_video).map_err(|e| FrameReelError::io(out_video, e))?;
            for entry in fs::read_dir(frames_dir).map_err(|e| FrameReelError::io(frames_dir, e))? {
                let entry = entry.map_err(|e| FrameReelError::io(frames_dir, e))?;
                let dest = out_video.join(entry.file_name());
                fs::copy(entry.path(), &dest).map_err(|e| FrameReelError::io(&dest, e))?;
            }
            Ok(())
        }

        fn extract_frames(&self, video: &Path, frames_dir: &Path) -> Result<(), FrameReelError> {
            fs::create_dir_all(frames_dir).map_err(|e| FrameReelError::io(frames_dir, e))?;
            for entry in fs::read_dir(video).map_err(|e| FrameReelError::io(video, e))? {
                let entry = entry.map_err(|e| FrameReelError::io(video, e))?;
                let dest = frames_dir.join(entry.file_name());
                fs::copy(entry.path(), &dest).map_err(|e| FrameReelError::io(&dest, e))?;
            }
            Ok(())
        }
    }
}
