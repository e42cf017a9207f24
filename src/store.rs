// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Frame store - PNG frames on disk, an ordering-preserving filename scheme,
//! and the decode pipeline's temp output file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use glob::glob;
use image::RgbaImage;

use crate::error::{FrameReelError, Result};

/// Build the on-disk name for frame `index` (1-based), e.g. `out_00000001.png`.
pub fn frame_filename(index: usize) -> String {
    format!("out_{index:08}.png")
}

/// Idempotently create `dir` (and any missing parents) and return it.
pub fn ensure_frames_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| FrameReelError::io(dir, e))?;
    }
    Ok(dir.to_path_buf())
}

/// Remove `dir` (if present) and recreate it empty, so stale frames from a
/// previous run never leak into a new one.
pub fn clear_frames_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| FrameReelError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| FrameReelError::io(dir, e))?;
    Ok(())
}

/// Save `image` as `<dir>/out_{index:08}.png`, creating `dir` if missing.
pub fn save_frame(dir: &Path, index: usize, image: &RgbaImage) -> Result<()> {
    ensure_frames_dir(dir)?;
    let path = dir.join(frame_filename(index));
    image
        .save(&path)
        .map_err(|e| FrameReelError::io(&path, std::io::Error::other(e)))
}

/// Read back the frame image saved at `path`.
pub fn load_frame(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .map_err(|e| FrameReelError::io(path, std::io::Error::other(e)))?;
    Ok(img.to_rgba8())
}

/// List all frames in `dir` in ascending (lexicographic == numeric) order.
/// An empty listing is reported as [`FrameReelError::EmptyFrameSet`].
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("out_*.png");
    let mut paths: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .map_err(|e| FrameReelError::Muxer(format!("bad glob pattern: {e}")))?
        .filter_map(|r| r.ok())
        .collect();
    paths.sort();
    if paths.is_empty() {
        return Err(FrameReelError::EmptyFrameSet {
            dir: dir.to_path_buf(),
        });
    }
    Ok(paths)
}

/// An opaque writable sink used by the decode writer; wraps a `File` plus
/// the scratch path it currently lives at so `finalize_temp` can rename it.
pub struct TempOutput {
    file: File,
    path: PathBuf,
}

impl TempOutput {
    /// Append `data` to the temp output.
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        use std::io::Write;
        self.file
            .write_all(data)
            .map_err(|e| FrameReelError::io(&self.path, e))
    }
}

/// Create a fresh temp file inside `dir` to accumulate decoded bytes into.
pub fn create_temp_file(dir: &Path) -> Result<TempOutput> {
    ensure_frames_dir(dir)?;
    let path = dir.join(".framereel_decode.tmp");
    let file = File::create(&path).map_err(|e| FrameReelError::io(&path, e))?;
    Ok(TempOutput { file, path })
}

/// Flush, close, and move the temp file to `output_name` inside `final_dir`,
/// then remove the now-empty frames directory that held it and the frames.
///
/// Refuses to clobber a pre-existing `dest` unless `overwrite` is set.
pub fn finalize_temp(
    mut temp: TempOutput,
    frames_dir: &Path,
    final_dir: &Path,
    output_name: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    use std::io::Write;
    temp.file
        .flush()
        .map_err(|e| FrameReelError::io(&temp.path, e))?;
    drop(temp.file);

    let dest = final_dir.join(output_name);
    if dest.exists() && !overwrite {
        return Err(FrameReelError::Usage(format!(
            "{} already exists (use --overwrite)",
            dest.display()
        )));
    }
    fs::rename(&temp.path, &dest).map_err(|e| FrameReelError::io(&dest, e))?;
    fs::remove_dir_all(frames_dir).map_err(|e| FrameReelError::io(frames_dir, e))?;
    Ok(dest)
}
