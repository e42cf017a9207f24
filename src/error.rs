// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error hierarchy.
//!
//! Library code returns [`FrameReelError`]; the CLI boundary wraps it in
//! `anyhow` for human-facing diagnostics, the same split the rest of this
//! codebase's lineage draws between its libraries and its binaries.

use std::path::PathBuf;

use thiserror::Error;

/// Every fatal (or pipeline-terminating) error this crate can produce.
#[derive(Debug, Error)]
pub enum FrameReelError {
    /// A filesystem operation (create/open/read/write/rename/remove) failed.
    #[error("io error at {path}: {source}")]
    Io {
        /// Path the failing operation was performed against.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The demuxer produced zero frames.
    #[error("no frames found in {dir}")]
    EmptyFrameSet {
        /// Directory that was expected to contain frames.
        dir: PathBuf,
    },

    /// The external muxer/demuxer subprocess exited with a nonzero status,
    /// or could not be spawned at all.
    #[error("muxer failed: {0}")]
    Muxer(String),

    /// The pipeline was cancelled before it completed.
    #[error("cancelled")]
    Cancelled,

    /// Bad CLI usage (missing filename, unsupported combination, ...).
    #[error("usage error: {0}")]
    Usage(String),

    /// A worker failed to save or load a frame image; unlike a checksum
    /// mismatch this is unrecoverable because the frame itself is lost.
    #[error("frame {frame_index} error: {source}")]
    FrameIo {
        /// 1-based frame index the failure occurred on.
        frame_index: usize,
        /// Underlying error.
        #[source]
        source: Box<FrameReelError>,
    },
}

impl FrameReelError {
    /// Wrap an [`std::io::Error`] together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FrameReelError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-frame integrity problem: the header was absent or the checksum
/// disagreed with the decoded data. Non-fatal - logged and the frame's data
/// is still written (see `DESIGN.md`, open question 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeIntegrity {
    /// Header parsed and checksum matched.
    Ok,
    /// Header was absent (no EOF marker, zero timestamp).
    HeaderMissing,
    /// Header parsed but checksum did not match the data.
    ChecksumMismatch,
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, FrameReelError>;
