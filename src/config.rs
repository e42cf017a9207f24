// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Global constants.
//!
//! These are the fixed parameters of the frame codec: a single 4K
//! three-valued encoding with no tunable bit-depth or resolution, so most of
//! these are not meant to be changed at runtime - they define the wire
//! format.

/// Width in pixels of every generated frame.
pub const FRAME_W: u32 = 3840;

/// Height in pixels of every generated frame.
pub const FRAME_H: u32 = 2160;

/// Side length, in pixels, of the square block that encodes one symbol.
pub const BLOCK: u32 = 2;

/// Number of 2x2 blocks (and therefore symbols) in a single frame.
pub const SYMBOLS_PER_FRAME: usize =
    (FRAME_W as usize * FRAME_H as usize) / (BLOCK as usize * BLOCK as usize);

/// One payload bit per block; two of the three symbol colors carry data.
pub const PAYLOAD_BITS: usize = SYMBOLS_PER_FRAME;

/// Bytes of encoded payload (header + data) carried by a single frame.
pub const PAYLOAD_BYTES: usize = PAYLOAD_BITS / 8;

/// Fixed size, in bytes, of the per-frame metadata header.
pub const META_BYTES: usize = 256;

/// User data bytes available per frame once the header is subtracted.
pub const DATA_BYTES: usize = PAYLOAD_BYTES - META_BYTES;

/// Maximum filename length storable in the header.
///
/// 524 would exceed the 256-byte header and cannot be correct; 240, the
/// value consistent with `META_BYTES`, is what's used. See `DESIGN.md` for
/// the full discussion.
pub const FILENAME_MAX: usize = META_BYTES - 16;

/// Byte marking the end of the filename field inside the header.
pub const FILENAME_EOF: &str = "/";

/// Marker inserted between a truncated filename stem and its extension.
pub const FILENAME_CUT: &str = "--";

/// Estimated size, in bytes, of a single ProRes-encoded frame once muxed.
///
/// Used only to estimate progress percentages; no invariant depends on it.
pub const FRAME_FILE_BYTES: u64 = 7_684_000;

/// Poll interval used by the directory-watcher that estimates decode progress
/// while the external demuxer is still writing frames.
pub const DIR_WATCH_TICK_MS: u64 = 100;

/// Directory name (under the OS temp dir) holding frames produced by encode.
pub const OUT_FRAMES_DIR: &str = "framereel_out";

/// Directory name (under the OS temp dir) holding frames produced by decode.
pub const DECODE_FRAMES_DIR: &str = "framereel_frames";

/// Filename used for the decoded output when no valid header was recovered.
pub const FALLBACK_OUTPUT_NAME: &str = "out_decoded.bin";

/// Default path to the `ffmpeg` executable.
pub const FFMPEG_EXECUTABLE_PATH: &str = "/bin/ffmpeg";
