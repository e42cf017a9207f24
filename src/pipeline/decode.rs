// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decode pipeline: demux a video into frames, fan out to frame-decoder
//! workers, and reassemble the original bytes in order.

use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::warn;

use crate::config::{
    DECODE_FRAMES_DIR, DIR_WATCH_TICK_MS, FALLBACK_OUTPUT_NAME, FRAME_FILE_BYTES, META_BYTES,
};
use crate::error::{FrameReelError, Result};
use crate::events::{Event, EventSink};
use crate::frame;
use crate::job::{DecodeJob, DecodeResult, FileMetadata};
use crate::meta::Header;
use crate::pipeline::{CancellationToken, PipelineConfig};
use crate::store;
use crate::video::Muxer;

/// Demux `video`, decode every frame, and reassemble the original file under
/// `output_dir`. Returns the path the recovered file was written to.
#[allow(clippy::too_many_arguments)]
pub fn decode(
    video: &Path,
    output_dir: &Path,
    overwrite: bool,
    config: &PipelineConfig,
    muxer: &dyn Muxer,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<std::path::PathBuf> {
    if cancel.is_cancelled() {
        return Err(FrameReelError::Cancelled);
    }

    let frames_dir = std::env::temp_dir().join(DECODE_FRAMES_DIR);
    store::clear_frames_dir(&frames_dir)?;

    extract_with_progress(video, &frames_dir, muxer, events, cancel)?;
    if cancel.is_cancelled() {
        return Err(FrameReelError::Cancelled);
    }

    let frame_paths = store::list_frames(&frames_dir)?;
    let total = frame_paths.len();
    let worker_count = config.worker_count();

    let (jobs_tx, jobs_rx) = bounded::<DecodeJob>(worker_count);
    let cancel_rx = cancel.receiver();
    let result_channels: Vec<(Sender<DecodeResult>, Receiver<DecodeResult>)> =
        (0..total).map(|_| bounded(1)).collect();
    let result_senders: Vec<Sender<DecodeResult>> =
        result_channels.iter().map(|(tx, _)| tx.clone()).collect();

    let mut temp = store::create_temp_file(&frames_dir)?;
    let mut file_metadata: Option<FileMetadata> = None;
    let mut total_pixel_errors = 0usize;

    let pipeline_result: Result<()> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                let jobs_rx = jobs_rx.clone();
                let cancel_rx = cancel_rx.clone();
                let result_senders = result_senders.clone();
                scope.spawn(move || -> Result<()> {
                    loop {
                        select! {
                            recv(jobs_rx) -> msg => match msg {
                                Ok(job) => {
                                    let frame_index = job.frame_index;
                                    let result = decode_one(&job).unwrap_or_else(|e| {
                                        warn!("frame {frame_index} failed to decode: {e}");
                                        DecodeResult {
                                            data_bytes: Vec::new(),
                                            header: Header::parse(&[]),
                                            ok: false,
                                            pixel_errors: 0,
                                        }
                                    });
                                    let _ = result_senders[frame_index].send(result);
                                }
                                Err(_) => return Ok(()),
                            },
                            recv(cancel_rx) -> _ => return Err(FrameReelError::Cancelled),
                        }
                    }
                })
            })
            .collect();

        let producer_result: Result<()> = (|| {
            for (i, path) in frame_paths.iter().enumerate() {
                let job = DecodeJob {
                    frame_path: path.clone(),
                    frame_index: i,
                };
                select! {
                    send(jobs_tx, job) -> res => res.map_err(|_| FrameReelError::Cancelled)?,
                    recv(cancel_rx) -> _ => return Err(FrameReelError::Cancelled),
                }
            }
            Ok(())
        })();
        drop(jobs_tx);

        let writer_result: Result<()> = (|| {
            for (i, (_, rx)) in result_channels.iter().enumerate() {
                let result = select! {
                    recv(rx) -> msg => msg.map_err(|_| FrameReelError::Cancelled)?,
                    recv(cancel_rx) -> _ => return Err(FrameReelError::Cancelled),
                };

                if !result.ok {
                    warn!("frame {i} failed header/checksum validation");
                }
                if file_metadata.is_none() && result.ok {
                    file_metadata = Some(FileMetadata {
                        header: result.header.clone(),
                    });
                }
                total_pixel_errors += result.pixel_errors;
                temp.write_all(&result.data_bytes)?;

                let _ = events.send(Event::bar(
                    format!("Decoding frame {}/{}", i + 1, total),
                    (i + 1) as f64 / total.max(1) as f64,
                ));
            }
            Ok(())
        })();

        let mut first_worker_err = None;
        for handle in handles {
            if let Err(e) = handle.join().expect("decode worker panicked") {
                first_worker_err.get_or_insert(e);
            }
        }

        producer_result?;
        writer_result?;
        if let Some(e) = first_worker_err {
            return Err(e);
        }
        Ok(())
    });
    pipeline_result?;

    if total_pixel_errors > 0 {
        warn!("{total_pixel_errors} blocks across {total} frames did not vote unanimously");
    }

    let output_name = file_metadata
        .as_ref()
        .map(|m| m.header.filename.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_OUTPUT_NAME.to_string());

    let dest = store::finalize_temp(temp, &frames_dir, output_dir, &output_name, overwrite)?;
    let _ = events.send(Event::Text(format!("Decoded to {}", dest.display())));
    Ok(dest)
}

/// Decode a single frame, splitting its recovered bytes into header and data.
fn decode_one(job: &DecodeJob) -> Result<DecodeResult> {
    let img = store::load_frame(&job.frame_path).map_err(|e| FrameReelError::FrameIo {
        frame_index: job.frame_index,
        source: Box::new(e),
    })?;
    let decoded = frame::decode_frame(&img);
    let n_bytes = decoded.data_symbol_count / 8;

    let header = if decoded.bytes.len() >= META_BYTES {
        Header::parse(&decoded.bytes[0..META_BYTES])
    } else {
        Header::parse(&decoded.bytes)
    };

    let data_bytes = if n_bytes > META_BYTES {
        decoded.bytes[META_BYTES..n_bytes].to_vec()
    } else {
        Vec::new()
    };

    let ok = header.is_present() && header.validate(&data_bytes);
    Ok(DecodeResult {
        data_bytes,
        header,
        ok,
        pixel_errors: decoded.pixel_errors,
    })
}

/// Invoke the demuxer while a watcher thread reports progress based on the
/// number of frame files that have appeared in `frames_dir`.
fn extract_with_progress(
    video: &Path,
    frames_dir: &Path,
    muxer: &dyn Muxer,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<()> {
    let _ = events.send(Event::Spin("Demuxing video...".into()));
    let (done_tx, done_rx) = bounded::<()>(0);
    let cancel_rx = cancel.receiver();
    let estimated_frames = std::fs::metadata(video)
        .map(|m| (m.len() / FRAME_FILE_BYTES).max(1) as usize)
        .unwrap_or(1);

    std::thread::scope(|scope| {
        scope.spawn(move || loop {
            select! {
                recv(done_rx) -> _ => return,
                recv(cancel_rx) -> _ => return,
                default(Duration::from_millis(DIR_WATCH_TICK_MS)) => {
                    if let Ok(listed) = store::list_frames(frames_dir) {
                        let percent = listed.len() as f64 / estimated_frames as f64;
                        let _ = events.send(Event::bar("Demuxing video...", percent));
                    }
                }
            }
        });

        let result = muxer.extract_frames(video, frames_dir);
        drop(done_tx);
        result
    })
}
