// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Encode pipeline: chunk a file, fan out to frame-encoder workers, mux the
//! resulting frames into a video.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{bounded, select};

use crate::config::{DATA_BYTES, DIR_WATCH_TICK_MS, FRAME_FILE_BYTES, OUT_FRAMES_DIR};
use crate::error::{FrameReelError, Result};
use crate::events::{Event, EventSink};
use crate::frame;
use crate::job::EncodeJob;
use crate::meta::Header;
use crate::pipeline::{CancellationToken, PipelineConfig};
use crate::store;
use crate::video::Muxer;

/// Encode `input_path` into `output_video` using `muxer`, reporting progress
/// on `events` and honoring `cancel`.
///
/// An empty input file produces no frames and returns successfully without
/// touching the muxer - there is nothing meaningful to mux (see
/// `DESIGN.md`, empty-file handling).
pub fn encode(
    input_path: &Path,
    output_video: &Path,
    config: &PipelineConfig,
    muxer: &dyn Muxer,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(FrameReelError::Cancelled);
    }

    let mut file = File::open(input_path).map_err(|e| FrameReelError::io(input_path, e))?;
    let file_size = file
        .metadata()
        .map_err(|e| FrameReelError::io(input_path, e))?
        .len();

    if file_size == 0 {
        let _ = events.send(Event::Text("Empty input, nothing to encode.".into()));
        return Ok(());
    }

    let frames_dir = std::env::temp_dir().join(OUT_FRAMES_DIR);
    store::clear_frames_dir(&frames_dir)?;

    let worker_count = config.worker_count();
    let estimated_frames = (file_size as usize).div_ceil(DATA_BYTES).max(1);

    let _ = events.send(Event::Spin("Encoding...".into()));

    let (jobs_tx, jobs_rx) = bounded::<EncodeJob>(worker_count);
    let cancel_rx = cancel.receiver();

    let pipeline_result: Result<()> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..worker_count)
            .map(|_| {
                let jobs_rx = jobs_rx.clone();
                let cancel_rx = cancel_rx.clone();
                let frames_dir = frames_dir.clone();
                scope.spawn(move || -> Result<()> {
                    loop {
                        select! {
                            recv(jobs_rx) -> msg => match msg {
                                Ok(job) => encode_one(&frames_dir, job)?,
                                Err(_) => return Ok(()),
                            },
                            recv(cancel_rx) -> _ => return Err(FrameReelError::Cancelled),
                        }
                    }
                })
            })
            .collect();

        let chunker_result = run_chunker(
            &mut file,
            input_path,
            &jobs_tx,
            &cancel_rx,
            events,
            estimated_frames,
        );
        drop(jobs_tx);

        let mut first_worker_err = None;
        for handle in handles {
            if let Err(e) = handle.join().expect("encode worker panicked") {
                first_worker_err.get_or_insert(e);
            }
        }

        chunker_result?;
        if let Some(e) = first_worker_err {
            return Err(e);
        }
        Ok(())
    });
    pipeline_result?;

    if cancel.is_cancelled() {
        return Err(FrameReelError::Cancelled);
    }

    mux_with_progress(&frames_dir, output_video, muxer, events, cancel, estimated_frames)?;

    std::fs::remove_dir_all(&frames_dir).map_err(|e| FrameReelError::io(&frames_dir, e))?;
    let _ = events.send(Event::Text("Encoding complete.".into()));
    Ok(())
}

/// Read `DATA_BYTES`-sized chunks from `file`, build a header for each, and
/// submit jobs to `jobs_tx`, reporting a `Bar` event after each submission.
fn run_chunker(
    file: &mut File,
    input_path: &Path,
    jobs_tx: &crossbeam_channel::Sender<EncodeJob>,
    cancel_rx: &crossbeam_channel::Receiver<()>,
    events: &EventSink,
    estimated_frames: usize,
) -> Result<()> {
    let mut read_buf = vec![0u8; DATA_BYTES];
    let mut frame_index = 0usize;
    loop {
        let n = file
            .read(&mut read_buf)
            .map_err(|e| FrameReelError::io(input_path, e))?;
        if n == 0 {
            break;
        }
        frame_index += 1;
        let chunk = read_buf[..n].to_vec();
        let header = Header::build(input_path, &chunk);
        let job = EncodeJob {
            chunk,
            header,
            frame_index,
        };

        select! {
            send(jobs_tx, job) -> res => res.map_err(|_| FrameReelError::Cancelled)?,
            recv(cancel_rx) -> _ => return Err(FrameReelError::Cancelled),
        }

        let _ = events.send(Event::bar(
            format!("Encoding frame {frame_index}/{estimated_frames}"),
            frame_index as f64 / estimated_frames as f64,
        ));
    }
    Ok(())
}

/// Encode and save a single frame.
fn encode_one(frames_dir: &Path, job: EncodeJob) -> Result<()> {
    let image = frame::encode_frame(&job.chunk, &job.header);
    store::save_frame(frames_dir, job.frame_index, &image).map_err(|e| FrameReelError::FrameIo {
        frame_index: job.frame_index,
        source: Box::new(e),
    })
}

/// Invoke the muxer while a watcher thread reports muxing progress based on
/// the growing output file size (an estimate; the muxer produces one file).
fn mux_with_progress(
    frames_dir: &Path,
    output_video: &Path,
    muxer: &dyn Muxer,
    events: &EventSink,
    cancel: &CancellationToken,
    estimated_frames: usize,
) -> Result<()> {
    let _ = events.send(Event::Spin("Muxing video...".into()));
    let (done_tx, done_rx) = bounded::<()>(0);
    let cancel_rx = cancel.receiver();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            let estimate_total = estimated_frames as f64 * FRAME_FILE_BYTES as f64 * 1.03;
            loop {
                select! {
                    recv(done_rx) -> _ => return,
                    recv(cancel_rx) -> _ => return,
                    default(Duration::from_millis(DIR_WATCH_TICK_MS)) => {
                        if let Ok(meta) = std::fs::metadata(output_video) {
                            let percent = meta.len() as f64 / estimate_total;
                            let _ = events.send(Event::bar("Muxing video...", percent));
                        }
                    }
                }
            }
        });

        let result = muxer.encode_frames(frames_dir, output_video);
        drop(done_tx);
        result
    })
}
