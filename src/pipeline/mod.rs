// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Encode and decode pipelines: the ordered multi-worker machinery that
//! drives the frame codec at throughput close to I/O.

pub mod decode;
pub mod encode;

use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::FFMPEG_EXECUTABLE_PATH;

/// Tunables threaded into both pipelines, built by the CLI layer.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of frame workers to spawn, in addition to the `+1` always
    /// added (so `workers = None` means `NCPU + 1`).
    pub workers: Option<usize>,
    /// Path to the `ffmpeg`-compatible binary.
    pub ffmpeg_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            workers: None,
            ffmpeg_path: FFMPEG_EXECUTABLE_PATH.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Resolve the configured worker count, defaulting to `NCPU + 1`.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                + 1
        })
    }
}

/// A cancellation signal shared across every pipeline component.
///
/// Implemented as a zero-capacity channel rather than a plain `AtomicBool`
/// so every blocking point can `select!` on it alongside its normal
/// work/result channel instead of polling on a timer: cancelling closes the
/// channel, which immediately wakes every clone of the receiver.
pub struct CancellationToken {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    /// Build a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        CancellationToken {
            sender: Mutex::new(Some(tx)),
            receiver: rx,
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let mut guard = self.sender.lock().expect("cancellation token poisoned");
        *guard = None;
    }

    /// True once `cancel()` has been called.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.receiver.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        )
    }

    /// A receiver that becomes ready (disconnected) once cancelled; clone
    /// freely across worker threads for use in `select!`.
    pub fn receiver(&self) -> Receiver<()> {
        self.receiver.clone()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.receiver().try_recv().is_err());
    }

    #[test]
    fn cancel_is_observed_by_every_clone() {
        let token = CancellationToken::new();
        let rx_a = token.receiver();
        let rx_b = token.receiver();

        token.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(
            rx_a.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        ));
        assert!(matches!(
            rx_b.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn worker_count_defaults_to_ncpu_plus_one() {
        let config = PipelineConfig::default();
        let ncpu = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(config.worker_count(), ncpu + 1);
    }

    #[test]
    fn worker_count_honors_override() {
        let config = PipelineConfig {
            workers: Some(3),
            ..PipelineConfig::default()
        };
        assert_eq!(config.worker_count(), 3);
    }
}
