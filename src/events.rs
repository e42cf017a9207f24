// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Progress/event bus - a one-way channel of [`Event`] values produced by
//! the pipelines and consumed by an external collaborator (a TUI, or the
//! line-oriented default printer in `main`).

use crossbeam_channel::Sender;

/// A progress update pushed out of the core. The core never reads these
/// back; there is no back-pressure on producers.
#[derive(Debug, Clone)]
pub enum Event {
    /// Indeterminate activity, e.g. "Decoding video...".
    Spin(String),
    /// Determinate progress, with `percent` clamped to `[0.0, 1.0]`.
    Bar {
        /// Label shown alongside the bar.
        text: String,
        /// Completion fraction in `[0.0, 1.0]`.
        percent: f64,
    },
    /// A one-off terminal status line.
    Text(String),
}

impl Event {
    /// Build a [`Event::Bar`], clamping `percent` into `[0.0, 1.0]`.
    pub fn bar(text: impl Into<String>, percent: f64) -> Self {
        Event::Bar {
            text: text.into(),
            percent: percent.clamp(0.0, 1.0),
        }
    }
}

/// Convenience alias for the producer side of the event channel.
pub type EventSink = Sender<Event>;
