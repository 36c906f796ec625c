//! # Per-signal channel set.
//!
//! [`SignalSet`] owns one [`Channel`] per lifecycle signal plus a combined
//! firehose channel that carries every event regardless of signal. Observers
//! subscribe to exactly the signals they care about; diagnostic consumers
//! (such as the `logging` feature's `LogWriter`) subscribe to the firehose.
//!
//! ## Architecture
//! ```text
//! publish(ev)
//!     ├──► channel[ev.signal]  ──► per-signal receivers
//!     └──► firehose            ──► subscribe_all() receivers
//! ```
//!
//! ## Rules
//! - Publishing routes by the event's own [`Signal`].
//! - `close_all()` closes every channel including the firehose; it is the
//!   final action of a terminal unload.

use tokio::sync::broadcast;

use super::channel::Channel;
use super::event::{Signal, SignalEvent};

/// The set of broadcast channels of one module host.
pub(crate) struct SignalSet {
    channels: [Channel; 12],
    firehose: Channel,
}

impl SignalSet {
    /// Creates open channels, each with the given capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| Channel::new(capacity)),
            firehose: Channel::new(capacity),
        }
    }

    /// Publishes an event on its signal's channel and on the firehose.
    pub(crate) fn publish(&self, ev: SignalEvent) {
        self.firehose.publish(ev.clone());
        self.channels[ev.signal.index()].publish(ev);
    }

    /// Subscribes to one signal.
    pub(crate) fn subscribe(&self, signal: Signal) -> broadcast::Receiver<SignalEvent> {
        self.channels[signal.index()].subscribe()
    }

    /// Subscribes to every signal through the firehose channel.
    pub(crate) fn subscribe_all(&self) -> broadcast::Receiver<SignalEvent> {
        self.firehose.subscribe()
    }

    /// Closes every channel. Terminal; there is no reopen.
    pub(crate) fn close_all(&self) {
        for ch in &self.channels {
            ch.close();
        }
        self.firehose.close();
    }
}
