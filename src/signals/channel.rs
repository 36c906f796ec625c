//! # Single broadcast channel with explicit close semantics.
//!
//! [`Channel`] is a thin wrapper around [`tokio::sync::broadcast`] carrying
//! one lifecycle signal. Unlike a bare broadcast sender it can be *closed*:
//! after the terminal did-unload emission the host closes every channel, so
//! observers see `RecvError::Closed` instead of waiting forever on a dead
//! instance.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; events are dropped
//!   when no receiver is subscribed.
//! - **Bounded capacity**: a ring buffer stores recent events per channel;
//!   lagging receivers observe `RecvError::Lagged(n)` and skip `n` items.
//! - **Close is terminal**: publishing after close is a silent no-op;
//!   subscribing after close yields an immediately closed receiver.

use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use super::event::SignalEvent;

/// Broadcast channel for one lifecycle signal.
pub(crate) struct Channel {
    tx: Mutex<Option<broadcast::Sender<SignalEvent>>>,
}

impl Channel {
    /// Creates an open channel with the given ring-buffer capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Option<broadcast::Sender<SignalEvent>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes an event to all active receivers.
    ///
    /// Dropped silently when the channel is closed or nobody is subscribed.
    pub(crate) fn publish(&self, ev: SignalEvent) {
        if let Some(tx) = self.guard().as_ref() {
            let _ = tx.send(ev);
        }
    }

    /// Creates a receiver observing subsequent events.
    ///
    /// After close, the returned receiver reports `RecvError::Closed` on the
    /// first `recv()`.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SignalEvent> {
        match self.guard().as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = broadcast::channel(1);
                drop(tx);
                rx
            }
        }
    }

    /// Closes the channel; active receivers drain buffered events and then
    /// observe `RecvError::Closed`.
    pub(crate) fn close(&self) {
        self.guard().take();
    }
}
