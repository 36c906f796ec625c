//! # Lifecycle signals and the events delivered on them.
//!
//! [`Signal`] classifies the twelve observable lifecycle signals: will/did
//! pairs for load, suspend, resume, unload, load-child and unload-child.
//! [`SignalEvent`] is the payload delivered on a signal's channel: either a
//! successful transition notification or a propagated error.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events from
//! several channels are merged by an observer.
//!
//! ## Example
//! ```
//! use modvisor::{Signal, SignalEvent};
//!
//! let ev = SignalEvent::new(Signal::DidLoadChild, "shell").with_child("cart");
//!
//! assert_eq!(ev.signal, Signal::DidLoadChild);
//! assert_eq!(&*ev.module, "shell");
//! assert_eq!(ev.child.as_deref(), Some("cart"));
//! assert!(!ev.is_error());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::error::LifecycleError;
use crate::state::TransitionOp;

/// Global sequence counter for event ordering.
static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// One of the observable lifecycle signals.
///
/// Every signal has its own broadcast channel on a module host. Will-signals
/// fire before the corresponding hook runs; did-signals fire after the
/// transition settles and carry any propagated error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Load transition is about to run.
    WillLoad,
    /// Load transition settled (success or error).
    DidLoad,
    /// Suspend transition is about to run.
    WillSuspend,
    /// Suspend transition settled.
    DidSuspend,
    /// Resume transition is about to run.
    WillResume,
    /// Resume transition settled.
    DidResume,
    /// Unload was approved and is about to run. Never fires on a veto.
    WillUnload,
    /// Unload settled; the instance is terminal. Never fires on a veto.
    DidUnload,
    /// A child is about to be registered and loaded.
    WillLoadChild,
    /// A child was registered and loaded.
    DidLoadChild,
    /// A child began its unload and was removed from the active set.
    WillUnloadChild,
    /// A child finished its unload.
    DidUnloadChild,
}

impl Signal {
    /// All signals, in will/did pair order.
    pub const ALL: [Signal; 12] = [
        Signal::WillLoad,
        Signal::DidLoad,
        Signal::WillSuspend,
        Signal::DidSuspend,
        Signal::WillResume,
        Signal::DidResume,
        Signal::WillUnload,
        Signal::DidUnload,
        Signal::WillLoadChild,
        Signal::DidLoadChild,
        Signal::WillUnloadChild,
        Signal::DidUnloadChild,
    ];

    /// Index of this signal into per-signal channel storage.
    pub(crate) fn index(self) -> usize {
        match self {
            Signal::WillLoad => 0,
            Signal::DidLoad => 1,
            Signal::WillSuspend => 2,
            Signal::DidSuspend => 3,
            Signal::WillResume => 4,
            Signal::DidResume => 5,
            Signal::WillUnload => 6,
            Signal::DidUnload => 7,
            Signal::WillLoadChild => 8,
            Signal::DidLoadChild => 9,
            Signal::WillUnloadChild => 10,
            Signal::DidUnloadChild => 11,
        }
    }

    /// The will-signal announcing `op`.
    pub(crate) fn will_of(op: TransitionOp) -> Signal {
        match op {
            TransitionOp::Load => Signal::WillLoad,
            TransitionOp::Suspend => Signal::WillSuspend,
            TransitionOp::Resume => Signal::WillResume,
            TransitionOp::Unload => Signal::WillUnload,
        }
    }

    /// The did-signal settling `op`.
    pub(crate) fn did_of(op: TransitionOp) -> Signal {
        match op {
            TransitionOp::Load => Signal::DidLoad,
            TransitionOp::Suspend => Signal::DidSuspend,
            TransitionOp::Resume => Signal::DidResume,
            TransitionOp::Unload => Signal::DidUnload,
        }
    }

    /// Returns a stable kebab-case label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Signal::WillLoad => "will-load",
            Signal::DidLoad => "did-load",
            Signal::WillSuspend => "will-suspend",
            Signal::DidSuspend => "did-suspend",
            Signal::WillResume => "will-resume",
            Signal::DidResume => "did-resume",
            Signal::WillUnload => "will-unload",
            Signal::DidUnload => "did-unload",
            Signal::WillLoadChild => "will-load-child",
            Signal::DidLoadChild => "did-load-child",
            Signal::WillUnloadChild => "will-unload-child",
            Signal::DidUnloadChild => "did-unload-child",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Event delivered on a lifecycle signal channel.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `error`: `None` for a successful transition notification, `Some` when a
///   transition error is propagated to observers
#[derive(Debug, Clone)]
pub struct SignalEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Signal classification.
    pub signal: Signal,
    /// Name of the module the signal belongs to.
    pub module: Arc<str>,
    /// Child module name, set on the load-child/unload-child signals.
    pub child: Option<Arc<str>>,
    /// Propagated transition error, if any.
    pub error: Option<LifecycleError>,
}

impl SignalEvent {
    /// Creates a new event with the current timestamp and next sequence number.
    pub fn new(signal: Signal, module: impl Into<Arc<str>>) -> Self {
        Self {
            seq: SIGNAL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            signal,
            module: module.into(),
            child: None,
            error: None,
        }
    }

    /// Attaches the child module name.
    #[inline]
    pub fn with_child(mut self, child: impl Into<Arc<str>>) -> Self {
        self.child = Some(child.into());
        self
    }

    /// Attaches a propagated error.
    #[inline]
    pub fn with_error(mut self, error: LifecycleError) -> Self {
        self.error = Some(error);
        self
    }

    /// Returns `true` when this event carries a propagated error.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LifecycleState, TransitionOp};

    #[test]
    fn test_seq_is_monotonic() {
        let a = SignalEvent::new(Signal::WillLoad, "m");
        let b = SignalEvent::new(Signal::DidLoad, "m");
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_attach_metadata() {
        let err = LifecycleError::IllegalTransition {
            module: "m".into(),
            op: TransitionOp::Resume,
            from: LifecycleState::Instantiated,
            allowed: TransitionOp::Resume.allowed_sources(),
        };
        let ev = SignalEvent::new(Signal::DidResume, "m").with_error(err.clone());
        assert!(ev.is_error());
        assert_eq!(ev.error, Some(err));
        assert_eq!(ev.child, None);
    }

    #[test]
    fn test_all_covers_every_index_once() {
        let mut seen = [false; 12];
        for s in Signal::ALL {
            assert!(!seen[s.index()], "duplicate index for {s}");
            seen[s.index()] = true;
        }
        assert!(seen.iter().all(|&b| b));
    }
}
