//! # Disposal registry: cleanup obligations released exactly once.
//!
//! [`Disposer`] collects the cleanup obligations a module accumulates while
//! it is alive — deferred closures, spawned task aborts, cancellation
//! tokens, arbitrary [`Dispose`] objects — and releases all of them
//! atomically during unload, exactly once, regardless of whether the unload
//! hook or any child propagation failed.
//!
//! ## Rules
//! - Obligations run in registration order.
//! - `release()` is idempotent: the second and later calls are no-ops.
//! - Registering on an already released disposer runs the obligation
//!   immediately instead of leaking it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

/// An arbitrary object with a single-shot cleanup action.
///
/// Implement this for resources whose release is more than a closure can
/// express (e.g. a guard that must log, or a handle pool).
pub trait Dispose: Send + 'static {
    /// Releases the resource. Called at most once.
    fn dispose(self: Box<Self>);
}

enum Obligation {
    Defer(Box<dyn FnOnce() + Send + 'static>),
    Abort(AbortHandle),
    Cancel(CancellationToken),
    Custom(Box<dyn Dispose>),
}

impl Obligation {
    fn release(self) {
        match self {
            Obligation::Defer(f) => f(),
            Obligation::Abort(handle) => handle.abort(),
            Obligation::Cancel(token) => token.cancel(),
            Obligation::Custom(d) => d.dispose(),
        }
    }
}

#[derive(Default)]
struct DisposerState {
    obligations: Vec<Obligation>,
    released: bool,
}

/// Per-instance collection of cleanup obligations.
///
/// Owned by a module host; payload hooks reach it through
/// `ModuleHost::disposer()`.
#[derive(Default)]
pub struct Disposer {
    state: Mutex<DisposerState>,
}

impl Disposer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, DisposerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a cleanup closure.
    pub fn defer(&self, f: impl FnOnce() + Send + 'static) {
        self.push(Obligation::Defer(Box::new(f)));
    }

    /// Registers a spawned task to be aborted at release.
    ///
    /// Only the abort handle is retained; the join handle may be dropped or
    /// awaited elsewhere.
    pub fn attach_task<T>(&self, handle: &JoinHandle<T>) {
        self.push(Obligation::Abort(handle.abort_handle()));
    }

    /// Registers a cancellation token to be cancelled at release.
    ///
    /// This is the hook for deferred values: hand their token here and they
    /// resolve as cancelled when the instance terminates.
    pub fn attach_token(&self, token: CancellationToken) {
        self.push(Obligation::Cancel(token));
    }

    /// Registers an arbitrary disposable object.
    pub fn attach(&self, disposable: Box<dyn Dispose>) {
        self.push(Obligation::Custom(disposable));
    }

    /// Number of obligations currently held (0 after release).
    pub fn len(&self) -> usize {
        self.guard().obligations.len()
    }

    /// Returns `true` when no obligations are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the registry has been released.
    pub fn is_released(&self) -> bool {
        self.guard().released
    }

    fn push(&self, obligation: Obligation) {
        {
            let mut state = self.guard();
            if !state.released {
                state.obligations.push(obligation);
                return;
            }
        }
        obligation.release();
    }

    /// Releases every obligation, exactly once, in registration order.
    pub(crate) fn release(&self) {
        let drained = {
            let mut state = self.guard();
            if state.released {
                return;
            }
            state.released = true;
            std::mem::take(&mut state.obligations)
        };
        for obligation in drained {
            obligation.release();
        }
    }
}
