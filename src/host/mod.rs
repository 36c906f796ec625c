//! Lifecycle engine core: the module host and its collaborators.
//!
//! This module contains the embedded implementation of the lifecycle engine.
//! The central public type is [`ModuleHost`], the per-instance state machine
//! that owns the signal channels, the disposal registry, and the child set.
//!
//! Internal modules:
//! - [`transition`]: the transition coordinator — request protocol,
//!   pending-transition chaining, and the four transition bodies;
//! - [`children`]: ordered child registry and parent/child unload wiring;
//! - [`negotiation`]: recursive unload eligibility polling;
//! - [`disposer`]: cleanup obligations released exactly once at unload.
//!
//! ## High-level architecture
//! ```text
//! ModuleHost (one per module instance)
//!   ├─ Mutex<HostInner>     state, previous_state, pending transition,
//!   │                       ordered children, parent link
//!   ├─ SignalSet            one broadcast channel per lifecycle signal
//!   ├─ Disposer             cleanup obligations (closures, aborts, tokens)
//!   └─ ModuleRef            the payload's overridable hooks
//!
//! load()/suspend()/resume()/unload():
//!   request protocol (sync, under the state lock)
//!     ├─ redundant        → existing pending handle (no hooks)
//!     ├─ disallowed       → handle failing with IllegalTransition
//!     └─ admitted         → reserve in-progress state, chain on the
//!                           predecessor, spawn the transition driver
//!   driver (spawned task)
//!     ├─ await predecessor completion (serialization)
//!     ├─ run the transition body (hooks, fan-out, events)
//!     └─ clear the pending slot, resolve every waiting handle
//! ```

mod children;
mod disposer;
mod negotiation;
mod transition;

pub use disposer::{Dispose, Disposer};
pub use transition::TransitionHandle;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::config::LifecycleConfig;
use crate::modules::{Module, ModuleRef};
use crate::signals::{Signal, SignalEvent, SignalSet};
use crate::state::LifecycleState;

use children::ParentLink;
use transition::PendingTransition;

/// Mutable per-instance state, guarded by the host's mutex.
///
/// Critical sections stay short and are never held across an await.
struct HostInner {
    /// Current lifecycle state; mutated only by the transition coordinator.
    state: LifecycleState,
    /// Set only while `unloading`: the state restored if unload is vetoed.
    previous_state: Option<LifecycleState>,
    /// In-flight transition, or `None` when idle.
    pending: Option<PendingTransition>,
    /// Monotonic transition counter for slot hygiene.
    next_transition_id: u64,
    /// Active children, insertion order = load order.
    children: Vec<Arc<ModuleHost>>,
    /// Wiring back to the registering parent, if any.
    parent: Option<ParentLink>,
}

/// # Per-instance lifecycle state machine.
///
/// A `ModuleHost` wraps one [`Module`] payload and coordinates its whole
/// lifecycle: serialized transitions, child propagation, unload negotiation,
/// observable signals, and disposal. Hosts are always handled through `Arc`.
///
/// ### Guarantees
/// - Operations on one instance are strictly serialized: a later request
///   always waits on the previously pending transition before its body runs.
/// - Fan-outs to different children run concurrently and are joined with
///   wait-for-all semantics (first error remembered, no sibling cancellation).
/// - An instance supports exactly one load→unload cycle; after the terminal
///   did-unload emission every signal channel is closed.
///
/// ### Example
/// ```no_run
/// use std::sync::Arc;
/// use modvisor::{HookError, ModuleFn, ModuleHost};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), modvisor::LifecycleError> {
///     let host = ModuleHost::new(ModuleFn::new("app", |_host: Arc<ModuleHost>| async move {
///         Ok::<_, HookError>(())
///     }));
///
///     host.load().wait().await?;
///     assert!(host.is_loaded());
///
///     host.unload().wait().await?;
///     assert!(host.is_unloaded());
///     Ok(())
/// }
/// ```
pub struct ModuleHost {
    /// Stable copy of the payload's name.
    name: Arc<str>,
    /// The payload hooks.
    module: ModuleRef,
    /// Broadcast channels, one per lifecycle signal.
    signals: SignalSet,
    /// Cleanup obligations released at unload.
    disposer: Disposer,
    /// Guarded mutable state.
    inner: Mutex<HostInner>,
}

impl ModuleHost {
    /// Creates a host around a payload with the default configuration.
    pub fn new(module: impl Module) -> Arc<Self> {
        Self::with_config(module, LifecycleConfig::default())
    }

    /// Creates a host with an explicit configuration.
    pub fn with_config(module: impl Module, config: LifecycleConfig) -> Arc<Self> {
        Self::from_ref(Arc::new(module), config)
    }

    /// Creates a host from an already shared payload reference.
    pub fn from_ref(module: ModuleRef, config: LifecycleConfig) -> Arc<Self> {
        Arc::new(Self {
            name: Arc::from(module.name()),
            module,
            signals: SignalSet::new(config.channel_capacity),
            disposer: Disposer::new(),
            inner: Mutex::new(HostInner {
                state: LifecycleState::Instantiated,
                previous_state: None,
                pending: None,
                next_transition_id: 0,
                children: Vec::new(),
                parent: None,
            }),
        })
    }

    /// The module's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    fn lock(&self) -> MutexGuard<'_, HostInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// Returns `true` while the instance has never been loaded.
    pub fn is_instantiated(&self) -> bool {
        self.state().is_instantiated()
    }

    /// Returns `true` while a load transition is in flight.
    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// Returns `true` while the instance is active.
    pub fn is_loaded(&self) -> bool {
        self.state().is_loaded()
    }

    /// Returns `true` while a suspend transition is in flight.
    pub fn is_suspending(&self) -> bool {
        self.state().is_suspending()
    }

    /// Returns `true` while the instance is dormant.
    pub fn is_suspended(&self) -> bool {
        self.state().is_suspended()
    }

    /// Returns `true` while a resume transition is in flight.
    pub fn is_resuming(&self) -> bool {
        self.state().is_resuming()
    }

    /// Returns `true` while an unload transition is in flight.
    pub fn is_unloading(&self) -> bool {
        self.state().is_unloading()
    }

    /// Returns `true` once the instance reached its terminal state.
    pub fn is_unloaded(&self) -> bool {
        self.state().is_unloaded()
    }

    /// Subscribes to one lifecycle signal.
    ///
    /// The receiver observes events published after this call; once the
    /// instance unloads, the channel closes after the terminal did-unload
    /// emission.
    pub fn subscribe(&self, signal: Signal) -> broadcast::Receiver<SignalEvent> {
        self.signals.subscribe(signal)
    }

    /// Subscribes to every lifecycle signal through one combined stream.
    pub fn subscribe_all(&self) -> broadcast::Receiver<SignalEvent> {
        self.signals.subscribe_all()
    }

    /// The instance's disposal registry.
    ///
    /// Obligations registered here are released exactly once at unload.
    pub fn disposer(&self) -> &Disposer {
        &self.disposer
    }

    /// Snapshot of the active children, in load order.
    pub fn children(&self) -> Vec<Arc<ModuleHost>> {
        self.lock().children.clone()
    }
}
