//! # Transition coordinator: request protocol and transition bodies.
//!
//! Every state-changing operation goes through the same request protocol:
//!
//! 1. **Redundant** — the instance is already in (or moving toward) the
//!    target state: log and return the existing pending handle. No hooks.
//! 2. **Disallowed** — the current state is not an allowed source: return a
//!    handle that fails with an illegal-transition error. Nothing is thrown
//!    synchronously; delivery is uniform through the handle.
//! 3. **Admitted** — capture the pending transition (if any) as the
//!    predecessor, reserve the in-progress state, install a fresh pending
//!    slot, and spawn the driver.
//!
//! The driver first awaits the predecessor's completion — back-to-back
//! requests on one instance therefore serialize even when no caller awaits —
//! then runs the body and resolves every handle waiting on the slot.
//!
//! ## Commit rule
//! A body commits its target state only if the instance is still in the
//! in-progress state it reserved. A nested operation requested from inside a
//! hook advances the state first, and the outer body then skips its commit.
//!
//! ## Fan-out rule
//! Propagation to children is wait-for-all: every child settles before the
//! parent continues, the first-collected error is remembered, and siblings
//! are never cancelled.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{HookError, LifecycleError};
use crate::signals::{Signal, SignalEvent};
use crate::state::{LifecycleState, TransitionOp};

use super::ModuleHost;

type TransitionResult = Result<(), LifecycleError>;

/// In-flight transition bookkeeping stored in the host's pending slot.
pub(super) struct PendingTransition {
    /// Slot hygiene: a driver only clears the slot if it still holds its id.
    pub(super) id: u64,
    op: TransitionOp,
    rx: watch::Receiver<Option<TransitionResult>>,
}

impl PendingTransition {
    /// A new handle observing this transition's completion.
    pub(super) fn handle(&self) -> TransitionHandle {
        TransitionHandle {
            inner: HandleState::Waiting {
                op: self.op,
                rx: self.rx.clone(),
            },
        }
    }
}

enum HandleState {
    Ready(TransitionResult),
    Waiting {
        op: TransitionOp,
        rx: watch::Receiver<Option<TransitionResult>>,
    },
}

/// Completion handle of a requested transition.
///
/// Every handle for one transition resolves to the same outcome: redundant
/// requests share the original completion instead of re-running hooks.
/// Dropping a handle never cancels the transition — the core has no
/// cancellation primitive; callers impose timeouts by racing `wait()`
/// externally.
pub struct TransitionHandle {
    inner: HandleState,
}

impl TransitionHandle {
    pub(super) fn ready(result: TransitionResult) -> Self {
        Self {
            inner: HandleState::Ready(result),
        }
    }

    /// Resolves when the transition (including all descendant propagation)
    /// has settled.
    pub async fn wait(self) -> Result<(), LifecycleError> {
        match self.inner {
            HandleState::Ready(result) => result,
            HandleState::Waiting { op, mut rx } => {
                match rx.wait_for(|settled| settled.is_some()).await {
                    Ok(settled) => (*settled).clone().unwrap_or(Ok(())),
                    Err(_) => Err(LifecycleError::Interrupted { op }),
                }
            }
        }
    }
}

impl ModuleHost {
    /// Requests the `instantiated → loaded` transition.
    ///
    /// Runs `on_load` between the will-load and did-load signals. A failing
    /// hook leaves the instance in `loading`; the error reaches observers on
    /// the did-load channel and the caller through the returned handle.
    pub fn load(self: &Arc<Self>) -> TransitionHandle {
        self.request(TransitionOp::Load)
    }

    /// Requests the `loaded → suspended` transition.
    ///
    /// Suspends every active child concurrently, then runs `on_suspend`.
    pub fn suspend(self: &Arc<Self>) -> TransitionHandle {
        self.request(TransitionOp::Suspend)
    }

    /// Requests the `suspended → loaded` transition.
    ///
    /// Resumes every active child concurrently, then runs `on_resume`.
    pub fn resume(self: &Arc<Self>) -> TransitionHandle {
        self.request(TransitionOp::Resume)
    }

    /// Requests the terminal unload transition.
    ///
    /// Negotiates eligibility with self and every descendant first. On veto
    /// the instance rolls back to its pre-unload state and the handle fails
    /// with [`LifecycleError::Vetoed`] — without a did-unload emission, since
    /// no termination occurred. On approval the instance unloads its
    /// children, runs `on_unload`, releases every disposal obligation,
    /// commits the terminal state, emits did-unload, and closes all signal
    /// channels.
    pub fn unload(self: &Arc<Self>) -> TransitionHandle {
        self.request(TransitionOp::Unload)
    }

    pub(super) fn request(self: &Arc<Self>, op: TransitionOp) -> TransitionHandle {
        let (handle, predecessor, tx, id) = {
            let mut inner = self.lock();
            let state = inner.state;

            if state == op.target() || state == op.in_progress() {
                tracing::debug!(
                    module = %self.name(),
                    %op,
                    %state,
                    "redundant transition request; reusing existing completion"
                );
                return match inner.pending.as_ref() {
                    Some(pending) => pending.handle(),
                    None => TransitionHandle::ready(Ok(())),
                };
            }

            if !op.allowed_from(state) {
                tracing::warn!(module = %self.name(), %op, %state, "illegal transition request");
                return TransitionHandle::ready(Err(LifecycleError::IllegalTransition {
                    module: self.name_arc(),
                    op,
                    from: state,
                    allowed: op.allowed_sources(),
                }));
            }

            let predecessor = inner.pending.take();
            if op == TransitionOp::Unload {
                inner.previous_state = Some(state);
            }
            inner.state = op.in_progress();

            let id = inner.next_transition_id;
            inner.next_transition_id += 1;

            let (tx, rx) = watch::channel(None);
            let pending = PendingTransition { id, op, rx };
            let handle = pending.handle();
            inner.pending = Some(pending);

            (handle, predecessor, tx, id)
        };

        tracing::debug!(module = %self.name(), %op, "transition admitted");
        let host = Arc::clone(self);
        tokio::spawn(async move {
            let result = host.run_transition(op, predecessor).await;
            host.settle(id, &tx, result);
        });
        handle
    }

    /// Clears the pending slot (if it is still this transition's) and then
    /// resolves every waiting handle. A vetoed unload must leave no pending
    /// transition behind, so the slot is cleared before the send.
    fn settle(
        &self,
        id: u64,
        tx: &watch::Sender<Option<TransitionResult>>,
        result: TransitionResult,
    ) {
        {
            let mut inner = self.lock();
            if inner.pending.as_ref().is_some_and(|p| p.id == id) {
                inner.pending = None;
            }
        }
        let _ = tx.send(Some(result));
    }

    async fn run_transition(
        self: &Arc<Self>,
        op: TransitionOp,
        predecessor: Option<PendingTransition>,
    ) -> TransitionResult {
        if let Some(prev) = predecessor {
            // Serialization only: the predecessor's outcome does not gate
            // this operation, whose preconditions were checked at request
            // time against the reserved state.
            let _ = prev.handle().wait().await;
        }

        match op {
            TransitionOp::Load => self.run_load().await,
            TransitionOp::Suspend | TransitionOp::Resume => self.run_cycle(op).await,
            TransitionOp::Unload => self.run_unload().await,
        }
    }

    async fn run_load(self: &Arc<Self>) -> TransitionResult {
        self.signals
            .publish(SignalEvent::new(Signal::WillLoad, self.name_arc()));

        let result = self
            .module
            .on_load(self)
            .await
            .map_err(|e| self.hook_error("on_load", e));

        if result.is_ok() {
            let mut inner = self.lock();
            if inner.state == LifecycleState::Loading {
                inner.state = LifecycleState::Loaded;
            }
        }

        let mut ev = SignalEvent::new(Signal::DidLoad, self.name_arc());
        if let Err(e) = &result {
            ev = ev.with_error(e.clone());
        }
        self.signals.publish(ev);
        result
    }

    async fn run_cycle(self: &Arc<Self>, op: TransitionOp) -> TransitionResult {
        self.signals
            .publish(SignalEvent::new(Signal::will_of(op), self.name_arc()));

        let children = self.children();
        let child_err = self.fan_out(&children, op).await;

        let hook_res = if op == TransitionOp::Suspend {
            self.module
                .on_suspend(self)
                .await
                .map_err(|e| self.hook_error("on_suspend", e))
        } else {
            self.module
                .on_resume(self)
                .await
                .map_err(|e| self.hook_error("on_resume", e))
        };

        let mut errors: Vec<LifecycleError> = Vec::new();
        if let Some(e) = child_err {
            errors.push(e);
        }
        if let Err(e) = hook_res {
            errors.push(e);
        }

        if errors.is_empty() {
            {
                let mut inner = self.lock();
                if inner.state == op.in_progress() {
                    inner.state = op.target();
                }
            }
            self.signals
                .publish(SignalEvent::new(Signal::did_of(op), self.name_arc()));
            return Ok(());
        }

        for e in &errors {
            self.signals.publish(
                SignalEvent::new(Signal::did_of(op), self.name_arc()).with_error(e.clone()),
            );
        }
        Err(errors.swap_remove(0))
    }

    async fn run_unload(self: &Arc<Self>) -> TransitionResult {
        let decision = self.can_unload().await;
        if !decision.is_approved() {
            let restored = {
                let mut inner = self.lock();
                let restored = inner.previous_state.take().unwrap_or(inner.state);
                inner.state = restored;
                restored
            };
            tracing::debug!(module = %self.name(), %restored, "unload vetoed; instance rolled back");
            // No did-unload emission: termination did not occur.
            return Err(LifecycleError::Vetoed {
                module: self.name_arc(),
                reasons: decision.into_reasons(),
            });
        }

        self.signals
            .publish(SignalEvent::new(Signal::WillUnload, self.name_arc()));
        self.notify_parent_will_unload().await;

        let children = {
            let mut inner = self.lock();
            std::mem::take(&mut inner.children)
        };
        let child_err = self.fan_out(&children, TransitionOp::Unload).await;

        let hook_err = self
            .module
            .on_unload(self)
            .await
            .err()
            .map(|e| self.hook_error("on_unload", e));

        self.disposer.release();
        {
            let mut inner = self.lock();
            inner.previous_state = None;
            inner.state = LifecycleState::Unloaded;
        }

        let mut errors: Vec<LifecycleError> = child_err.into_iter().chain(hook_err).collect();
        if errors.is_empty() {
            self.signals
                .publish(SignalEvent::new(Signal::DidUnload, self.name_arc()));
        } else {
            for e in &errors {
                self.signals.publish(
                    SignalEvent::new(Signal::DidUnload, self.name_arc()).with_error(e.clone()),
                );
            }
        }

        self.notify_parent_did_unload().await;
        self.signals.close_all();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.swap_remove(0))
        }
    }

    /// Dispatches `op` to every child concurrently and joins all of them.
    ///
    /// Wait-for-all: a failing child never cancels its siblings. Returns the
    /// first-collected error, in child registration order.
    pub(super) async fn fan_out(
        self: &Arc<Self>,
        children: &[Arc<ModuleHost>],
        op: TransitionOp,
    ) -> Option<LifecycleError> {
        if children.is_empty() {
            return None;
        }

        let joins = children.iter().map(|child| {
            let child = Arc::clone(child);
            async move {
                let result = child.request(op).wait().await;
                (child, result)
            }
        });

        let settled = futures::future::join_all(joins).await;
        settled.into_iter().find_map(|(child, result)| {
            result.err().map(|e| LifecycleError::Child {
                child: child.name_arc(),
                op,
                source: Box::new(e),
            })
        })
    }

    fn hook_error(&self, hook: &'static str, source: HookError) -> LifecycleError {
        LifecycleError::Hook {
            module: self.name_arc(),
            hook,
            source,
        }
    }
}
