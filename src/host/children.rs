//! # Child registry: composition and auto-deregistration.
//!
//! A parent host keeps an ordered set of active children. Registration wires
//! the child's will/did-unload notifications back to the parent, so a child
//! terminating on its own is removed from the parent's active set before its
//! unload completes — later parent fan-outs never include it.
//!
//! ## Registration protocol
//! ```text
//! register_child(child)
//!   ├─ already registered?          → Ok (no-op)
//!   ├─ parent unloading/unloaded?   → ChildRegistration error
//!   ├─ on_will_load_child hook      → emit will-load-child
//!   ├─ attach parent link           (the child's unload wiring)
//!   ├─ await child.load()
//!   ├─ on_did_load_child hook       → append to children
//!   └─ emit did-load-child
//! Any failure after the link attaches releases it before propagating.
//! ```
//!
//! ## Unload wiring
//! The parent link is invoked inline from the child's unload body: after the
//! child emits its own will-unload the parent removes it from the active set
//! (hook + will-unload-child event), and after the child's did-unload the
//! parent runs its did-unregister side (hook + did-unload-child event) and
//! the link is released. Inline invocation is what guarantees the removal
//! happens before the child's did-unload fires.

use std::sync::{Arc, Weak};

use crate::error::LifecycleError;
use crate::signals::{Signal, SignalEvent};
use crate::state::{LifecycleState, TransitionOp};

use super::ModuleHost;

/// Weak wiring from a child back to its registering parent.
#[derive(Clone)]
pub(super) struct ParentLink {
    parent: Weak<ModuleHost>,
}

impl ParentLink {
    fn upgrade(&self) -> Option<Arc<ModuleHost>> {
        self.parent.upgrade()
    }
}

impl ModuleHost {
    /// Registers `child` under this instance and loads it.
    ///
    /// No-op when the child is already registered. Fails with
    /// [`LifecycleError::ChildRegistration`] while this instance is
    /// `unloading` or `unloaded`. The returned future resolves once the
    /// child has fully loaded and joined the active set.
    pub async fn register_child(
        self: &Arc<Self>,
        child: Arc<ModuleHost>,
    ) -> Result<(), LifecycleError> {
        {
            let inner = self.lock();
            if inner.children.iter().any(|c| Arc::ptr_eq(c, &child)) {
                tracing::debug!(
                    module = %self.name(),
                    child = %child.name(),
                    "child already registered; ignoring"
                );
                return Ok(());
            }
            if matches!(
                inner.state,
                LifecycleState::Unloading | LifecycleState::Unloaded
            ) {
                return Err(LifecycleError::ChildRegistration {
                    child: child.name_arc(),
                    state: inner.state,
                });
            }
        }

        self.module
            .on_will_load_child(self, &child)
            .await
            .map_err(|e| LifecycleError::Hook {
                module: self.name_arc(),
                hook: "on_will_load_child",
                source: e,
            })?;
        self.signals.publish(
            SignalEvent::new(Signal::WillLoadChild, self.name_arc()).with_child(child.name_arc()),
        );

        child.lock().parent = Some(ParentLink {
            parent: Arc::downgrade(self),
        });

        if let Err(e) = child.load().wait().await {
            child.detach_parent();
            return Err(LifecycleError::Child {
                child: child.name_arc(),
                op: TransitionOp::Load,
                source: Box::new(e),
            });
        }

        if let Err(e) = self.module.on_did_load_child(self, &child).await {
            child.detach_parent();
            return Err(LifecycleError::Hook {
                module: self.name_arc(),
                hook: "on_did_load_child",
                source: e,
            });
        }

        self.lock().children.push(Arc::clone(&child));
        self.signals.publish(
            SignalEvent::new(Signal::DidLoadChild, self.name_arc()).with_child(child.name_arc()),
        );
        Ok(())
    }

    fn detach_parent(&self) {
        self.lock().parent = None;
    }

    /// Called from this instance's unload body right after its own
    /// will-unload emission; runs the parent's will-unregister side.
    pub(super) async fn notify_parent_will_unload(self: &Arc<Self>) {
        let link = self.lock().parent.clone();
        if let Some(parent) = link.as_ref().and_then(ParentLink::upgrade) {
            parent.child_will_unload(self).await;
        }
    }

    /// Called from this instance's unload body right after its own
    /// did-unload emission; runs the parent's did-unregister side and
    /// releases the link.
    pub(super) async fn notify_parent_did_unload(self: &Arc<Self>) {
        let link = self.lock().parent.take();
        if let Some(parent) = link.as_ref().and_then(ParentLink::upgrade) {
            parent.child_did_unload(self).await;
        }
    }

    /// Removes `child` from the active set before its unload completes.
    async fn child_will_unload(self: &Arc<Self>, child: &Arc<ModuleHost>) {
        let hook = self.module.on_will_unload_child(self, child).await;

        let mut ev =
            SignalEvent::new(Signal::WillUnloadChild, self.name_arc()).with_child(child.name_arc());
        if let Err(e) = hook {
            ev = ev.with_error(LifecycleError::Hook {
                module: self.name_arc(),
                hook: "on_will_unload_child",
                source: e,
            });
        }
        self.signals.publish(ev);

        self.lock().children.retain(|c| !Arc::ptr_eq(c, child));
    }

    /// Acknowledges a child's completed unload.
    async fn child_did_unload(self: &Arc<Self>, child: &Arc<ModuleHost>) {
        let hook = self.module.on_did_unload_child(self, child).await;

        let mut ev =
            SignalEvent::new(Signal::DidUnloadChild, self.name_arc()).with_child(child.name_arc());
        if let Err(e) = hook {
            ev = ev.with_error(LifecycleError::Hook {
                module: self.name_arc(),
                hook: "on_did_unload_child",
                source: e,
            });
        }
        self.signals.publish(ev);
    }
}
