//! Error types used by the lifecycle engine and module hooks.
//!
//! This module defines two main error enums:
//!
//! - [`LifecycleError`] — failures surfaced by the lifecycle engine itself
//!   (illegal transitions, unload vetoes, propagated hook/child failures).
//! - [`HookError`] — failures raised by a module's own lifecycle hooks.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics and utilities such as [`LifecycleError::is_veto`].
//!
//! ## Delivery rules
//! - Illegal transitions and vetoes are delivered through the caller's
//!   transition handle, never thrown synchronously into surrounding code.
//! - Hook and child failures are delivered twice with the same error value:
//!   on the corresponding did-signal channel (for observers) and as the
//!   failure of the caller's handle.
//! - A veto is returned to the caller but never emitted on the did-unload
//!   channel: no termination occurred, so no termination event fires.

use std::sync::Arc;

use thiserror::Error;

use crate::state::{LifecycleState, TransitionOp};

/// # Errors raised by a module's own lifecycle hooks.
///
/// Payload authors return these from `on_load`/`on_suspend`/`on_resume`/
/// `on_unload` and the child-registration hooks. The engine wraps them in
/// [`LifecycleError::Hook`] before delivery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The hook could not complete its work.
    #[error("{message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl HookError {
    /// Creates a [`HookError::Failed`] from any message.
    ///
    /// # Example
    /// ```
    /// use modvisor::HookError;
    ///
    /// let err = HookError::failed("connection refused");
    /// assert_eq!(err.to_string(), "connection refused");
    /// ```
    pub fn failed(message: impl Into<String>) -> Self {
        HookError::Failed {
            message: message.into(),
        }
    }
}

/// # Errors produced by the lifecycle engine.
///
/// Every variant is cloneable: a transition's outcome is shared by all
/// handles waiting on it, and the same value is delivered to channel
/// observers and to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// The operation was requested from a state it cannot start from.
    #[error("cannot {op} module '{module}' while {from} (allowed: {allowed})")]
    IllegalTransition {
        /// Module name.
        module: Arc<str>,
        /// The requested operation.
        op: TransitionOp,
        /// State the instance was in when the request arrived.
        from: LifecycleState,
        /// Human-readable list of allowed source states.
        allowed: &'static str,
    },

    /// Unload negotiation failed: self or a descendant refused to terminate.
    ///
    /// Non-retryable for this attempt; the instance has been rolled back to
    /// its pre-unload state and a later `unload()` starts a fresh negotiation.
    #[error("unload of module '{module}' vetoed: {}", .reasons.join("; "))]
    Vetoed {
        /// Module name.
        module: Arc<str>,
        /// Merged rejection messages from every ineligible participant,
        /// in polling order.
        reasons: Vec<String>,
    },

    /// A lifecycle hook failed during a transition.
    #[error("{hook} failed for module '{module}': {source}")]
    Hook {
        /// Module name.
        module: Arc<str>,
        /// Name of the failing hook (e.g. `on_load`).
        hook: &'static str,
        /// The underlying hook failure.
        #[source]
        source: HookError,
    },

    /// A child module's own transition failed during a parent fan-out.
    #[error("child module '{child}' failed during {op}: {source}")]
    Child {
        /// Child module name.
        child: Arc<str>,
        /// The operation that was fanned out.
        op: TransitionOp,
        /// The child's own failure.
        #[source]
        source: Box<LifecycleError>,
    },

    /// `register_child` was called on an instance that is terminating.
    #[error("cannot register child '{child}' while parent is {state}")]
    ChildRegistration {
        /// Child module name.
        child: Arc<str>,
        /// Parent state at the time of the request.
        state: LifecycleState,
    },

    /// The transition driver terminated before resolving its handle.
    ///
    /// Only observable when the async runtime is torn down mid-transition.
    #[error("{op} transition interrupted before completion")]
    Interrupted {
        /// The operation that was in flight.
        op: TransitionOp,
    },
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::{HookError, LifecycleError};
    ///
    /// let err = LifecycleError::Hook {
    ///     module: "cart".into(),
    ///     hook: "on_load",
    ///     source: HookError::failed("boom"),
    /// };
    /// assert_eq!(err.as_label(), "hook_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::IllegalTransition { .. } => "illegal_transition",
            LifecycleError::Vetoed { .. } => "unload_vetoed",
            LifecycleError::Hook { .. } => "hook_failed",
            LifecycleError::Child { .. } => "child_failed",
            LifecycleError::ChildRegistration { .. } => "child_registration_rejected",
            LifecycleError::Interrupted { .. } => "transition_interrupted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` when this is an unload veto.
    ///
    /// A veto means termination did not occur: the instance was rolled back
    /// and no did-unload event fired.
    pub fn is_veto(&self) -> bool {
        matches!(self, LifecycleError::Vetoed { .. })
    }

    /// The rejection messages of a veto, or an empty slice otherwise.
    pub fn veto_reasons(&self) -> &[String] {
        match self {
            LifecycleError::Vetoed { reasons, .. } => reasons,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_transition_message_names_all_parts() {
        let err = LifecycleError::IllegalTransition {
            module: "cart".into(),
            op: TransitionOp::Suspend,
            from: LifecycleState::Instantiated,
            allowed: TransitionOp::Suspend.allowed_sources(),
        };
        let msg = err.as_message();
        assert!(msg.contains("suspend"), "missing op: {msg}");
        assert!(msg.contains("instantiated"), "missing source state: {msg}");
        assert!(
            msg.contains("loaded | loading | resuming"),
            "missing allowed list: {msg}"
        );
    }

    #[test]
    fn test_veto_merges_reasons_in_order() {
        let err = LifecycleError::Vetoed {
            module: "root".into(),
            reasons: vec!["busy".to_string(), "dirty state".to_string()],
        };
        assert!(err.is_veto());
        assert_eq!(err.veto_reasons(), ["busy", "dirty state"]);
        assert_eq!(
            err.as_message(),
            "unload of module 'root' vetoed: busy; dirty state"
        );
    }

    #[test]
    fn test_hook_error_identity_survives_wrapping() {
        let hook = HookError::failed("disk full");
        let err = LifecycleError::Hook {
            module: "store".into(),
            hook: "on_unload",
            source: hook.clone(),
        };
        assert_eq!(err.clone(), err);
        assert!(err.as_message().contains("disk full"));
        assert!(!err.is_veto());
    }

    #[test]
    fn test_labels_are_stable() {
        let err = LifecycleError::Child {
            child: "inner".into(),
            op: TransitionOp::Unload,
            source: Box::new(LifecycleError::Vetoed {
                module: "inner".into(),
                reasons: vec!["busy".into()],
            }),
        };
        assert_eq!(err.as_label(), "child_failed");
    }
}
