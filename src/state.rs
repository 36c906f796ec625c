//! # Lifecycle states and the transition table.
//!
//! [`LifecycleState`] is the closed set of states a module instance moves
//! through; [`TransitionOp`] is the closed set of operations that move it,
//! carrying the static transition table (target state, in-progress state,
//! allowed source states).
//!
//! ## State machine
//! ```text
//! instantiated ──load──► loading ──► loaded ◄───────────┐
//!                                      │                │
//!                                   suspend           resume
//!                                      ▼                │
//!                                  suspending ──► suspended
//!
//! loaded | loading | resuming | suspended | suspending
//!     └──unload──► unloading ──► unloaded (terminal)
//! ```
//!
//! ## Rules
//! - Exactly one state is active per instance at any instant.
//! - `suspended ↔ loaded` may cycle any number of times.
//! - `unloaded` is terminal: an instance supports one load→unload cycle.

use std::fmt;

/// Current position of a module instance in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created, never loaded.
    Instantiated,
    /// Load transition in flight.
    Loading,
    /// Active.
    Loaded,
    /// Suspend transition in flight.
    Suspending,
    /// Dormant; resumable.
    Suspended,
    /// Resume transition in flight.
    Resuming,
    /// Unload transition in flight.
    Unloading,
    /// Terminal: all obligations released, all signal channels closed.
    Unloaded,
}

impl LifecycleState {
    /// Returns `true` for [`LifecycleState::Instantiated`].
    pub fn is_instantiated(self) -> bool {
        matches!(self, LifecycleState::Instantiated)
    }

    /// Returns `true` for [`LifecycleState::Loading`].
    pub fn is_loading(self) -> bool {
        matches!(self, LifecycleState::Loading)
    }

    /// Returns `true` for [`LifecycleState::Loaded`].
    pub fn is_loaded(self) -> bool {
        matches!(self, LifecycleState::Loaded)
    }

    /// Returns `true` for [`LifecycleState::Suspending`].
    pub fn is_suspending(self) -> bool {
        matches!(self, LifecycleState::Suspending)
    }

    /// Returns `true` for [`LifecycleState::Suspended`].
    pub fn is_suspended(self) -> bool {
        matches!(self, LifecycleState::Suspended)
    }

    /// Returns `true` for [`LifecycleState::Resuming`].
    pub fn is_resuming(self) -> bool {
        matches!(self, LifecycleState::Resuming)
    }

    /// Returns `true` for [`LifecycleState::Unloading`].
    pub fn is_unloading(self) -> bool {
        matches!(self, LifecycleState::Unloading)
    }

    /// Returns `true` for [`LifecycleState::Unloaded`].
    pub fn is_unloaded(self) -> bool {
        matches!(self, LifecycleState::Unloaded)
    }

    /// Returns `true` for the terminal state ([`LifecycleState::Unloaded`]).
    pub fn is_terminal(self) -> bool {
        self.is_unloaded()
    }

    /// Returns a stable lowercase label for logs and error messages.
    pub fn as_label(self) -> &'static str {
        match self {
            LifecycleState::Instantiated => "instantiated",
            LifecycleState::Loading => "loading",
            LifecycleState::Loaded => "loaded",
            LifecycleState::Suspending => "suspending",
            LifecycleState::Suspended => "suspended",
            LifecycleState::Resuming => "resuming",
            LifecycleState::Unloading => "unloading",
            LifecycleState::Unloaded => "unloaded",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One of the four state-changing operations.
///
/// Each operation knows its own row of the transition table:
///
/// | op      | allowed from                                              | intermediate | on success |
/// |---------|-----------------------------------------------------------|--------------|------------|
/// | load    | `instantiated`                                            | `loading`    | `loaded`   |
/// | suspend | `loaded`, `loading`, `resuming`                           | `suspending` | `suspended`|
/// | resume  | `suspended`, `suspending`                                 | `resuming`   | `loaded`   |
/// | unload  | `loaded`, `loading`, `resuming`, `suspended`, `suspending`| `unloading`  | `unloaded` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOp {
    /// `instantiated → loading → loaded`.
    Load,
    /// `loaded → suspending → suspended`.
    Suspend,
    /// `suspended → resuming → loaded`.
    Resume,
    /// `* → unloading → unloaded` (terminal).
    Unload,
}

impl TransitionOp {
    /// The state committed when the operation succeeds.
    pub fn target(self) -> LifecycleState {
        match self {
            TransitionOp::Load => LifecycleState::Loaded,
            TransitionOp::Suspend => LifecycleState::Suspended,
            TransitionOp::Resume => LifecycleState::Loaded,
            TransitionOp::Unload => LifecycleState::Unloaded,
        }
    }

    /// The intermediate state set while the operation is in flight.
    pub fn in_progress(self) -> LifecycleState {
        match self {
            TransitionOp::Load => LifecycleState::Loading,
            TransitionOp::Suspend => LifecycleState::Suspending,
            TransitionOp::Resume => LifecycleState::Resuming,
            TransitionOp::Unload => LifecycleState::Unloading,
        }
    }

    /// Whether the operation may start from `state`.
    ///
    /// The in-progress and target states are not listed here: a request made
    /// while the instance is already in (or moving toward) the target is a
    /// redundant no-op, handled before this check.
    pub fn allowed_from(self, state: LifecycleState) -> bool {
        match self {
            TransitionOp::Load => matches!(state, LifecycleState::Instantiated),
            TransitionOp::Suspend => matches!(
                state,
                LifecycleState::Loaded | LifecycleState::Loading | LifecycleState::Resuming
            ),
            TransitionOp::Resume => {
                matches!(
                    state,
                    LifecycleState::Suspended | LifecycleState::Suspending
                )
            }
            TransitionOp::Unload => matches!(
                state,
                LifecycleState::Loaded
                    | LifecycleState::Loading
                    | LifecycleState::Resuming
                    | LifecycleState::Suspended
                    | LifecycleState::Suspending
            ),
        }
    }

    /// Human-readable list of allowed source states, for error messages.
    pub fn allowed_sources(self) -> &'static str {
        match self {
            TransitionOp::Load => "instantiated",
            TransitionOp::Suspend => "loaded | loading | resuming",
            TransitionOp::Resume => "suspended | suspending",
            TransitionOp::Unload => "loaded | loading | resuming | suspended | suspending",
        }
    }

    /// Returns a stable label for logs and error messages.
    pub fn as_label(self) -> &'static str {
        match self {
            TransitionOp::Load => "load",
            TransitionOp::Suspend => "suspend",
            TransitionOp::Resume => "resume",
            TransitionOp::Unload => "unload",
        }
    }
}

impl fmt::Display for TransitionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_only_from_instantiated() {
        assert!(TransitionOp::Load.allowed_from(LifecycleState::Instantiated));
        for state in [
            LifecycleState::Loading,
            LifecycleState::Loaded,
            LifecycleState::Suspending,
            LifecycleState::Suspended,
            LifecycleState::Resuming,
            LifecycleState::Unloading,
            LifecycleState::Unloaded,
        ] {
            assert!(
                !TransitionOp::Load.allowed_from(state),
                "load must be rejected from {state}"
            );
        }
    }

    #[test]
    fn test_suspend_sources() {
        assert!(TransitionOp::Suspend.allowed_from(LifecycleState::Loaded));
        assert!(TransitionOp::Suspend.allowed_from(LifecycleState::Loading));
        assert!(TransitionOp::Suspend.allowed_from(LifecycleState::Resuming));
        assert!(!TransitionOp::Suspend.allowed_from(LifecycleState::Instantiated));
        assert!(!TransitionOp::Suspend.allowed_from(LifecycleState::Unloaded));
    }

    #[test]
    fn test_resume_sources() {
        assert!(TransitionOp::Resume.allowed_from(LifecycleState::Suspended));
        assert!(TransitionOp::Resume.allowed_from(LifecycleState::Suspending));
        assert!(!TransitionOp::Resume.allowed_from(LifecycleState::Instantiated));
        assert!(!TransitionOp::Resume.allowed_from(LifecycleState::Loading));
    }

    #[test]
    fn test_unload_rejected_from_terminal_and_initial() {
        assert!(!TransitionOp::Unload.allowed_from(LifecycleState::Instantiated));
        assert!(!TransitionOp::Unload.allowed_from(LifecycleState::Unloaded));
        assert!(TransitionOp::Unload.allowed_from(LifecycleState::Loaded));
        assert!(TransitionOp::Unload.allowed_from(LifecycleState::Suspending));
    }

    #[test]
    fn test_targets_and_intermediates() {
        assert_eq!(TransitionOp::Load.target(), LifecycleState::Loaded);
        assert_eq!(TransitionOp::Load.in_progress(), LifecycleState::Loading);
        assert_eq!(TransitionOp::Resume.target(), LifecycleState::Loaded);
        assert_eq!(TransitionOp::Unload.target(), LifecycleState::Unloaded);
        assert!(TransitionOp::Unload.target().is_terminal());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(LifecycleState::Suspending.to_string(), "suspending");
        assert_eq!(TransitionOp::Unload.to_string(), "unload");
    }
}
