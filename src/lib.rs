//! # modvisor
//!
//! **Modvisor** is a hierarchical module-lifecycle supervision library for Rust.
//!
//! It provides primitives to load, suspend, resume, and unload composable
//! runtime units ("modules") in a coordinated, cancellable, observable
//! manner — independent of what each module's payload does. The crate is
//! designed as a building block for hosts that assemble trees of modules:
//! application shells, plugin runtimes, embedded feature containers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        ┌──────────────┐   ┌──────────────┐
//!     │  ModuleHost  │ parent │  ModuleHost  │   │  ModuleHost  │
//!     │   (shell)    │◄──────┬┤   (cart)     │   │  (profile)   │
//!     └──────┬───────┘ links └┴──────┬───────┘   └──────┬───────┘
//!            │ per instance:         │                  │
//!            ▼                       ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Transition coordinator (one per host)                            │
//! │  - request protocol: redundant / disallowed / admitted            │
//! │  - pending-transition chain (strict per-instance serialization)   │
//! │  - fan-out/join propagation to children (wait-for-all)            │
//! │  - unload negotiation (cooperative veto, ordered reasons)         │
//! └──────┬──────────────────────┬────────────────────────┬────────────┘
//!        ▼                      ▼                        ▼
//!   SignalSet              Disposer                 Module hooks
//!   (12 broadcast          (cleanup obligations,    (on_load, on_suspend,
//!    channels, closed       released exactly         on_resume, on_unload,
//!    at terminal state)     once at unload)           on_should_unload, ...)
//! ```
//!
//! ### Lifecycle
//! ```text
//! instantiated ──load()──► loading ──► loaded ◄────────────┐
//!                                         │                │
//!                                     suspend()        resume()
//!                                         ▼                │
//!                                    suspending ──► suspended
//!
//! any active state ──unload()──► unloading ──► unloaded (terminal)
//!                                    │
//!                                    └─ veto? → roll back to the
//!                                       pre-unload state, no event
//! ```
//!
//! ## Features
//! | Area            | Description                                                       | Key types / traits                  |
//! |-----------------|-------------------------------------------------------------------|-------------------------------------|
//! | **Hooks**       | Override only the lifecycle moments the payload cares about.      | [`Module`], [`ModuleFn`]            |
//! | **Transitions** | Serialized, idempotent, handle-based state changes.               | [`ModuleHost`], [`TransitionHandle`]|
//! | **Composition** | Ordered child registry with automatic deregistration.             | [`ModuleHost::register_child`]      |
//! | **Negotiation** | Cooperative unload veto with merged, ordered reasons.             | [`UnloadDecision`]                  |
//! | **Signals**     | Broadcast will/did pairs for every transition, closed at the end. | [`Signal`], [`SignalEvent`]         |
//! | **Disposal**    | Cleanup obligations released exactly once at unload.              | [`Disposer`], [`Dispose`]           |
//! | **Errors**      | Typed, cloneable errors with dual delivery.                       | [`LifecycleError`], [`HookError`]   |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use modvisor::{HookError, Module, ModuleHost, UnloadDecision};
//!
//! struct Cart;
//!
//! #[async_trait]
//! impl Module for Cart {
//!     fn name(&self) -> &str { "cart" }
//!
//!     async fn on_load(&self, host: &Arc<ModuleHost>) -> Result<(), HookError> {
//!         // Register cleanup that runs exactly once at unload.
//!         host.disposer().defer(|| println!("cart resources released"));
//!         Ok(())
//!     }
//!
//!     async fn on_should_unload(&self, _host: &Arc<ModuleHost>) -> UnloadDecision {
//!         UnloadDecision::approve()
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), modvisor::LifecycleError> {
//!     let shell = ModuleHost::new(modvisor::ModuleFn::new("shell", |_h: Arc<ModuleHost>| async move {
//!         Ok::<_, HookError>(())
//!     }));
//!     shell.load().wait().await?;
//!
//!     // Compose: load the cart as a child of the shell.
//!     let cart = ModuleHost::new(Cart);
//!     shell.register_child(cart.clone()).await?;
//!
//!     // Suspend/resume propagate to all children concurrently.
//!     shell.suspend().wait().await?;
//!     shell.resume().wait().await?;
//!
//!     // Unload negotiates with every descendant, then tears down.
//!     shell.unload().wait().await?;
//!     assert!(cart.is_unloaded());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod host;
mod modules;
mod signals;
mod state;

// ---- Public re-exports ----

pub use config::LifecycleConfig;
pub use error::{HookError, LifecycleError};
pub use host::{Dispose, Disposer, ModuleHost, TransitionHandle};
pub use modules::{Module, ModuleFn, ModuleRef, UnloadDecision};
pub use signals::{Signal, SignalEvent};
pub use state::{LifecycleState, TransitionOp};

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
