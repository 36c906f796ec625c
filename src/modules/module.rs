//! # Module abstraction: the overridable lifecycle hooks.
//!
//! This module defines the [`Module`] trait — the payload-facing surface of
//! the lifecycle engine. A module implements only the hooks it needs; every
//! hook has a default no-op body, and `on_should_unload` defaults to
//! approval. The common handle type is [`ModuleRef`], an `Arc<dyn Module>`
//! suitable for sharing across the runtime.
//!
//! Hooks receive the owning [`ModuleHost`] so they can register disposal
//! obligations, register children, or inspect state. The engine guarantees
//! that the transition hooks (`on_load`, `on_suspend`, `on_resume`,
//! `on_unload`) of one instance never run interleaved; the child hooks run
//! from the child's transition and may overlap a parent transition that is
//! blocked on its children.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HookError;
use crate::host::ModuleHost;
use crate::modules::decision::UnloadDecision;

/// Shared reference to a module payload.
pub type ModuleRef = Arc<dyn Module>;

/// # Lifecycle hooks of a composable runtime unit.
///
/// All hooks default to no-ops, so a payload only overrides what it uses.
/// Hook errors are never swallowed: they reach the caller's transition
/// handle and the corresponding did-signal channel with the same value.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use modvisor::{HookError, Module, ModuleHost, UnloadDecision};
///
/// struct Cart;
///
/// #[async_trait]
/// impl Module for Cart {
///     fn name(&self) -> &str { "cart" }
///
///     async fn on_load(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
///         // open connections, spawn workers, register disposal...
///         Ok(())
///     }
///
///     async fn on_should_unload(&self, _host: &Arc<ModuleHost>) -> UnloadDecision {
///         UnloadDecision::reject("checkout in progress")
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns a stable, human-readable module name.
    fn name(&self) -> &str;

    /// Runs while the instance is `loading`, before it commits to `loaded`.
    async fn on_load(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs while the instance is `suspending`, after all children suspended.
    async fn on_suspend(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs while the instance is `resuming`, after all children resumed.
    async fn on_resume(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs while the instance is `unloading`, after negotiation approved
    /// and all children unloaded. Disposal obligations are released right
    /// after this hook returns.
    async fn on_unload(&self, _host: &Arc<ModuleHost>) -> Result<(), HookError> {
        Ok(())
    }

    /// Polled during unload negotiation. Defaults to approval.
    ///
    /// Every participant is always polled — returning a rejection here never
    /// suppresses, and is never suppressed by, another participant's answer.
    async fn on_should_unload(&self, _host: &Arc<ModuleHost>) -> UnloadDecision {
        UnloadDecision::approve()
    }

    /// Runs before a child is registered and loaded under this instance.
    async fn on_will_load_child(
        &self,
        _host: &Arc<ModuleHost>,
        _child: &Arc<ModuleHost>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs after a child loaded successfully, before it joins the active set.
    async fn on_did_load_child(
        &self,
        _host: &Arc<ModuleHost>,
        _child: &Arc<ModuleHost>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs when a child begins its unload, before it is removed from the
    /// active set. Errors are delivered on the will-unload-child channel.
    async fn on_will_unload_child(
        &self,
        _host: &Arc<ModuleHost>,
        _child: &Arc<ModuleHost>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs when a child finished its unload. Errors are delivered on the
    /// did-unload-child channel.
    async fn on_did_unload_child(
        &self,
        _host: &Arc<ModuleHost>,
        _child: &Arc<ModuleHost>,
    ) -> Result<(), HookError> {
        Ok(())
    }
}
