//! # Function-backed module (`ModuleFn`)
//!
//! [`ModuleFn`] wraps a closure `F: Fn(Arc<ModuleHost>) -> Fut` used as the
//! load hook, producing a fresh future per invocation. Handy for tests and
//! for payloads whose only setup work happens at load time; anything that
//! needs more hooks implements [`Module`](crate::Module) directly.
//!
//! ## Example
//! ```
//! use modvisor::{HookError, ModuleFn, ModuleRef};
//!
//! let m: ModuleRef = ModuleFn::arc("worker", |_host| async move {
//!     // open resources...
//!     Ok::<_, HookError>(())
//! });
//!
//! assert_eq!(m.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HookError;
use crate::host::ModuleHost;
use crate::modules::module::Module;

/// Function-backed module implementation.
///
/// Wraps a closure that *creates* a new load future per invocation.
pub struct ModuleFn<F> {
    name: Cow<'static, str>,
    load: F,
}

impl<F> ModuleFn<F> {
    /// Creates a new function-backed module.
    ///
    /// Prefer [`ModuleFn::arc`] when you immediately need a
    /// [`ModuleRef`](crate::ModuleRef).
    pub fn new(name: impl Into<Cow<'static, str>>, load: F) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }

    /// Creates the module and returns it as a shared handle (`Arc<dyn Module>`).
    pub fn arc<Fut>(name: impl Into<Cow<'static, str>>, load: F) -> Arc<Self>
    where
        F: Fn(Arc<ModuleHost>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        Arc::new(Self::new(name, load))
    }
}

#[async_trait]
impl<F, Fut> Module for ModuleFn<F>
where
    F: Fn(Arc<ModuleHost>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HookError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_load(&self, host: &Arc<ModuleHost>) -> Result<(), HookError> {
        (self.load)(Arc::clone(host)).await
    }
}
