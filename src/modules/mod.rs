//! # Module abstractions.
//!
//! This module provides the payload-facing types:
//! - [`Module`] — trait of overridable lifecycle hooks
//! - [`ModuleFn`] — function-backed module implementation
//! - [`ModuleRef`] — shared reference to a module (`Arc<dyn Module>`)
//! - [`UnloadDecision`] — answer given during unload negotiation

mod decision;
mod module;
mod module_fn;

pub use decision::UnloadDecision;
pub use module::{Module, ModuleRef};
pub use module_fn::ModuleFn;
