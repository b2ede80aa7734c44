//! Pass hosting for Arbor.
//!
//! Passes reach the host in two ways: linked in and registered by name in a
//! [`PassRegistry`], or built as dynamic libraries and loaded with
//! [`PluginPass::load`]. Either way they end up in a [`PassManager`], which
//! runs them over a bundle.

pub mod manager;
pub mod pass_registry;
pub mod plugin_loader;

pub use manager::{PassFailure, PassManager};
pub use pass_registry::{PassFactory, PassRegistry, RegistryError, global, install};
pub use plugin_loader::{PluginError, PluginPass};
