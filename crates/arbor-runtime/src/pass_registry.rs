//! Name-to-constructor registry for linked-in passes.
//!
//! The host fills a [`PassRegistry`] during start-up and then freezes it with
//! [`install`]. After that the process-wide registry is read-only.

use rhizome_arbor_pass_abi::Pass;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Constructor for a fresh pass instance.
pub type PassFactory = fn() -> Box<dyn Pass>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("pass '{0}' is already registered")]
    Duplicate(String),

    #[error("unknown pass '{0}'")]
    Unknown(String),

    #[error("factory registered as '{registered}' built a pass named '{built}'")]
    NameMismatch { registered: String, built: String },

    #[error("the global pass registry is already installed")]
    AlreadyInstalled,
}

/// Global registry, set once by [`install`].
static GLOBAL_REGISTRY: OnceLock<PassRegistry> = OnceLock::new();

/// Registered pass constructors, ordered by name.
#[derive(Debug, Default)]
pub struct PassRegistry {
    factories: BTreeMap<String, PassFactory>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: PassFactory,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Builds a new instance of the pass registered as `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Pass>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        let pass = factory();
        if pass.name() != name {
            return Err(RegistryError::NameMismatch {
                registered: name.to_string(),
                built: pass.name().to_string(),
            });
        }
        Ok(pass)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Freezes `registry` as the process-wide registry.
pub fn install(registry: PassRegistry) -> Result<&'static PassRegistry, RegistryError> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    GLOBAL_REGISTRY.get().ok_or(RegistryError::AlreadyInstalled)
}

/// The installed registry, if any.
pub fn global() -> Option<&'static PassRegistry> {
    GLOBAL_REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhizome_arbor_ir::Bundle;
    use rhizome_arbor_pass_abi::{PassError, PassInfo};

    struct Named(PassInfo);

    impl Pass for Named {
        fn info(&self) -> &PassInfo {
            &self.0
        }

        fn execute(&self, _bundle: &Bundle) -> Result<(), PassError> {
            Ok(())
        }
    }

    fn alpha() -> Box<dyn Pass> {
        Box::new(Named(PassInfo::new("alpha", "first")))
    }

    fn beta() -> Box<dyn Pass> {
        Box::new(Named(PassInfo::new("beta", "second")))
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = PassRegistry::new();
        registry.register("beta", beta).unwrap();
        registry.register("alpha", alpha).unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), ["alpha", "beta"]);
        assert!(registry.contains("alpha"));
        assert_eq!(registry.create("beta").unwrap().description(), "second");
    }

    #[test]
    fn test_each_create_is_a_new_instance() {
        let mut registry = PassRegistry::new();
        registry.register("alpha", alpha).unwrap();
        let a = registry.create("alpha").unwrap();
        let b = registry.create("alpha").unwrap();
        let a_ptr = &*a as *const dyn Pass as *const u8;
        let b_ptr = &*b as *const dyn Pass as *const u8;
        assert_ne!(a_ptr, b_ptr);
    }

    #[test]
    fn test_duplicate_and_unknown() {
        let mut registry = PassRegistry::new();
        registry.register("alpha", alpha).unwrap();
        assert_eq!(
            registry.register("alpha", beta),
            Err(RegistryError::Duplicate("alpha".into()))
        );
        assert_eq!(
            registry.create("gamma").err(),
            Some(RegistryError::Unknown("gamma".into()))
        );
    }

    #[test]
    fn test_name_mismatch() {
        let mut registry = PassRegistry::new();
        registry.register("gamma", alpha).unwrap();
        assert_eq!(
            registry.create("gamma").err(),
            Some(RegistryError::NameMismatch {
                registered: "gamma".into(),
                built: "alpha".into(),
            })
        );
    }

    #[test]
    fn test_install_once() {
        let mut registry = PassRegistry::new();
        registry.register("alpha", alpha).unwrap();
        let installed = install(registry).unwrap();
        assert!(installed.contains("alpha"));
        assert!(global().is_some_and(|r| r.contains("alpha")));
        assert_eq!(
            install(PassRegistry::new()).err(),
            Some(RegistryError::AlreadyInstalled)
        );
    }
}
