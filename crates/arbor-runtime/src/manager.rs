//! Ordered execution of passes over one bundle.

use crate::{PassRegistry, RegistryError};
use rhizome_arbor_ir::Bundle;
use rhizome_arbor_pass_abi::{Pass, PassError};
use thiserror::Error;
use tracing::{info, info_span, warn};

/// A pass that did not succeed, with the name of the pass.
#[derive(Debug, Error)]
#[error("pass '{pass}' failed: {source}")]
pub struct PassFailure {
    pub pass: String,
    #[source]
    pub source: PassError,
}

/// Runs passes in the order they were added.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manager running the registered passes `names`, in order.
    pub fn from_registry<'a>(
        registry: &PassRegistry,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, RegistryError> {
        let mut manager = Self::new();
        for name in names {
            manager.add(registry.create(name)?);
        }
        Ok(manager)
    }

    pub fn add(&mut self, pass: Box<dyn Pass>) -> &mut Self {
        self.passes.push(pass);
        self
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) -> &mut Self {
        self.add(Box::new(pass))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass on `bundle`, stopping at the first failure.
    ///
    /// Returns the number of passes that ran successfully.
    pub fn run(&self, bundle: &Bundle) -> Result<usize, PassFailure> {
        for pass in &self.passes {
            let _span = info_span!("pass", name = pass.name()).entered();
            info!(
                description = pass.description(),
                bundle = bundle.name(),
                "running pass"
            );
            if let Err(source) = pass.execute(bundle) {
                warn!(error = %source, "pass failed");
                return Err(PassFailure {
                    pass: pass.name().to_string(),
                    source,
                });
            }
        }
        Ok(self.passes.len())
    }
}
