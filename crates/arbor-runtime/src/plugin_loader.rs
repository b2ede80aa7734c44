//! Dynamic loading of pass libraries.

use libloading::{Library, Symbol};
use rhizome_arbor_ir::Bundle;
use rhizome_arbor_pass_abi::{
    ABI_VERSION, ABI_VERSION_SYMBOL, AbiVersionFn, INIT_SYMBOL, InitFn, Pass, PassError,
    PassHandle, PassInfo,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to load plugin {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("plugin {} is missing symbol {symbol}: {source}", path.display())]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("plugin {} was built for ABI {found}, host expects {expected}", path.display())]
    AbiMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("plugin {} returned no pass from init", path.display())]
    NullPass { path: PathBuf },
}

/// A pass obtained from a dynamic library.
///
/// Owns the library, so the code behind the pass stays mapped for as long as
/// the pass exists.
pub struct PluginPass {
    // Declared before `_lib`: fields drop in order, and the pass's code and
    // vtable live in the library.
    pass: Box<dyn Pass>,
    path: PathBuf,
    _lib: Library,
}

impl PluginPass {
    /// Loads the library at `path`, checks its ABI version and calls `init`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "loading pass plugin");

        // SAFETY: loading a library runs its initializers; pass libraries are
        // trusted the same way the host binary is.
        let lib = unsafe { Library::new(&path) }.map_err(|source| PluginError::Open {
            path: path.clone(),
            source,
        })?;

        let found = unsafe {
            let version: Symbol<AbiVersionFn> =
                lib.get(ABI_VERSION_SYMBOL)
                    .map_err(|source| PluginError::MissingSymbol {
                        path: path.clone(),
                        symbol: symbol_name(ABI_VERSION_SYMBOL),
                        source,
                    })?;
            version()
        };
        if found != ABI_VERSION {
            return Err(PluginError::AbiMismatch {
                path,
                expected: ABI_VERSION,
                found,
            });
        }

        let raw = unsafe {
            let init: Symbol<InitFn> =
                lib.get(INIT_SYMBOL)
                    .map_err(|source| PluginError::MissingSymbol {
                        path: path.clone(),
                        symbol: symbol_name(INIT_SYMBOL),
                        source,
                    })?;
            init()
        };
        if raw.is_null() {
            return Err(PluginError::NullPass { path });
        }
        // SAFETY: `raw` came from the plugin's `init`, which hands over
        // ownership of a `PassHandle` built against the same ABI version.
        let pass = unsafe { PassHandle::from_raw(raw) }.into_pass();

        info!(pass = pass.name(), path = %path.display(), "loaded pass plugin");
        Ok(Self {
            pass,
            path,
            _lib: lib,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Pass for PluginPass {
    fn info(&self) -> &PassInfo {
        self.pass.info()
    }

    fn execute(&self, bundle: &Bundle) -> Result<(), PassError> {
        self.pass.execute(bundle)
    }
}

fn symbol_name(symbol: &[u8]) -> String {
    String::from_utf8_lossy(symbol).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libnot_a_pass.so");
        let err = PluginPass::load(&path).err().unwrap();
        assert!(matches!(err, PluginError::Open { .. }));
        assert!(err.to_string().contains("libnot_a_pass.so"));
    }

    #[test]
    fn test_not_a_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.so");
        std::fs::write(&path, b"this is not an object file").unwrap();
        assert!(matches!(
            PluginPass::load(&path),
            Err(PluginError::Open { .. })
        ));
    }

    #[test]
    fn test_symbol_name() {
        assert_eq!(symbol_name(INIT_SYMBOL), "init");
        assert_eq!(symbol_name(ABI_VERSION_SYMBOL), "arbor_pass_abi_version");
    }
}
