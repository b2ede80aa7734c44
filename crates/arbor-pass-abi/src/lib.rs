//! Pass contract for Arbor.
//!
//! A pass is a named unit of inspection logic run against a [`Bundle`].
//! Passes are either linked into the host and registered by name, or built
//! as dynamic libraries exposing one well-known factory symbol, `init`:
//!
//! ```ignore
//! rhizome_arbor_pass_abi::export_pass!(MyPass::new());
//! ```
//!
//! `init` returns an owning [`PassHandle`]. Handles cross the library
//! boundary as Rust trait objects, so a plugin must be built with the same
//! compiler and the same `rhizome-arbor-ir` as its host;
//! [`ABI_VERSION`] guards against the latter.

use rhizome_arbor_ir::Bundle;
use std::error::Error;
use thiserror::Error;

/// Bumped whenever the [`Pass`] trait or the IR layout changes.
pub const ABI_VERSION: u32 = 1;

/// Name of the factory symbol every pass library exports.
pub const INIT_SYMBOL: &[u8] = b"init";

/// Name of the symbol reporting the library's [`ABI_VERSION`].
pub const ABI_VERSION_SYMBOL: &[u8] = b"arbor_pass_abi_version";

/// Signature of `init`.
pub type InitFn = unsafe extern "C" fn() -> *mut PassHandle;

/// Signature of `arbor_pass_abi_version`.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

/// Immutable identity of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassInfo {
    name: String,
    description: String,
}

impl PassInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Outcome of a pass that did not succeed.
#[derive(Debug, Error)]
pub enum PassError {
    /// The pass ran to completion and its verdict is negative.
    #[error("verification failed: {0}")]
    Failed(String),

    /// The pass could not produce a verdict.
    #[error(transparent)]
    Fatal(Box<dyn Error + Send + Sync>),
}

impl PassError {
    pub fn fatal(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        PassError::Fatal(err.into())
    }

    /// True for a negative verdict, false for a fatal error.
    pub fn is_verdict(&self) -> bool {
        matches!(self, PassError::Failed(_))
    }
}

/// A unit of analysis or verification logic.
///
/// Passes never mutate the bundle and hold no shared mutable state, so
/// independent instances may run concurrently.
pub trait Pass: Send + Sync {
    fn info(&self) -> &PassInfo;

    fn name(&self) -> &str {
        self.info().name()
    }

    fn description(&self) -> &str {
        self.info().description()
    }

    /// Runs the pass. Results are reported as output; the return value only
    /// tells the host whether the pass succeeded.
    fn execute(&self, bundle: &Bundle) -> Result<(), PassError>;
}

impl<P: Pass + ?Sized> Pass for Box<P> {
    fn info(&self) -> &PassInfo {
        (**self).info()
    }

    fn execute(&self, bundle: &Bundle) -> Result<(), PassError> {
        (**self).execute(bundle)
    }
}

/// Owning handle to a pass, passed through `init` as a raw pointer.
pub struct PassHandle {
    pass: Box<dyn Pass>,
}

impl PassHandle {
    pub fn new(pass: impl Pass + 'static) -> Self {
        Self {
            pass: Box::new(pass),
        }
    }

    pub fn into_raw(self) -> *mut PassHandle {
        Box::into_raw(Box::new(self))
    }

    /// Takes back ownership of a handle produced by [`PassHandle::into_raw`].
    ///
    /// # Safety
    /// `ptr` must come from `into_raw` (possibly in another library built
    /// against the same ABI) and must not be used again afterwards.
    pub unsafe fn from_raw(ptr: *mut PassHandle) -> Self {
        *unsafe { Box::from_raw(ptr) }
    }

    pub fn into_pass(self) -> Box<dyn Pass> {
        self.pass
    }
}

/// Exports `init` and `arbor_pass_abi_version` for a pass library.
///
/// `$ctor` is evaluated on every `init` call and must produce a value
/// implementing [`Pass`].
#[macro_export]
macro_rules! export_pass {
    ($ctor:expr) => {
        #[allow(improper_ctypes_definitions)]
        #[unsafe(no_mangle)]
        pub extern "C" fn init() -> *mut $crate::PassHandle {
            $crate::PassHandle::new($ctor).into_raw()
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn arbor_pass_abi_version() -> u32 {
            $crate::ABI_VERSION
        }
    };
}
