//! CFG transformation oracles for Arbor.
//!
//! A check compares the control-flow graph of each function against a
//! `(trans (edge (src) (dest))*)` literal listing edges that must exist,
//! optionally gated by an exact block count. The outcome per function is
//! PASS or FAIL; an oracle that cannot be decoded, or one that names a
//! source block the function lacks, is an error rather than a FAIL.
//!
//! Built as a dynamic library this crate exports the
//! `unittest-cfg-trans-llvm-phi-2` regression check through `init`.

pub mod check;
pub mod config;
pub mod oracle;
pub mod pass;
pub mod regression;

pub use check::{CheckError, Expectation, Mismatch, Verdict};
pub use config::{CheckConfig, CheckFile, ConfigError};
pub use oracle::{Edge, ExpectedCfg, OracleError, capture_trans};
pub use pass::{CfgTransPass, FunctionVerdict, Report};
pub use regression::{LLVM_PHI_2, llvm_phi_2, llvm_phi_2_factory};

rhizome_arbor_pass_abi::export_pass!(regression::llvm_phi_2());
