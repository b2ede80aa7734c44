//! Checking a decoded oracle against one function body.

use crate::oracle::{ExpectedCfg, OracleError};
use rhizome_arbor_ir::{Code, IrError};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    BlockCount { expected: usize, actual: usize },
    MissingEdge { src: String, dest: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::BlockCount { expected, actual } => {
                write!(f, "expected {expected} basic blocks, found {actual}")
            }
            Mismatch::MissingEdge { src, dest } => {
                write!(f, "'{dest}' is not a successor of '{src}'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Mismatch),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail(mismatch) => write!(f, "FAIL: {mismatch}"),
        }
    }
}

/// Errors that prevent a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Ir(#[from] IrError),
}

/// What a function body is expected to look like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    /// Exact number of basic blocks, if checked.
    pub blocks: Option<usize>,
    pub cfg: ExpectedCfg,
}

impl Expectation {
    pub fn new(cfg: ExpectedCfg) -> Self {
        Self { blocks: None, cfg }
    }

    pub fn with_block_count(mut self, blocks: usize) -> Self {
        self.blocks = Some(blocks);
        self
    }

    /// Checks `code`, stopping at the first mismatch.
    ///
    /// The block count is compared before any edge. An edge whose source
    /// block does not exist is an error; a missing target is a mismatch.
    pub fn check(&self, code: &Code) -> Result<Verdict, IrError> {
        if let Some(expected) = self.blocks {
            if code.len() != expected {
                return Ok(Verdict::Fail(Mismatch::BlockCount {
                    expected,
                    actual: code.len(),
                }));
            }
        }
        for edge in self.cfg.edges() {
            let src = code.lookup_block(&edge.src)?;
            let found = code
                .successors(src.block_ref())
                .any(|next| next.name() == edge.dest);
            debug!(src = %edge.src, dest = %edge.dest, found, "checked edge");
            if !found {
                return Ok(Verdict::Fail(Mismatch::MissingEdge {
                    src: edge.src.clone(),
                    dest: edge.dest.clone(),
                }));
            }
        }
        Ok(Verdict::Pass)
    }
}
