//! IR errors.

use thiserror::Error;

/// Errors raised while building or querying the IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("basic block '{0}' not found")]
    NotFound(String),

    #[error("function '{0}' not found")]
    FunctionNotFound(String),

    #[error("duplicate basic block name '{0}'")]
    DuplicateBlock(String),

    #[error("duplicate function name '{0}'")]
    DuplicateFunction(String),

    #[error("edge from '{from}' targets undeclared block '{to}'")]
    DanglingEdge { from: String, to: String },

    #[error("adjacency of block '{block}' is inconsistent: {detail}")]
    AdjacencyMismatch { block: String, detail: String },
}

/// Errors raised while loading a bundle description.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bundle description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid bundle: {0}")]
    Ir(#[from] IrError),
}
