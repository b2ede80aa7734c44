//! IR node types.

use crate::{Code, IrError};
use std::fmt;

/// Identity of an IR node, distinct among all nodes of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of a basic block inside its [`Code`] body.
///
/// Only meaningful for the body that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(pub(crate) u32);

impl BlockRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single instruction. Its text is opaque to the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub(crate) id: NodeId,
    pub(crate) text: String,
}

impl Statement {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A straight-line sequence of statements.
///
/// Adjacency is not stored here; ask the owning [`Code`] for
/// [`successors`](Code::successors) and [`predecessors`](Code::predecessors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) index: BlockRef,
    pub(crate) statements: Vec<Statement>,
}

impl BasicBlock {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name id, unique within the owning code body.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_ref(&self) -> BlockRef {
        self.index
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// A function and its single code body.
#[derive(Debug, Clone)]
pub struct Function {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) body: Code,
}

impl Function {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Code {
        &self.body
    }
}

/// Top-level container of functions produced by one load.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) functions: Vec<Function>,
}

impl Bundle {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Finds a function by exact name.
    pub fn function(&self, name: &str) -> Result<&Function, IrError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| IrError::FunctionNotFound(name.to_string()))
    }
}
