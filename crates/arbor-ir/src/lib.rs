//! Control-flow IR for Arbor.
//!
//! A [`Bundle`] owns [`Function`]s; each function owns one [`Code`] body of
//! named [`BasicBlock`]s connected by successor edges. The IR is built once
//! (through [`BundleBuilder`] or a [`BundleSpec`]) and is read-only
//! afterwards, so passes can share it freely.
//!
//! Passes inspect the IR either through direct queries such as
//! [`Code::lookup_block`] and [`Code::successors`], or by implementing
//! [`Visitor`] and letting [`walk`] dispatch callbacks.

mod builder;
mod code;
mod error;
mod load;
mod node;
pub mod visit;

pub use builder::{BundleBuilder, CodeBuilder, IdGen};
pub use code::Code;
pub use error::{IrError, LoadError};
pub use load::{BlockSpec, BundleSpec, FunctionSpec};
pub use node::{BasicBlock, BlockRef, Bundle, Function, NodeId, Statement};
pub use visit::{Node, NodeKind, NodeKinds, Visitor, dispatch, walk, walk_function};

#[cfg(test)]
mod tests;
