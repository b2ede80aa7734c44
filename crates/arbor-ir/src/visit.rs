//! Visitor dispatch over the IR.
//!
//! A pass that wants to look at IR nodes implements [`Visitor`], declares the
//! node kinds it cares about through [`Visitor::interests`], and overrides the
//! matching `visit_*` methods. [`walk`] drives the traversal:
//!
//! ```text
//! Bundle -> Function (declaration order) -> Code -> BasicBlock -> Statement
//! ```
//!
//! Callbacks only run for declared kinds, and the walk does not descend
//! below the deepest declared kind. The first callback error stops the walk
//! and is returned unchanged.

use crate::{BasicBlock, Bundle, Code, Function, NodeId, Statement};
use bitflags::bitflags;

bitflags! {
    /// A set of IR node kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeKinds: u8 {
        const BUNDLE = 1;
        const FUNCTION = 1 << 1;
        const CODE = 1 << 2;
        const BASIC_BLOCK = 1 << 3;
        const STATEMENT = 1 << 4;
    }
}

impl NodeKinds {
    const BELOW_BUNDLE: NodeKinds = NodeKinds::FUNCTION
        .union(NodeKinds::CODE)
        .union(NodeKinds::BASIC_BLOCK)
        .union(NodeKinds::STATEMENT);
    const BELOW_FUNCTION: NodeKinds = NodeKinds::CODE
        .union(NodeKinds::BASIC_BLOCK)
        .union(NodeKinds::STATEMENT);
    const BELOW_CODE: NodeKinds = NodeKinds::BASIC_BLOCK.union(NodeKinds::STATEMENT);
}

/// The kind of a single IR node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Bundle,
    Function,
    Code,
    BasicBlock,
    Statement,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Bundle => "bundle",
            NodeKind::Function => "function",
            NodeKind::Code => "code",
            NodeKind::BasicBlock => "basic block",
            NodeKind::Statement => "statement",
        }
    }
}

impl From<NodeKind> for NodeKinds {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Bundle => NodeKinds::BUNDLE,
            NodeKind::Function => NodeKinds::FUNCTION,
            NodeKind::Code => NodeKinds::CODE,
            NodeKind::BasicBlock => NodeKinds::BASIC_BLOCK,
            NodeKind::Statement => NodeKinds::STATEMENT,
        }
    }
}

/// A borrowed IR node, with the parent a visitor needs for context.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Bundle(&'a Bundle),
    Function(&'a Function),
    Code(&'a Code),
    BasicBlock {
        code: &'a Code,
        block: &'a BasicBlock,
    },
    Statement {
        block: &'a BasicBlock,
        statement: &'a Statement,
    },
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Bundle(_) => NodeKind::Bundle,
            Node::Function(_) => NodeKind::Function,
            Node::Code(_) => NodeKind::Code,
            Node::BasicBlock { .. } => NodeKind::BasicBlock,
            Node::Statement { .. } => NodeKind::Statement,
        }
    }

    pub fn id(&self) -> NodeId {
        match self {
            Node::Bundle(bundle) => bundle.id(),
            Node::Function(function) => function.id(),
            Node::Code(code) => code.id(),
            Node::BasicBlock { block, .. } => block.id(),
            Node::Statement { statement, .. } => statement.id(),
        }
    }
}

/// Callbacks invoked while walking a bundle.
///
/// Every method has a no-op default. A visitor that declares no interests
/// is legal; walking with it does nothing.
pub trait Visitor {
    type Error;

    /// Node kinds whose callbacks should run.
    fn interests(&self) -> NodeKinds {
        NodeKinds::empty()
    }

    fn visit_bundle(&mut self, _bundle: &Bundle) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_function(&mut self, _function: &Function) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_code(&mut self, _code: &Code) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_block(&mut self, _code: &Code, _block: &BasicBlock) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_statement(
        &mut self,
        _block: &BasicBlock,
        _statement: &Statement,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Invokes the callback for `node` if the visitor declared its kind.
pub fn dispatch<V: Visitor + ?Sized>(node: Node<'_>, visitor: &mut V) -> Result<(), V::Error> {
    if !visitor.interests().contains(node.kind().into()) {
        return Ok(());
    }
    match node {
        Node::Bundle(bundle) => visitor.visit_bundle(bundle),
        Node::Function(function) => visitor.visit_function(function),
        Node::Code(code) => visitor.visit_code(code),
        Node::BasicBlock { code, block } => visitor.visit_block(code, block),
        Node::Statement { block, statement } => visitor.visit_statement(block, statement),
    }
}

/// Walks `bundle` top-down.
pub fn walk<V: Visitor + ?Sized>(bundle: &Bundle, visitor: &mut V) -> Result<(), V::Error> {
    let interests = visitor.interests();
    if interests.is_empty() {
        return Ok(());
    }
    dispatch(Node::Bundle(bundle), visitor)?;
    if !interests.intersects(NodeKinds::BELOW_BUNDLE) {
        return Ok(());
    }
    for function in bundle.functions() {
        walk_function_with(function, visitor, interests)?;
    }
    Ok(())
}

/// Walks a single function subtree.
pub fn walk_function<V: Visitor + ?Sized>(
    function: &Function,
    visitor: &mut V,
) -> Result<(), V::Error> {
    let interests = visitor.interests();
    walk_function_with(function, visitor, interests)
}

fn walk_function_with<V: Visitor + ?Sized>(
    function: &Function,
    visitor: &mut V,
    interests: NodeKinds,
) -> Result<(), V::Error> {
    dispatch(Node::Function(function), visitor)?;
    if !interests.intersects(NodeKinds::BELOW_FUNCTION) {
        return Ok(());
    }
    let code = function.body();
    dispatch(Node::Code(code), visitor)?;
    if !interests.intersects(NodeKinds::BELOW_CODE) {
        return Ok(());
    }
    for block in code.blocks() {
        dispatch(Node::BasicBlock { code, block }, visitor)?;
        if !interests.contains(NodeKinds::STATEMENT) {
            continue;
        }
        for statement in block.statements() {
            dispatch(Node::Statement { block, statement }, visitor)?;
        }
    }
    Ok(())
}

impl Bundle {
    /// Walks this bundle with `visitor`.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        walk(self, visitor)
    }
}
