//! Construction of read-only IR.
//!
//! All ids of one load come from a single [`IdGen`] owned by the
//! [`BundleBuilder`], so they are distinct across the whole bundle.

use crate::{BasicBlock, BlockRef, Bundle, Code, Function, IrError, NodeId, Statement};
use std::collections::{BTreeSet, HashMap};

/// Monotonic id allocator.
#[derive(Debug, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Builds a [`Bundle`] function by function.
///
/// ```
/// use rhizome_arbor_ir::BundleBuilder;
///
/// let mut builder = BundleBuilder::new("demo");
/// builder
///     .function("main", |code| {
///         let a = code.block("a")?;
///         let b = code.block("b")?;
///         code.edge(a, b);
///         Ok(())
///     })
///     .unwrap();
/// let bundle = builder.build();
///
/// let body = bundle.function("main").unwrap().body();
/// let a = body.lookup_block("a").unwrap();
/// let names: Vec<_> = body.successors(a.block_ref()).map(|b| b.name()).collect();
/// assert_eq!(names, ["b"]);
/// ```
pub struct BundleBuilder {
    ids: IdGen,
    id: NodeId,
    name: String,
    functions: Vec<Function>,
}

impl BundleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut ids = IdGen::new();
        let id = ids.next_id();
        Self {
            ids,
            id,
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Adds a function whose body is filled in by `build`.
    pub fn function<F>(&mut self, name: impl Into<String>, build: F) -> Result<&mut Self, IrError>
    where
        F: FnOnce(&mut CodeBuilder<'_>) -> Result<(), IrError>,
    {
        let name = name.into();
        if self.functions.iter().any(|f| f.name == name) {
            return Err(IrError::DuplicateFunction(name));
        }
        let id = self.ids.next_id();
        let mut code = CodeBuilder::new(&mut self.ids);
        build(&mut code)?;
        let body = code.finish();
        self.functions.push(Function { id, name, body });
        Ok(self)
    }

    pub fn build(self) -> Bundle {
        Bundle {
            id: self.id,
            name: self.name,
            functions: self.functions,
        }
    }
}

/// Builds one [`Code`] body.
///
/// Edges are recorded on both endpoints as they are added, so the finished
/// body always has mirrored successor and predecessor sets.
pub struct CodeBuilder<'a> {
    ids: &'a mut IdGen,
    id: NodeId,
    blocks: Vec<BasicBlock>,
    by_name: HashMap<String, BlockRef>,
    succs: Vec<BTreeSet<BlockRef>>,
    preds: Vec<BTreeSet<BlockRef>>,
    entry: Option<BlockRef>,
}

impl<'a> CodeBuilder<'a> {
    fn new(ids: &'a mut IdGen) -> Self {
        let id = ids.next_id();
        Self {
            ids,
            id,
            blocks: Vec::new(),
            by_name: HashMap::new(),
            succs: Vec::new(),
            preds: Vec::new(),
            entry: None,
        }
    }

    /// Declares a block. Names must be unique within the body.
    pub fn block(&mut self, name: impl Into<String>) -> Result<BlockRef, IrError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(IrError::DuplicateBlock(name));
        }
        let index = BlockRef(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            id: self.ids.next_id(),
            name: name.clone(),
            index,
            statements: Vec::new(),
        });
        self.by_name.insert(name, index);
        self.succs.push(BTreeSet::new());
        self.preds.push(BTreeSet::new());
        Ok(index)
    }

    /// Appends a statement to `block`.
    ///
    /// # Panics
    /// If `block` was not returned by this builder.
    pub fn statement(&mut self, block: BlockRef, text: impl Into<String>) -> &mut Self {
        let statement = Statement {
            id: self.ids.next_id(),
            text: text.into(),
        };
        self.blocks[block.index()].statements.push(statement);
        self
    }

    /// Adds the edge `from -> to`. Adding an existing edge is a no-op.
    ///
    /// # Panics
    /// If either block was not returned by this builder.
    pub fn edge(&mut self, from: BlockRef, to: BlockRef) -> &mut Self {
        assert!(
            from.index() < self.blocks.len() && to.index() < self.blocks.len(),
            "edge between blocks of another code body"
        );
        self.succs[from.index()].insert(to);
        self.preds[to.index()].insert(from);
        self
    }

    /// Adds an edge between two already declared blocks, by name.
    pub fn edge_by_name(&mut self, from: &str, to: &str) -> Result<&mut Self, IrError> {
        let source = self
            .find(from)
            .ok_or_else(|| IrError::NotFound(from.to_string()))?;
        let target = self.find(to).ok_or_else(|| IrError::DanglingEdge {
            from: from.to_string(),
            to: to.to_string(),
        })?;
        Ok(self.edge(source, target))
    }

    /// Marks the entry block. Defaults to the first declared block.
    ///
    /// # Panics
    /// If `block` was not returned by this builder.
    pub fn entry(&mut self, block: BlockRef) -> &mut Self {
        assert!(
            block.index() < self.blocks.len(),
            "entry block of another code body"
        );
        self.entry = Some(block);
        self
    }

    pub fn find(&self, name: &str) -> Option<BlockRef> {
        self.by_name.get(name).copied()
    }

    fn finish(self) -> Code {
        let entry = self
            .entry
            .or_else(|| (!self.blocks.is_empty()).then_some(BlockRef(0)));
        Code {
            id: self.id,
            blocks: self.blocks,
            by_name: self.by_name,
            succs: self.succs,
            preds: self.preds,
            entry,
        }
    }
}
