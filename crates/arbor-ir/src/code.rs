//! Code bodies: the block arena and CFG adjacency.

use crate::{BasicBlock, BlockRef, IrError, NodeId};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// The body of a function: its basic blocks and the edges between them.
///
/// Blocks live in an arena indexed by [`BlockRef`]. Successor and
/// predecessor sets are kept side by side, keyed by the same index, so that
/// `b` is a successor of `a` exactly when `a` is a predecessor of `b`.
#[derive(Debug, Clone)]
pub struct Code {
    pub(crate) id: NodeId,
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) by_name: HashMap<String, BlockRef>,
    pub(crate) succs: Vec<BTreeSet<BlockRef>>,
    pub(crate) preds: Vec<BTreeSet<BlockRef>>,
    pub(crate) entry: Option<BlockRef>,
}

impl Code {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Blocks in declaration order.
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, block: BlockRef) -> Option<&BasicBlock> {
        self.blocks.get(block.index())
    }

    /// The entry block; `None` only for an empty body.
    pub fn entry(&self) -> Option<&BasicBlock> {
        self.entry.and_then(|r| self.block(r))
    }

    /// Finds a block by its name id (case-sensitive, exact match).
    pub fn lookup_block(&self, name: &str) -> Result<&BasicBlock, IrError> {
        self.by_name
            .get(name)
            .and_then(|r| self.block(*r))
            .ok_or_else(|| IrError::NotFound(name.to_string()))
    }

    /// Outgoing neighbours of `block`; empty for a terminal block.
    pub fn successors(&self, block: BlockRef) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.neighbours(&self.succs, block)
    }

    /// Incoming neighbours of `block`.
    pub fn predecessors(&self, block: BlockRef) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.neighbours(&self.preds, block)
    }

    pub fn has_edge(&self, from: BlockRef, to: BlockRef) -> bool {
        self.succs
            .get(from.index())
            .is_some_and(|set| set.contains(&to))
    }

    /// All edges, grouped by source in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (BlockRef, BlockRef)> + '_ {
        self.succs
            .iter()
            .enumerate()
            .flat_map(|(i, set)| set.iter().map(move |to| (BlockRef(i as u32), *to)))
    }

    pub fn edge_count(&self) -> usize {
        self.succs.iter().map(BTreeSet::len).sum()
    }

    /// Blocks reachable from the entry, in breadth-first discovery order.
    pub fn reachable(&self) -> Vec<BlockRef> {
        let Some(entry) = self.entry().map(BasicBlock::block_ref) else {
            return Vec::new();
        };
        let mut seen = vec![false; self.blocks.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([entry]);
        seen[entry.index()] = true;
        while let Some(block) = queue.pop_front() {
            order.push(block);
            for next in self.succs.get(block.index()).into_iter().flatten() {
                if let Some(flag) = seen.get_mut(next.index()) {
                    if !*flag {
                        *flag = true;
                        queue.push_back(*next);
                    }
                }
            }
        }
        order
    }

    /// Verifies that every edge stays inside this body and that successor
    /// and predecessor sets mirror each other.
    pub fn check_adjacency(&self) -> Result<(), IrError> {
        let len = self.blocks.len();
        if self.succs.len() != len || self.preds.len() != len {
            return Err(IrError::AdjacencyMismatch {
                block: "<body>".to_string(),
                detail: format!(
                    "{} blocks but {} successor and {} predecessor sets",
                    len,
                    self.succs.len(),
                    self.preds.len()
                ),
            });
        }
        for (i, block) in self.blocks.iter().enumerate() {
            let this = BlockRef(i as u32);
            for (set, other_sets, relation) in [
                (&self.succs[i], &self.preds, "successor"),
                (&self.preds[i], &self.succs, "predecessor"),
            ] {
                for other in set {
                    let Some(other_block) = self.blocks.get(other.index()) else {
                        return Err(IrError::DanglingEdge {
                            from: block.name.clone(),
                            to: format!("<index {}>", other.index()),
                        });
                    };
                    if !other_sets[other.index()].contains(&this) {
                        return Err(IrError::AdjacencyMismatch {
                            block: block.name.clone(),
                            detail: format!(
                                "'{}' is a {} without the reverse edge",
                                other_block.name, relation
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn neighbours<'a>(
        &'a self,
        sets: &'a [BTreeSet<BlockRef>],
        block: BlockRef,
    ) -> impl Iterator<Item = &'a BasicBlock> + 'a {
        sets.get(block.index())
            .into_iter()
            .flatten()
            .filter_map(|r| self.block(*r))
    }
}
