//! Arena index over a document's blocks.
//!
//! Blocks are stored in a `Vec` with an id → slot map; child lists are
//! resolved to slot indices once at build time. Dangling child ids are
//! dropped here so the renderer never has to re-check them.

use crate::model::{Block, BlockKind};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// Lookup structure from block id to block record.
#[derive(Debug, Default)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    slots: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
}

impl BlockIndex {
    /// Build the index in O(n). Later duplicates of an id replace earlier ones
    /// in the lookup map.
    pub fn build(blocks: Vec<Block>) -> Self {
        let mut slots = HashMap::with_capacity(blocks.len());
        for (slot, block) in blocks.iter().enumerate() {
            slots.insert(block.id.clone(), slot);
        }

        let children = blocks
            .iter()
            .map(|block| {
                block
                    .children
                    .iter()
                    .filter_map(|id| {
                        let slot = slots.get(id).copied();
                        if slot.is_none() {
                            debug!(parent = %block.id, child = %id, "dropping dangling child id");
                        }
                        slot
                    })
                    .collect()
            })
            .collect();

        Self {
            blocks,
            slots,
            children,
        }
    }

    /// Number of blocks in the arena.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at an arena slot.
    pub fn block(&self, slot: usize) -> &Block {
        &self.blocks[slot]
    }

    /// Slot of the block with the given id.
    pub fn slot(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Block with the given id.
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.slot(id).map(|slot| &self.blocks[slot])
    }

    /// Resolved child slots of a block, in rendering order.
    pub fn children(&self, slot: usize) -> &[usize] {
        &self.children[slot]
    }

    /// Locate the document root.
    ///
    /// Prefers the parentless page block; otherwise falls back to the block
    /// whose id is the requested document id.
    pub fn find_root(&self, requested_id: &str) -> Result<usize> {
        self.blocks
            .iter()
            .position(|b| matches!(b.kind, BlockKind::Page { .. }) && b.parent.is_none())
            .or_else(|| self.slot(requested_id))
            .ok_or_else(|| Error::RootNotFound(requested_id.to_string()))
    }
}

/// A block index together with its identified root.
#[derive(Debug)]
pub struct Document {
    index: BlockIndex,
    root: usize,
}

impl Document {
    /// Build the index and locate the root for `doc_id`.
    pub fn new(doc_id: &str, blocks: Vec<Block>) -> Result<Self> {
        let index = BlockIndex::build(blocks);
        let root = index.find_root(doc_id)?;
        Ok(Self { index, root })
    }

    /// The underlying block index.
    pub const fn index(&self) -> &BlockIndex {
        &self.index
    }

    /// Arena slot of the root block.
    pub const fn root(&self) -> usize {
        self.root
    }

    /// The root block.
    pub fn root_block(&self) -> &Block {
        self.index.block(self.root)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Inline;

    fn page(id: &str) -> Block {
        Block::new(id, BlockKind::Page { title: Vec::new() })
    }

    fn text(id: &str, parent: &str) -> Block {
        Block::new(id, BlockKind::Text(vec![Inline::text(id)])).with_parent(parent)
    }

    #[test]
    fn test_build_resolves_children_to_slots() {
        // Given: a page with two children, one of them dangling
        let blocks = vec![
            page("root").with_children(["a", "missing", "b"]),
            text("a", "root"),
            text("b", "root"),
        ];

        // When: building the index
        let index = BlockIndex::build(blocks);

        // Then: only resolvable children remain, in order
        assert_eq!(index.len(), 3);
        let kids: Vec<&str> = index
            .children(0)
            .iter()
            .map(|&slot| index.block(slot).id.as_str())
            .collect();
        assert_eq!(kids, vec!["a", "b"]);
        assert_eq!(index.get("b").unwrap().id, "b");
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_find_root_prefers_parentless_page() {
        let blocks = vec![text("a", "root"), page("root").with_children(["a"])];
        let index = BlockIndex::build(blocks);

        assert_eq!(index.find_root("something-else").unwrap(), 1);
    }

    #[test]
    fn test_find_root_ignores_page_with_parent() {
        let blocks = vec![page("nested").with_parent("outer"), text("doc", "outer")];
        let index = BlockIndex::build(blocks);

        assert_eq!(index.find_root("doc").unwrap(), 1);
    }

    #[test]
    fn test_find_root_falls_back_to_requested_id() {
        let blocks = vec![Block::new("doc", BlockKind::Container), text("a", "doc")];
        let index = BlockIndex::build(blocks);

        assert_eq!(index.find_root("doc").unwrap(), 0);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let index = BlockIndex::build(vec![text("a", "x")]);

        let err = index.find_root("doxcnGone").unwrap_err();

        assert!(matches!(err, Error::RootNotFound(ref id) if id == "doxcnGone"));
        assert!(err.to_string().contains("document root not found"));
    }

    #[test]
    fn test_document_exposes_root() {
        let doc = Document::new("root", vec![page("root")]).unwrap();
        assert_eq!(doc.root(), 0);
        assert_eq!(doc.root_block().id, "root");
        assert!(!doc.index().is_empty());
    }
}
