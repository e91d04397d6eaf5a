use std::collections::HashMap;

use crate::models::{Block, BlockId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("position {position} is out of range for a store of {len} blocks")]
    OutOfRange { position: usize, len: usize },
}

/// What a content commit did to the store
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// New content was empty, so the block was deleted
    Removed(Block),
    /// New content equals the current content; nothing changed
    Unchanged,
    /// Content replaced, `modified` bumped, rendered HTML invalidated
    Updated,
}

/// Ordered blocks of one note.
///
/// Position in the sequence is the only source of truth for order. Every
/// structural mutation re-derives each block's 1-based `index`, so callers
/// can never observe an index that disagrees with the position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of blocks in document order
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut store = Self { blocks };
        store.reindex();
        store
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn position_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn find(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Raw content of every block, in order
    pub fn contents(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.content.as_str()).collect()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Insert at `position` in `[0, len]`
    pub fn insert(&mut self, position: usize, block: Block) -> Result<(), StoreError> {
        if position > self.blocks.len() {
            return Err(self.out_of_range(position));
        }
        self.blocks.insert(position, block);
        self.reindex();
        Ok(())
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Block, StoreError> {
        if position >= self.blocks.len() {
            return Err(self.out_of_range(position));
        }
        let removed = self.blocks.remove(position);
        self.reindex();
        Ok(removed)
    }

    /// Move the block at `from` so it ends up at position `to`.
    ///
    /// Equal positions are a no-op; otherwise both must address an
    /// existing block.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        if from == to {
            return Ok(());
        }
        for position in [from, to] {
            if position >= self.blocks.len() {
                return Err(self.out_of_range(position));
            }
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        self.reindex();
        Ok(())
    }

    /// Replace a block's content as the result of an edit.
    ///
    /// Empty content deletes the block. Identical content leaves the block,
    /// including `modified`, untouched.
    pub fn commit_edit(
        &mut self,
        position: usize,
        new_content: &str,
        now: Timestamp,
    ) -> Result<CommitOutcome, StoreError> {
        if position >= self.blocks.len() {
            return Err(self.out_of_range(position));
        }
        if new_content.is_empty() {
            return self.remove_at(position).map(CommitOutcome::Removed);
        }

        let block = &mut self.blocks[position];
        if block.content == new_content {
            return Ok(CommitOutcome::Unchanged);
        }
        block.content = new_content.to_string();
        block.modified = now;
        block.content_html = None;
        Ok(CommitOutcome::Updated)
    }

    /// Cache rendered HTML for the block at `position`
    pub(crate) fn memoize_html(&mut self, position: usize, html: String) {
        if let Some(block) = self.blocks.get_mut(position) {
            block.content_html = Some(html);
        }
    }

    /// Deep copy without any memoized HTML, for history
    pub fn detached(&self) -> Self {
        let blocks = self
            .blocks
            .iter()
            .map(|b| Block {
                content_html: None,
                ..b.clone()
            })
            .collect();
        Self { blocks }
    }

    /// Take memoized HTML from `previous` for every block whose id and
    /// content are unchanged there
    pub(crate) fn adopt_html(&mut self, previous: &BlockStore) {
        let rendered: HashMap<BlockId, &Block> = previous
            .blocks
            .iter()
            .filter(|b| b.is_rendered())
            .map(|b| (b.id(), b))
            .collect();
        for block in self.blocks.iter_mut().filter(|b| !b.is_rendered()) {
            match rendered.get(&block.id()) {
                Some(old) if old.content() == block.content() => {
                    block.content_html = old.content_html.clone();
                }
                _ => {}
            }
        }
    }

    fn reindex(&mut self) {
        for (position, block) in self.blocks.iter_mut().enumerate() {
            block.index = position + 1;
        }
    }

    fn out_of_range(&self, position: usize) -> StoreError {
        StoreError::OutOfRange {
            position,
            len: self.blocks.len(),
        }
    }
}
