use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::Timestamp;

/// Identity of a block within an open session.
///
/// Assigned when a block is created or loaded and carried through history
/// snapshots, so undo/redo never changes which block an id refers to.
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex characters, for logs and UI only
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content type tag. Only Markdown exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Markdown,
}

/// One unit of Markdown content in a note.
///
/// Serializes to the persisted shape `{content, created, modified, type}`.
/// The rendered HTML cache, the identity and the 1-based index are
/// session-only and owned by [`BlockStore`](crate::editing::BlockStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(skip)]
    pub(crate) id: BlockId,
    pub(crate) content: String,
    /// Memoized HTML; `None` whenever `content` changed since the last render
    #[serde(skip)]
    pub(crate) content_html: Option<String>,
    pub created: Timestamp,
    pub modified: Timestamp,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    /// Always `position + 1` once inside a store
    #[serde(skip)]
    pub(crate) index: usize,
}

impl Block {
    /// A fresh Markdown block created and modified at `now`
    pub fn new(content: impl Into<String>, now: Timestamp) -> Self {
        Self::with_timestamps(content, now, now)
    }

    pub fn with_timestamps(
        content: impl Into<String>,
        created: Timestamp,
        modified: Timestamp,
    ) -> Self {
        Self {
            id: BlockId::new(),
            content: content.into(),
            content_html: None,
            created,
            modified,
            kind: BlockKind::Markdown,
            index: 0,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_html(&self) -> Option<&str> {
        self.content_html.as_deref()
    }

    /// 1-based position in the owning store (0 when detached)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_rendered(&self) -> bool {
        self.content_html.is_some()
    }
}
