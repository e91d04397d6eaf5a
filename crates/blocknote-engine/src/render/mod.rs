//! Derives everything a frontend shows from the block store.
//!
//! Rendering is incremental: a block's Markdown is converted only when its
//! memoized HTML is missing, which the store guarantees whenever the content
//! changed. The heading outline and activity lists are cheap and recomputed
//! from raw content on every run.

pub mod headings;
pub mod markdown;
pub mod template;

pub use headings::{Heading, extract_headings};
pub use markdown::PulldownMarkdown;
pub use template::{DEFAULT_MAIN_TEMPLATE, DEFAULT_SIDEBAR_TEMPLATE, TemplateEngine, TemplateError};

use serde::Serialize;

use crate::collaborators::MarkdownRenderer;
use crate::editing::BlockStore;
use crate::models::{BlockId, Timestamp};

/// A block ready for the document body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub id: BlockId,
    /// 0-based position
    pub position: usize,
    /// 1-based index
    pub index: usize,
    pub content: String,
    pub content_html: String,
    pub created: Timestamp,
    pub modified: Timestamp,
}

/// Sidebar entry pointing back at a block by position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub id: BlockId,
    pub position: usize,
    pub created: Timestamp,
    pub modified: Timestamp,
}

/// Full derived view of a store, handed to the page templates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOutput {
    pub blocks: Vec<RenderedBlock>,
    pub headings: Vec<Heading>,
    /// Newest modification first
    pub by_modified: Vec<ActivityEntry>,
    /// Newest creation first
    pub by_created: Vec<ActivityEntry>,
}

/// Render `store`, memoizing HTML into blocks that lack it
pub fn render_store(store: &mut BlockStore, markdown: &dyn MarkdownRenderer) -> RenderOutput {
    let mut converted = 0;
    for position in 0..store.len() {
        let pending = store
            .get(position)
            .filter(|b| !b.is_rendered())
            .map(|b| markdown.render(b.content()));
        if let Some(html) = pending {
            store.memoize_html(position, html);
            converted += 1;
        }
    }
    log::debug!(
        "rendered {} of {} blocks ({} memoized)",
        converted,
        store.len(),
        store.len() - converted
    );

    let mut headings = Vec::new();
    let mut blocks = Vec::with_capacity(store.len());
    for (position, block) in store.iter().enumerate() {
        headings.extend(extract_headings(block.content(), position));
        blocks.push(RenderedBlock {
            id: block.id(),
            position,
            index: block.index(),
            content: block.content().to_string(),
            content_html: block.content_html().unwrap_or_default().to_string(),
            created: block.created,
            modified: block.modified,
        });
    }

    let activity: Vec<ActivityEntry> = blocks
        .iter()
        .map(|b| ActivityEntry {
            id: b.id,
            position: b.position,
            created: b.created,
            modified: b.modified,
        })
        .collect();
    // Stable sorts keep document order among equal timestamps
    let mut by_modified = activity.clone();
    by_modified.sort_by(|a, b| b.modified.cmp(&a.modified));
    let mut by_created = activity;
    by_created.sort_by(|a, b| b.created.cmp(&a.created));

    RenderOutput {
        blocks,
        headings,
        by_modified,
        by_created,
    }
}
