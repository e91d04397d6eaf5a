//! Interfaces the engine consumes from its host.
//!
//! A [`Session`](crate::editing::Session) never talks to storage, upload
//! endpoints or rendering libraries directly; it is handed one
//! [`Collaborators`] set at construction. Hosts pick the implementations:
//! the filesystem-backed ones in [`crate::io`], an HTTP client, or test
//! doubles.

use relative_path::RelativePath;
use std::path::PathBuf;
use std::rc::Rc;

use crate::io::{FsImageUploader, IoError, JsonNoteStore};
use crate::models::Block;
use crate::render::{PulldownMarkdown, TemplateEngine, TemplateError};

/// Failure of a load/save/upload request. The session reports these and
/// aborts the operation; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("invalid note path: {0}")]
    InvalidPath(String),
    #[error("image upload rejected: {0}")]
    Upload(String),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("invalid note data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads and saves a note's ordered blocks
pub trait NoteStore {
    fn load(&self, path: &RelativePath) -> Result<Vec<Block>, CollaboratorError>;
    fn save(&self, path: &RelativePath, blocks: &[Block]) -> Result<(), CollaboratorError>;
}

impl<N: NoteStore + ?Sized> NoteStore for Rc<N> {
    fn load(&self, path: &RelativePath) -> Result<Vec<Block>, CollaboratorError> {
        (**self).load(path)
    }

    fn save(&self, path: &RelativePath, blocks: &[Block]) -> Result<(), CollaboratorError> {
        (**self).save(path, blocks)
    }
}

/// Stores a pasted image and returns the URL to reference it by
pub trait ImageUploader {
    fn upload(
        &self,
        note: &RelativePath,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CollaboratorError>;
}

/// Pure Markdown to HTML conversion
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

impl<M: MarkdownRenderer + ?Sized> MarkdownRenderer for Rc<M> {
    fn render(&self, markdown: &str) -> String {
        (**self).render(markdown)
    }
}

/// Pure `(template, data) -> HTML`, escaping by default
pub trait TemplateRenderer {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, TemplateError>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &serde_json::Value) -> Result<String, TemplateError>,
{
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, TemplateError> {
        self(template, data)
    }
}

/// Everything a session needs from the outside world
pub struct Collaborators {
    pub notes: Box<dyn NoteStore>,
    pub uploader: Box<dyn ImageUploader>,
    pub markdown: Box<dyn MarkdownRenderer>,
    pub templates: Box<dyn TemplateRenderer>,
}

impl Collaborators {
    /// Notes and images on local disk under `notes_root`, rendered with
    /// the built-in Markdown and template renderers
    pub fn filesystem(notes_root: impl Into<PathBuf>) -> Self {
        let notes_root = notes_root.into();
        Self {
            notes: Box::new(JsonNoteStore::new(notes_root.clone())),
            uploader: Box::new(FsImageUploader::new(notes_root)),
            markdown: Box::new(PulldownMarkdown::new()),
            templates: Box::new(TemplateEngine::new()),
        }
    }
}
