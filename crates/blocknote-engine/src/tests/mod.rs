//! Shared fixtures for unit tests

use relative_path::RelativePath;
use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

use crate::collaborators::{
    CollaboratorError, Collaborators, ImageUploader, MarkdownRenderer, NoteStore,
};
use crate::editing::{Session, SessionOptions, Templates};
use crate::io::MemoryNoteStore;
use crate::models::{Block, FixedClock, Timestamp};
use crate::render::TemplateEngine;

pub const NOTE: &str = "note.json";
/// Saves to this note always fail
pub const FAILING_NOTE: &str = "readonly.json";

pub fn create_test_notes_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

pub fn create_test_file(dir: &TempDir, relative_path: &str, content: &str) {
    let file_path = dir.path().join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(file_path, content).unwrap();
}

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

/// Wraps content in `<md>` tags and counts conversions
#[derive(Debug, Default)]
pub struct CountingMarkdown {
    calls: Cell<usize>,
}

impl CountingMarkdown {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MarkdownRenderer for CountingMarkdown {
    fn render(&self, markdown: &str) -> String {
        self.calls.set(self.calls.get() + 1);
        format!("<md>{markdown}</md>")
    }
}

struct FlakyNotes(Rc<MemoryNoteStore>);

impl NoteStore for FlakyNotes {
    fn load(&self, path: &RelativePath) -> Result<Vec<Block>, CollaboratorError> {
        self.0.load(path)
    }

    fn save(&self, path: &RelativePath, blocks: &[Block]) -> Result<(), CollaboratorError> {
        if path == RelativePath::new(FAILING_NOTE) {
            return Err(CollaboratorError::Request("503 Service Unavailable".into()));
        }
        self.0.save(path, blocks)
    }
}

/// Accepts any non-empty image and serves it from `/images/`
pub struct StubUploader;

impl ImageUploader for StubUploader {
    fn upload(
        &self,
        _note: &RelativePath,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CollaboratorError> {
        if bytes.is_empty() {
            return Err(CollaboratorError::Upload("empty image".into()));
        }
        Ok(format!("/images/{file_name}"))
    }
}

/// In-memory notes, a fixed clock and counting Markdown behind a session
pub struct TestHost {
    pub notes: Rc<MemoryNoteStore>,
    pub clock: Rc<FixedClock>,
    pub markdown: Rc<CountingMarkdown>,
}

impl TestHost {
    /// Host whose [`NOTE`] holds one block per entry of `contents`
    pub fn with_note(contents: &[&str]) -> Self {
        let clock = Rc::new(FixedClock::new(ts("2024-06-01 12:00:00")));
        let blocks: Vec<Block> = contents
            .iter()
            .map(|c| Block::new(*c, ts("2024-06-01 09:00:00")))
            .collect();
        let notes = Rc::new(MemoryNoteStore::new());
        notes.save(RelativePath::new(NOTE), &blocks).unwrap();
        Self {
            notes,
            clock,
            markdown: Rc::new(CountingMarkdown::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            notes: Box::new(FlakyNotes(self.notes.clone())),
            uploader: Box::new(StubUploader),
            markdown: Box::new(self.markdown.clone()),
            templates: Box::new(TemplateEngine::new()),
        }
    }

    pub fn options(&self) -> SessionOptions {
        SessionOptions {
            history_limit: 50,
            clock: Box::new(self.clock.clone()),
            templates: Templates::default(),
        }
    }

    /// Session with [`NOTE`] open
    pub fn session(&self) -> Session {
        let mut session = Session::new(self.collaborators(), self.options());
        session.open(NOTE).unwrap();
        session
    }

    pub fn saved_contents(&self) -> Vec<String> {
        self.notes
            .load(RelativePath::new(NOTE))
            .unwrap()
            .iter()
            .map(|b| b.content().to_string())
            .collect()
    }
}
