// Shared by several integration test files; not every file uses every helper
#![allow(dead_code)]

use blocknote_engine::{
    Block, BlockId, CollaboratorError, Collaborators, Command, FixedClock, ImageUploader,
    MarkdownRenderer, MemoryNoteStore, NoteStore, Outcome, Session, SessionOptions,
    TemplateEngine, Templates, Timestamp,
};
use relative_path::RelativePath;
use std::cell::RefCell;
use std::rc::Rc;

pub const NOTE: &str = "journal/note.json";

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

/// Records every Markdown conversion it performs
#[derive(Debug, Default)]
pub struct RecordingMarkdown {
    converted: RefCell<Vec<String>>,
}

impl RecordingMarkdown {
    pub fn take(&self) -> Vec<String> {
        self.converted.take()
    }
}

impl MarkdownRenderer for RecordingMarkdown {
    fn render(&self, markdown: &str) -> String {
        self.converted.borrow_mut().push(markdown.to_string());
        format!("<p>{markdown}</p>")
    }
}

/// Upload endpoint that rejects everything
pub struct OfflineUploader;

impl ImageUploader for OfflineUploader {
    fn upload(
        &self,
        _note: &RelativePath,
        _file_name: &str,
        _bytes: &[u8],
    ) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Request("connection refused".into()))
    }
}

pub struct Harness {
    pub notes: Rc<MemoryNoteStore>,
    pub clock: Rc<FixedClock>,
    pub markdown: Rc<RecordingMarkdown>,
    pub session: Session,
}

impl Harness {
    pub fn open(contents: &[&str]) -> Self {
        Self::open_with_limit(contents, 50)
    }

    pub fn open_with_limit(contents: &[&str], history_limit: usize) -> Self {
        let created = ts("2024-06-01 09:00:00");
        let blocks: Vec<Block> = contents.iter().map(|c| Block::new(*c, created)).collect();
        let notes = Rc::new(MemoryNoteStore::new());
        notes.save(RelativePath::new(NOTE), &blocks).unwrap();

        let clock = Rc::new(FixedClock::new(ts("2024-06-01 12:00:00")));
        let markdown = Rc::new(RecordingMarkdown::default());
        let collaborators = Collaborators {
            notes: Box::new(notes.clone()),
            uploader: Box::new(OfflineUploader),
            markdown: Box::new(markdown.clone()),
            templates: Box::new(TemplateEngine::new()),
        };
        let options = SessionOptions {
            history_limit,
            clock: Box::new(clock.clone()),
            templates: Templates::default(),
        };
        let mut session = Session::new(collaborators, options);
        session.open(NOTE).unwrap();

        Self {
            notes,
            clock,
            markdown,
            session,
        }
    }

    pub fn id(&self, position: usize) -> BlockId {
        self.session.store().get(position).unwrap().id()
    }

    pub fn contents(&self) -> Vec<String> {
        self.session
            .store()
            .iter()
            .map(|b| b.content().to_string())
            .collect()
    }

    pub fn send(&mut self, command: Command) -> Outcome {
        self.session.dispatch(command).unwrap()
    }

    /// Begin editing the block at `position`, type `text`, commit
    pub fn edit(&mut self, position: usize, text: &str) -> Outcome {
        let block = self.id(position);
        self.send(Command::BeginEdit { block });
        self.send(Command::UpdateBuffer { text: text.into() });
        self.send(Command::Commit)
    }

    pub fn indexes(&self) -> Vec<usize> {
        self.session.store().iter().map(|b| b.index()).collect()
    }
}
