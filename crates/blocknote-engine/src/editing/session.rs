use relative_path::{RelativePath, RelativePathBuf};

use crate::collaborators::{CollaboratorError, Collaborators};
use crate::editing::commands::{Command, MoveDirection, Outcome};
use crate::editing::edit_state::{EditSession, EditState, floor_char_boundary};
use crate::editing::history::{DEFAULT_HISTORY_LIMIT, History};
use crate::editing::reorder::{drop_destination, step_destination};
use crate::editing::store::{BlockStore, CommitOutcome, StoreError};
use crate::models::{Block, BlockId, Clock, SystemClock};
use crate::render::{
    DEFAULT_MAIN_TEMPLATE, DEFAULT_SIDEBAR_TEMPLATE, RenderOutput, TemplateError, render_store,
};

/// Text shown in the editor while a pasted image uploads
pub const IMAGE_PLACEHOLDER: &str = "![Uploading image...]";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no note is open")]
    NoNoteOpen,
    #[error("no block is being edited")]
    NotEditing,
    #[error(transparent)]
    Network(#[from] CollaboratorError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Page templates handed to the template renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    pub main: String,
    pub sidebar: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            main: DEFAULT_MAIN_TEMPLATE.to_string(),
            sidebar: DEFAULT_SIDEBAR_TEMPLATE.to_string(),
        }
    }
}

pub struct SessionOptions {
    pub history_limit: usize,
    pub clock: Box<dyn Clock>,
    pub templates: Templates,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            clock: Box::new(SystemClock::local()),
            templates: Templates::default(),
        }
    }
}

/// Latest template output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub main: String,
    pub sidebar: String,
}

/// The editor for one open note.
///
/// Owns the block store, its history and the edit state. Every change goes
/// through [`Session::dispatch`], which runs mutate, then snapshot, then
/// re-render, in that order.
///
/// Structural commands (add, delete, move, drop) and undo/redo are refused
/// with [`Outcome::Ignored`] while a block is being edited. All methods take
/// `&mut self` and collaborator calls complete before they return, so no
/// command can interleave with an in-flight load, save or upload.
pub struct Session {
    collaborators: Collaborators,
    clock: Box<dyn Clock>,
    templates: Templates,
    path: Option<RelativePathBuf>,
    store: BlockStore,
    history: History,
    edit: EditState,
    view: RenderOutput,
    page: Option<Page>,
}

impl Session {
    pub fn new(collaborators: Collaborators, options: SessionOptions) -> Self {
        Self {
            collaborators,
            clock: options.clock,
            templates: options.templates,
            path: None,
            store: BlockStore::new(),
            history: History::new(options.history_limit),
            edit: EditState::Idle,
            view: RenderOutput::default(),
            page: None,
        }
    }

    pub fn path(&self) -> Option<&RelativePath> {
        self.path.as_deref()
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Derived view of the store as of the last change
    pub fn view(&self) -> &RenderOutput {
        &self.view
    }

    /// Rendered page as of the last change; `None` until a note is open
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Open a note, closing the current one first.
    ///
    /// If the current note cannot be saved the open is aborted and the
    /// current note stays open.
    pub fn open(&mut self, path: impl Into<RelativePathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        self.close()?;

        let blocks = self.collaborators.notes.load(&path).inspect_err(|e| {
            log::warn!("loading {path} failed: {e}");
        })?;
        log::info!("opened {} ({} blocks)", path, blocks.len());

        self.store = BlockStore::from_blocks(blocks);
        self.history.clear();
        self.history.snapshot(&self.store);
        self.path = Some(path);
        self.refresh()
    }

    /// Persist the store. On failure the in-memory note is left as it was.
    ///
    /// Saving mid-edit writes the committed contents; a block added but not
    /// yet committed is still empty and is left out of the file.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.path.as_ref().ok_or(SessionError::NoNoteOpen)?;
        let pending: Vec<Block>;
        let blocks = if self.edit.is_editing() {
            pending = self
                .store
                .iter()
                .filter(|b| !b.content().is_empty())
                .cloned()
                .collect();
            pending.as_slice()
        } else {
            self.store.blocks()
        };
        self.collaborators
            .notes
            .save(path, blocks)
            .inspect_err(|e| log::warn!("saving {path} failed: {e}"))?;
        log::info!("saved {} ({} blocks)", path, blocks.len());
        Ok(())
    }

    /// Commit any pending edit, save, and forget the note.
    ///
    /// Nothing is forgotten if the save fails. Closing with no note open
    /// does nothing.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.path.is_none() {
            return Ok(());
        }
        if self.edit.is_editing() {
            self.commit(None)?;
        }
        self.save()?;

        if let Some(path) = self.path.take() {
            log::info!("closed {path}");
        }
        self.store = BlockStore::new();
        self.history.clear();
        self.view = RenderOutput::default();
        self.page = None;
        Ok(())
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, SessionError> {
        if self.path.is_none() {
            return Err(SessionError::NoNoteOpen);
        }
        if command.is_structural() && self.edit.is_editing() {
            log::debug!("refusing {command:?} while editing");
            return Ok(Outcome::Ignored);
        }

        match command {
            Command::AddBlock { at } => self.add_block(at),
            Command::BeginEdit { block } => Ok(self.begin_edit(block)),
            Command::UpdateBuffer { text } => Ok(match self.edit.session_mut() {
                Some(session) => {
                    session.set_buffer(text);
                    Outcome::Accepted
                }
                None => Outcome::Ignored,
            }),
            Command::Commit => self.commit(None),
            Command::CommitSplit { at } => self.commit(Some(at)),
            Command::Cancel => self.cancel(),
            Command::Delete { block } => self.delete(block),
            Command::Move { block, direction } => self.step(block, direction),
            Command::Drop { block, target } => self.drop_block(block, target),
            Command::Undo => self.travel(History::undo),
            Command::Redo => self.travel(History::redo),
        }
    }

    /// Upload an image pasted into the block being edited.
    ///
    /// A placeholder is appended to the buffer for the duration of the
    /// upload, then replaced with an image link. On failure the placeholder
    /// is removed and the error returned for the host to report. Returns the
    /// image URL.
    pub fn paste_image(&mut self, file_name: &str, bytes: &[u8]) -> Result<String, SessionError> {
        let note = self.path.clone().ok_or(SessionError::NoNoteOpen)?;
        let session = self.edit.session_mut().ok_or(SessionError::NotEditing)?;
        let at = session.buffer().len();
        session.push_str(IMAGE_PLACEHOLDER);

        match self.collaborators.uploader.upload(&note, file_name, bytes) {
            Ok(url) => {
                session.replace_at(at, IMAGE_PLACEHOLDER, &format!("![{file_name}]({url})"));
                Ok(url)
            }
            Err(e) => {
                session.replace_at(at, IMAGE_PLACEHOLDER, "");
                log::warn!("uploading {file_name} failed: {e}");
                Err(e.into())
            }
        }
    }

    fn add_block(&mut self, at: usize) -> Result<Outcome, SessionError> {
        if at > self.store.len() {
            return Ok(Outcome::Ignored);
        }
        let block = Block::new("", self.clock.now());
        let id = block.id();
        self.store.insert(at, block)?;
        self.edit.begin(id, "");
        log::debug!("added block {} at {at}", id.short());
        self.refresh()?;
        Ok(Outcome::Applied)
    }

    fn begin_edit(&mut self, block: BlockId) -> Outcome {
        let Some(content) = self.store.find(block).map(|b| b.content().to_string()) else {
            return Outcome::Ignored;
        };
        if !self.edit.begin(block, &content) {
            return Outcome::Ignored;
        }
        log::debug!("editing block {}", block.short());
        Outcome::Accepted
    }

    /// Finalize the edit. With `split_at`, the buffer is cut at that byte
    /// offset (one newline at the cut is dropped) and a non-empty tail
    /// becomes a new block right after the edited one.
    fn commit(&mut self, split_at: Option<usize>) -> Result<Outcome, SessionError> {
        let Some(session) = self.edit.finish() else {
            return Ok(Outcome::Ignored);
        };
        let Some(position) = self.store.position_of(session.block()) else {
            return Ok(Outcome::Ignored);
        };
        let (head, tail) = split_buffer(&session, split_at);
        let now = self.clock.now();

        let (mut changed, mut record) = match self.store.commit_edit(position, head, now)? {
            CommitOutcome::Removed(_) => (true, !session.original().is_empty()),
            CommitOutcome::Updated => (true, true),
            CommitOutcome::Unchanged => (false, false),
        };
        if !tail.is_empty() {
            let at = if head.is_empty() { position } else { position + 1 };
            self.store.insert(at, Block::new(tail, now))?;
            changed = true;
            record = true;
        }
        log::debug!(
            "committed block {} (changed: {changed}, recorded: {record})",
            session.block().short()
        );

        if record {
            self.history.snapshot(&self.store);
        }
        if !changed {
            return Ok(Outcome::Accepted);
        }
        self.refresh()?;
        Ok(Outcome::Applied)
    }

    /// Leave the editor without touching the block. A block that was added
    /// empty and never committed is dropped again.
    fn cancel(&mut self) -> Result<Outcome, SessionError> {
        let Some(session) = self.edit.finish() else {
            return Ok(Outcome::Ignored);
        };
        log::debug!("cancelled edit of block {}", session.block().short());

        let blank = self
            .store
            .position_of(session.block())
            .filter(|&p| self.store.get(p).is_some_and(|b| b.content().is_empty()));
        let Some(position) = blank else {
            return Ok(Outcome::Accepted);
        };
        self.store.remove_at(position)?;
        self.refresh()?;
        Ok(Outcome::Applied)
    }

    fn delete(&mut self, block: BlockId) -> Result<Outcome, SessionError> {
        let Some(position) = self.store.position_of(block) else {
            return Ok(Outcome::Ignored);
        };
        self.store.remove_at(position)?;
        self.record_and_refresh()
    }

    fn step(&mut self, block: BlockId, direction: MoveDirection) -> Result<Outcome, SessionError> {
        let destination = self
            .store
            .position_of(block)
            .and_then(|from| Some((from, step_destination(from, direction, self.store.len())?)));
        let Some((from, to)) = destination else {
            return Ok(Outcome::Ignored);
        };
        self.store.move_to(from, to)?;
        self.record_and_refresh()
    }

    fn drop_block(&mut self, block: BlockId, target: usize) -> Result<Outcome, SessionError> {
        let destination = self
            .store
            .position_of(block)
            .and_then(|from| Some((from, drop_destination(from, target, self.store.len())?)));
        let Some((from, to)) = destination else {
            return Ok(Outcome::Ignored);
        };
        log::debug!("dropping block {} from {from} to {to}", block.short());
        self.store.move_to(from, to)?;
        self.record_and_refresh()
    }

    fn travel(
        &mut self,
        step: fn(&mut History) -> Option<BlockStore>,
    ) -> Result<Outcome, SessionError> {
        if self.edit.is_editing() {
            return Ok(Outcome::Ignored);
        }
        let Some(mut restored) = step(&mut self.history) else {
            return Ok(Outcome::Ignored);
        };
        restored.adopt_html(&self.store);
        self.store = restored;
        self.refresh()?;
        Ok(Outcome::Applied)
    }

    fn record_and_refresh(&mut self) -> Result<Outcome, SessionError> {
        self.history.snapshot(&self.store);
        self.refresh()?;
        Ok(Outcome::Applied)
    }

    fn refresh(&mut self) -> Result<(), SessionError> {
        self.view = render_store(&mut self.store, self.collaborators.markdown.as_ref());
        let data = serde_json::to_value(&self.view).map_err(TemplateError::from)?;
        let templates = &self.collaborators.templates;
        let main = templates.render(&self.templates.main, &data)?;
        let sidebar = templates.render(&self.templates.sidebar, &data)?;
        self.page = Some(Page { main, sidebar });
        Ok(())
    }
}

fn split_buffer(session: &EditSession, split_at: Option<usize>) -> (&str, &str) {
    let buffer = session.buffer();
    let Some(at) = split_at else {
        return (buffer, "");
    };
    let (head, tail) = buffer.split_at(floor_char_boundary(buffer, at));
    (
        head.strip_suffix('\n').unwrap_or(head),
        tail.strip_prefix('\n').unwrap_or(tail),
    )
}
