use crate::models::BlockId;

/// Which block, if any, is under active text editing.
///
/// At most one block is ever being edited. `begin` refuses while a session
/// is open; the only ways out of `Editing` are commit and cancel, both of
/// which go through [`EditState::finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(EditSession),
}

/// Live editor state for the block being edited
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    block: BlockId,
    original: String,
    buffer: String,
}

impl EditSession {
    fn new(block: BlockId, original: &str) -> Self {
        Self {
            block,
            original: original.to_string(),
            buffer: original.to_string(),
        }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Content of the block when editing began
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Insert at byte offset `at`, snapped back to a char boundary and
    /// clamped to the buffer end
    pub fn insert_str(&mut self, at: usize, text: &str) {
        let at = floor_char_boundary(&self.buffer, at);
        self.buffer.insert_str(at, text);
    }

    /// Drop the last character, if any
    pub fn pop_char(&mut self) -> Option<char> {
        self.buffer.pop()
    }

    /// Replace `expected` at byte offset `start`; false, changing nothing,
    /// if the buffer no longer holds it there
    pub fn replace_at(&mut self, start: usize, expected: &str, to: &str) -> bool {
        let end = start + expected.len();
        if self.buffer.get(start..end) != Some(expected) {
            return false;
        }
        self.buffer.replace_range(start..end, to);
        true
    }
}

impl EditState {
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing(_))
    }

    pub fn editing_block(&self) -> Option<BlockId> {
        self.session().map(EditSession::block)
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        match self {
            EditState::Editing(session) => Some(session),
            EditState::Idle => None,
        }
    }

    /// `Idle -> Editing`. Returns false, changing nothing, if a session is
    /// already open on any block.
    pub fn begin(&mut self, block: BlockId, content: &str) -> bool {
        if self.is_editing() {
            return false;
        }
        log::debug!("begin editing block {}", block.short());
        *self = EditState::Editing(EditSession::new(block, content));
        true
    }

    /// `Editing -> Idle`, handing back the closed session
    pub fn finish(&mut self) -> Option<EditSession> {
        match std::mem::take(self) {
            EditState::Editing(session) => {
                log::debug!("finish editing block {}", session.block.short());
                Some(session)
            }
            EditState::Idle => None,
        }
    }
}

pub(crate) fn floor_char_boundary(s: &str, at: usize) -> usize {
    let mut at = at.min(s.len());
    while !s.is_char_boundary(at) {
        at -= 1;
    }
    at
}
