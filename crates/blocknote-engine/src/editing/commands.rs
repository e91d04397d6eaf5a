use crate::models::BlockId;

/// One step direction for keyboard-style block moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// User intent dispatched into a [`Session`](crate::editing::Session).
///
/// Every UI gesture maps onto one of these; the session decides whether the
/// current edit state allows it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert an empty block at `at` and start editing it
    AddBlock { at: usize },
    BeginEdit { block: BlockId },
    /// Replace the live editor buffer
    UpdateBuffer { text: String },
    Commit,
    /// Commit the buffer up to byte `at`; the rest becomes a new block after it
    CommitSplit { at: usize },
    Cancel,
    Delete { block: BlockId },
    Move { block: BlockId, direction: MoveDirection },
    /// Drag-and-drop: drop `block` into the gap before position `target`
    /// (`target == len` drops at the end)
    Drop { block: BlockId, target: usize },
    Undo,
    Redo,
}

impl Command {
    /// Commands that change block order or membership
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Command::AddBlock { .. }
                | Command::Delete { .. }
                | Command::Move { .. }
                | Command::Drop { .. }
        )
    }
}

/// How a dispatched command was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The block store changed
    Applied,
    /// Accepted, but only edit state changed
    Accepted,
    /// Refused in the current state; nothing changed
    Ignored,
}
