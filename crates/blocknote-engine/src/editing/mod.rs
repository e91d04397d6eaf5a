/*!
 * # Editing Core
 *
 * A note is an ordered list of [`Block`](crate::models::Block)s held in a
 * [`BlockStore`]. The [`Session`] is the only writer: hosts turn user
 * gestures into [`Command`]s and dispatch them.
 *
 * ## Flow of a change
 *
 * 1. The session checks the [`EditState`]. At most one block is edited at
 *    a time, and structural commands are refused while it is.
 * 2. The store is mutated (`insert`, `remove_at`, `move_to`,
 *    `commit_edit`), re-deriving every block's 1-based `index`.
 * 3. [`History`] records a deep copy. Identical commits record nothing;
 *    the window holds at most `limit` entries, oldest dropped first.
 * 4. The render pipeline refreshes the view, converting only blocks whose
 *    memoized HTML was cleared.
 *
 * Undo and redo swap a history copy back in and re-render it; HTML is
 * never stored in history.
 */

pub mod commands;
pub mod edit_state;
pub mod history;
pub mod reorder;
pub mod session;
pub mod store;

pub use commands::{Command, MoveDirection, Outcome};
pub use edit_state::{EditSession, EditState};
pub use history::{DEFAULT_HISTORY_LIMIT, History};
pub use reorder::{drop_destination, step_destination};
pub use session::{IMAGE_PLACEHOLDER, Page, Session, SessionError, SessionOptions, Templates};
pub use store::{BlockStore, CommitOutcome, StoreError};
