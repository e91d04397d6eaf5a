//! Position arithmetic for drag-and-drop and one-step moves.

use crate::editing::MoveDirection;

/// Final position of the block at `source` when dropped into gap `target`.
///
/// Gaps are numbered `0..=len`, gap `p` sitting just before block `p`.
/// Removing the source shifts every later gap down by one, so a drop after
/// the source lands at `target - 1`. Dropping into either gap adjacent to
/// the source, or any invalid input, yields `None`.
pub fn drop_destination(source: usize, target: usize, len: usize) -> Option<usize> {
    if source >= len || target > len {
        return None;
    }
    let destination = if target <= source { target } else { target - 1 };
    (destination != source).then_some(destination)
}

/// Position one step up or down from `source`, if it exists
pub fn step_destination(source: usize, direction: MoveDirection, len: usize) -> Option<usize> {
    if source >= len {
        return None;
    }
    match direction {
        MoveDirection::Up => source.checked_sub(1),
        MoveDirection::Down => (source + 1 < len).then_some(source + 1),
    }
}
