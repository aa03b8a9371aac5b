//! Undo/redo history — diff-based edit tracking.
//!
//! Instead of recording individual inserts and deletes, the history takes a
//! snapshot of the buffer when an edit begins and diffs it against the
//! buffer once the edit is over. Only the changed line range is kept, so
//! memory grows with the size of each edit rather than the size of the note.
//!
//! # Usage
//!
//! ```text
//! history.save_state(&buffer, cursor);   // snapshot before mutating
//! // mutate the buffer, possibly many times (a run of typing)
//! history.undo(&mut buffer, cursor);     // commits the pending edit, then reverts it
//! ```
//!
//! A new `save_state` commits whatever was pending first, so at most one
//! snapshot is ever in flight. Snapshots that turn out not to differ from
//! the buffer are discarded. Undo and redo are strictly LIFO.

use std::collections::VecDeque;

use crate::buffer::TextBuffer;
use crate::position::Position;

/// Undo depth used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 100;

// ---------------------------------------------------------------------------
// EditCommand
// ---------------------------------------------------------------------------

/// One undo unit: lines `start_line..start_line + old_lines.len()` were
/// replaced by `new_lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EditCommand {
    start_line: usize,
    old_lines: Vec<String>,
    new_lines: Vec<String>,
    cursor_before: Position,
    cursor_after: Position,
}

impl EditCommand {
    /// Diff two line sequences, keeping only the middle that differs.
    /// `None` when they are identical.
    fn diff(
        before: &[String],
        after: &[String],
        cursor_before: Position,
        cursor_after: Position,
    ) -> Option<Self> {
        let prefix = before
            .iter()
            .zip(after)
            .take_while(|(a, b)| a == b)
            .count();
        if prefix == before.len() && prefix == after.len() {
            return None;
        }

        let max_suffix = before.len().min(after.len()) - prefix;
        let suffix = before
            .iter()
            .rev()
            .zip(after.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        Some(Self {
            start_line: prefix,
            old_lines: before[prefix..before.len() - suffix].to_vec(),
            new_lines: after[prefix..after.len() - suffix].to_vec(),
            cursor_before,
            cursor_after,
        })
    }

    fn undo(&self, buf: &mut TextBuffer) {
        buf.replace_lines(self.start_line, self.new_lines.len(), &self.old_lines);
    }

    fn redo(&self, buf: &mut TextBuffer) {
        buf.replace_lines(self.start_line, self.old_lines.len(), &self.new_lines);
    }
}

/// The buffer and cursor as they were when an edit began.
#[derive(Debug, Clone)]
struct Snapshot {
    lines: Vec<String>,
    cursor: Position,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo history for one buffer.
///
/// New edits clear the redo stack; branching history is not kept. Once the
/// undo stack grows past `max_depth` the oldest entries are dropped.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<EditCommand>,
    redo_stack: Vec<EditCommand>,
    pending: Option<Snapshot>,
    max_depth: usize,
}

impl History {
    /// An empty history with [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// An empty history keeping at most `max_depth` undo entries (at
    /// least 1).
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            pending: None,
            max_depth: if max_depth == 0 { 1 } else { max_depth },
        }
    }

    /// The configured depth bound.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Begin an edit: commit any pending snapshot against the buffer as it
    /// is now, then snapshot it again and clear the redo stack.
    pub fn save_state(&mut self, buf: &TextBuffer, cursor: Position) {
        self.commit_pending(buf, cursor);
        self.pending = Some(Snapshot {
            lines: buf.lines().to_vec(),
            cursor,
        });
        self.redo_stack.clear();
    }

    /// Diff the pending snapshot against `buf` and push the result.
    ///
    /// Returns `true` when an entry was pushed. No pending snapshot, or a
    /// snapshot identical to the buffer, pushes nothing.
    pub fn commit_pending(&mut self, buf: &TextBuffer, cursor_after: Position) -> bool {
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        let Some(cmd) = EditCommand::diff(&snapshot.lines, buf.lines(), snapshot.cursor, cursor_after)
        else {
            return false;
        };

        self.undo_stack.push_back(cmd);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        true
    }

    /// Undo the most recent edit, committing a pending one first. Returns
    /// the cursor to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, buf: &mut TextBuffer, cursor: Position) -> Option<Position> {
        self.commit_pending(buf, cursor);
        let cmd = self.undo_stack.pop_back()?;
        cmd.undo(buf);
        let restored = cmd.cursor_before;
        self.redo_stack.push(cmd);
        Some(restored)
    }

    /// Redo the most recently undone edit. Returns the cursor to restore,
    /// or `None` if there is nothing to redo.
    ///
    /// A pending edit is committed first; since beginning it cleared the
    /// redo stack, there is then nothing to redo.
    pub fn redo(&mut self, buf: &mut TextBuffer, cursor: Position) -> Option<Position> {
        self.commit_pending(buf, cursor);
        let cmd = self.redo_stack.pop()?;
        cmd.redo(buf);
        let restored = cmd.cursor_after;
        self.undo_stack.push_back(cmd);
        Some(restored)
    }

    /// True if there is a committed edit or a pending snapshot to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.pending.is_some()
    }

    /// True if there is an undone edit to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Committed entries on the undo stack.
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Entries on the redo stack.
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// True while a snapshot is waiting to be committed.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_lines(lines.iter().copied())
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn lines(b: &TextBuffer) -> Vec<&str> {
        b.lines().iter().map(String::as_str).collect()
    }

    // -- Diffing ------------------------------------------------------------

    #[test]
    fn diff_keeps_only_changed_middle() {
        let before: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        let after: Vec<String> = ["a", "B", "x", "c", "d"].map(String::from).to_vec();
        let cmd = EditCommand::diff(&before, &after, p(1, 0), p(2, 1)).unwrap();
        assert_eq!(cmd.start_line, 1);
        assert_eq!(cmd.old_lines, vec!["b"]);
        assert_eq!(cmd.new_lines, vec!["B", "x"]);
    }

    #[test]
    fn diff_of_identical_is_none() {
        let same: Vec<String> = vec!["x".into()];
        assert!(EditCommand::diff(&same, &same, p(0, 0), p(0, 0)).is_none());
    }

    #[test]
    fn diff_with_repeated_lines_does_not_overlap() {
        let before: Vec<String> = ["a", "a"].map(String::from).to_vec();
        let after: Vec<String> = ["a", "a", "a"].map(String::from).to_vec();
        let cmd = EditCommand::diff(&before, &after, p(0, 0), p(0, 0)).unwrap();
        assert_eq!(cmd.start_line, 2);
        assert!(cmd.old_lines.is_empty());
        assert_eq!(cmd.new_lines, vec!["a"]);
    }

    // -- Undo / redo --------------------------------------------------------

    #[test]
    fn undo_restores_buffer_and_cursor() {
        let mut b = buf(&[""]);
        let mut h = History::new();

        h.save_state(&b, p(0, 0));
        let cursor = b.insert_char(p(0, 0), 'x');
        assert_eq!(lines(&b), vec!["x"]);

        assert_eq!(h.undo(&mut b, cursor), Some(p(0, 0)));
        assert_eq!(lines(&b), vec![""]);

        assert_eq!(h.redo(&mut b, p(0, 0)), Some(p(0, 1)));
        assert_eq!(lines(&b), vec!["x"]);
    }

    #[test]
    fn undo_line_join_and_split() {
        let mut b = buf(&["one", "two"]);
        let mut h = History::new();

        h.save_state(&b, p(1, 0));
        let cursor = b.delete_backward(p(1, 0));
        assert_eq!(lines(&b), vec!["onetwo"]);

        assert_eq!(h.undo(&mut b, cursor), Some(p(1, 0)));
        assert_eq!(lines(&b), vec!["one", "two"]);
        assert_eq!(h.redo(&mut b, p(1, 0)), Some(p(0, 3)));
        assert_eq!(lines(&b), vec!["onetwo"]);
    }

    #[test]
    fn undo_is_lifo() {
        let mut b = buf(&["a"]);
        let mut h = History::new();

        h.save_state(&b, p(0, 1));
        let c1 = b.insert_str(p(0, 1), "b");
        h.save_state(&b, c1);
        let c2 = b.insert_str(c1, "\nc");
        assert_eq!(lines(&b), vec!["ab", "c"]);

        assert_eq!(h.undo(&mut b, c2), Some(c1));
        assert_eq!(lines(&b), vec!["ab"]);
        assert_eq!(h.undo(&mut b, c1), Some(p(0, 1)));
        assert_eq!(lines(&b), vec!["a"]);
        assert_eq!(h.undo(&mut b, p(0, 1)), None);

        assert_eq!(h.redo(&mut b, p(0, 1)), Some(c1));
        assert_eq!(h.redo(&mut b, c1), Some(c2));
        assert_eq!(lines(&b), vec!["ab", "c"]);
        assert_eq!(h.redo(&mut b, c2), None);
    }

    #[test]
    fn empty_history_is_noop() {
        let mut b = buf(&["x"]);
        let mut h = History::new();
        assert!(!h.can_undo());
        assert_eq!(h.undo(&mut b, p(0, 0)), None);
        assert_eq!(h.redo(&mut b, p(0, 0)), None);
        assert_eq!(lines(&b), vec!["x"]);
    }

    // -- Pending snapshots --------------------------------------------------

    #[test]
    fn unchanged_snapshot_is_discarded() {
        let b = buf(&["x"]);
        let mut h = History::new();
        h.save_state(&b, p(0, 0));
        assert!(h.has_pending());
        assert!(!h.commit_pending(&b, p(0, 0)));
        assert_eq!(h.undo_count(), 0);
    }

    #[test]
    fn save_state_commits_previous_pending() {
        let mut b = buf(&[""]);
        let mut h = History::new();
        h.save_state(&b, p(0, 0));
        b.insert_str(p(0, 0), "a");
        h.save_state(&b, p(0, 1));
        assert_eq!(h.undo_count(), 1);
        assert!(h.has_pending());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut b = buf(&[""]);
        let mut h = History::new();
        h.save_state(&b, p(0, 0));
        b.insert_str(p(0, 0), "a");
        h.undo(&mut b, p(0, 1));
        assert!(h.can_redo());

        h.save_state(&b, p(0, 0));
        assert!(!h.can_redo());
        b.insert_str(p(0, 0), "z");
        assert_eq!(h.redo(&mut b, p(0, 1)), None);
        assert_eq!(lines(&b), vec!["z"]);
    }

    // -- Depth --------------------------------------------------------------

    #[test]
    fn oldest_entries_are_evicted() {
        let mut b = buf(&[""]);
        let mut h = History::with_max_depth(3);
        let mut cursor = p(0, 0);
        for ch in ['a', 'b', 'c', 'd', 'e'] {
            h.save_state(&b, cursor);
            cursor = b.insert_char(cursor, ch);
        }
        h.commit_pending(&b, cursor);
        assert_eq!(h.undo_count(), 3);

        while let Some(c) = h.undo(&mut b, cursor) {
            cursor = c;
        }
        assert_eq!(lines(&b), vec!["ab"]);
    }

    #[test]
    fn zero_depth_is_raised_to_one() {
        assert_eq!(History::with_max_depth(0).max_depth(), 1);
        assert_eq!(History::default().max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut b = buf(&[""]);
        let mut h = History::new();
        h.save_state(&b, p(0, 0));
        b.insert_str(p(0, 0), "a");
        h.clear();
        assert!(!h.can_undo());
        assert_eq!(h.undo(&mut b, p(0, 1)), None);
    }
}
