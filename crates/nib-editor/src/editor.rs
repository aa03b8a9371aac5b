//! Editing session — one buffer, its cursor, selection, formatting session
//! and history, driven one user action at a time.
//!
//! The [`Editor`] owns every piece of engine state exclusively. Each public
//! method corresponds to one user-facing action (a key binding in the
//! binary) and either fully applies or does nothing.
//!
//! # Undo grouping
//!
//! Before mutating, every edit calls `begin` with its [`ActionKind`]. A new
//! history entry starts unless the kind groups with itself (typing,
//! backspace, delete-forward) and the previous action was the same kind.
//! Cursor motion is an action too, so moving between two runs of typing
//! splits them into separate undo steps.
//!
//! # Splitting a region
//!
//! Toggling a kind strictly inside one of its regions only arms a split.
//! The closing and reopening delimiters go in with the next typed text, in
//! the same undo step, so the line never holds a bare `****` glue. Any other
//! action disarms it, and toggling the same kind again cancels it.

use crate::buffer::TextBuffer;
use crate::cursor::{self, Motion};
use crate::format::{self, FormattingSession};
use crate::history::{History, DEFAULT_MAX_DEPTH};
use crate::marker::{self, FormatKind, FormatSet};
use crate::position::{Position, Range};
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// The kind of the last action, for undo grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Nothing yet, or an explicit [`Editor::save_state`].
    Manual,
    Motion,
    Typing,
    Backspace,
    DeleteForward,
    Newline,
    Paste,
    Delete,
    Format,
    Indent,
    OpenLine,
    Undo,
    Redo,
}

impl ActionKind {
    /// True for kinds whose consecutive repeats share one undo entry.
    #[must_use]
    pub const fn groups(self) -> bool {
        matches!(self, Self::Typing | Self::Backspace | Self::DeleteForward)
    }
}

// ---------------------------------------------------------------------------
// FormatOutcome
// ---------------------------------------------------------------------------

/// What [`Editor::toggle_format`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The selection was wrapped in the kind.
    Applied(FormatKind),
    /// The kind was stripped from the selection.
    Removed(FormatKind),
    /// The cursor stepped out of a region at its edge; the toggle is off.
    SteppedOut(FormatKind),
    /// A split of the region around the cursor is armed; the next typed
    /// text lands between the two halves.
    Split(FormatKind),
    /// A second toggle cancelled the armed split.
    SplitCancelled(FormatKind),
    /// The sticky toggle flipped; carries the status message.
    Toggled(&'static str),
    /// The cursor or a selection bound sits inside a literal underline tag,
    /// or a split there would merge with a neighbouring `*` or `~`.
    Rejected,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The editing session.
#[derive(Debug)]
pub struct Editor {
    buffer: TextBuffer,
    cursor: Position,
    selection: Selection,
    session: FormattingSession,
    history: History,
    modified: bool,
    last_action: ActionKind,
    /// Split armed at the cursor by [`Editor::toggle_format`].
    pending_split: Option<FormatKind>,
}

impl Editor {
    /// An editor over a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::from_buffer(TextBuffer::new(), DEFAULT_MAX_DEPTH)
    }

    /// An editor over the given lines with the default history depth.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_buffer(TextBuffer::from_lines(lines), DEFAULT_MAX_DEPTH)
    }

    /// An editor over an existing buffer, keeping at most `history_depth`
    /// undo entries. The cursor starts at the top.
    #[must_use]
    pub const fn from_buffer(buffer: TextBuffer, history_depth: usize) -> Self {
        Self {
            buffer,
            cursor: Position::ZERO,
            selection: Selection::new(),
            session: FormattingSession::new(),
            history: History::with_max_depth(history_depth),
            modified: false,
            last_action: ActionKind::Manual,
            pending_split: None,
        }
    }

    // -- Queries ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// True when `pos` lies inside the active selection.
    #[must_use]
    pub fn is_selected(&self, pos: Position) -> bool {
        self.selection.is_position_selected(pos)
    }

    #[inline]
    #[must_use]
    pub const fn session(&self) -> &FormattingSession {
        &self.session
    }

    /// Formats whose content contains the cursor. An armed split's kind is
    /// left out, since text typed next will not carry it.
    #[must_use]
    pub fn formats_at_cursor(&self) -> FormatSet {
        let mut set = marker::formats_at(self.buffer.line(self.cursor.line), self.cursor.col);
        if let Some(kind) = self.pending_split {
            set.remove(kind.flag());
        }
        set
    }

    /// The kind whose region the next typed text will split, if armed.
    #[inline]
    #[must_use]
    pub const fn pending_split(&self) -> Option<FormatKind> {
        self.pending_split
    }

    /// Sticky toggles plus the formats at the cursor; what the status line
    /// shows as active.
    #[must_use]
    pub fn active_formats(&self) -> FormatSet {
        self.session.active() | self.formats_at_cursor()
    }

    /// True when the buffer changed since creation or the last
    /// [`mark_saved`](Self::mark_saved).
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -- Grouping -----------------------------------------------------------

    /// Start an edit of `kind`, opening a new history entry unless it
    /// continues a run of the same grouping kind.
    fn begin(&mut self, kind: ActionKind) {
        if kind != ActionKind::Typing {
            self.pending_split = None;
        }
        let continues = kind.groups()
            && kind == self.last_action
            && self.history.has_pending()
            && !self.selection.is_active();
        if !continues {
            self.history.save_state(&self.buffer, self.cursor);
        }
        self.last_action = kind;
    }

    /// End any run of edits without starting a new one.
    fn settle(&mut self) {
        self.pending_split = None;
        self.history.commit_pending(&self.buffer, self.cursor);
        self.last_action = ActionKind::Motion;
    }

    /// Force an undo boundary here.
    pub fn save_state(&mut self) {
        self.history.save_state(&self.buffer, self.cursor);
        self.last_action = ActionKind::Manual;
    }

    // -- Motion -------------------------------------------------------------

    /// Move the cursor, extending the selection when `extend` is set and
    /// dropping it otherwise.
    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        self.settle();
        if extend && !self.selection.is_active() {
            self.selection.start(self.cursor);
        }
        self.cursor = cursor::apply(motion, &self.buffer, self.cursor, extend);
        if extend {
            self.selection.update(self.cursor);
        } else {
            self.selection.clear();
        }
    }

    /// Put the cursor at `pos` (clamped into the buffer) and drop the
    /// selection.
    pub fn set_cursor(&mut self, pos: Position) {
        self.settle();
        self.selection.clear();
        self.cursor = self.buffer.clamp_position(pos);
    }

    // -- Selection ----------------------------------------------------------

    /// Select the whole buffer; the cursor goes to the end.
    pub fn select_all(&mut self) {
        self.settle();
        self.cursor = self.selection.select_all(&self.buffer);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The selected text, if a non-empty selection is active.
    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        self.selection
            .non_empty_range()
            .map(|range| self.buffer.text_in(range))
    }

    /// Delete the selection as one undo step. Returns `false` when nothing
    /// was selected.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.non_empty_range().is_none() {
            self.selection.clear();
            return false;
        }
        self.begin(ActionKind::Delete);
        self.remove_selected();
        true
    }

    /// Take the selected text out of the buffer.
    pub fn cut(&mut self) -> Option<String> {
        let text = self.selected_text()?;
        self.delete_selection();
        Some(text)
    }

    /// Delete the selection, if any, inside an edit that has already begun.
    fn remove_selected(&mut self) {
        if let Some(pos) = self.selection.delete_selected(&mut self.buffer) {
            self.cursor = pos;
            self.modified = true;
        }
    }

    // -- Insertion ----------------------------------------------------------

    /// Type one character. `'\n'` starts a new line.
    ///
    /// An active selection is replaced. With sticky formatting on, an
    /// opening+closing pair is inserted first unless the cursor is already
    /// inside a region.
    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        self.begin(ActionKind::Typing);
        self.remove_selected();
        let pos = self.open_split(ch, ch);
        let pos = self.session.insert_formatting_markers(&mut self.buffer, pos);
        self.cursor = self.buffer.insert_char(pos, ch);
        self.modified = true;
    }

    /// Type a run of text, grouped with surrounding typing. Multi-line text
    /// is merged into the line at the cursor; with sticky formatting on,
    /// each of its lines is wrapped separately.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.begin(ActionKind::Typing);
        self.remove_selected();
        if let (Some(first), Some(last)) = (text.chars().next(), text.chars().next_back()) {
            self.cursor = self.open_split(first, last);
        }

        let line = self.buffer.line(self.cursor.line);
        let multi_line = text.contains(['\n', '\r']);
        if multi_line && !marker::is_inside_marker(line, self.cursor.col) {
            let wrapped = self.session.wrap_text(text);
            self.cursor = self.buffer.insert_str(self.cursor, &wrapped);
        } else {
            let pos = if multi_line {
                self.cursor
            } else {
                self.session
                    .insert_formatting_markers(&mut self.buffer, self.cursor)
            };
            self.cursor = self.buffer.insert_str(pos, text);
        }
        self.modified = true;
    }

    /// Carry out an armed split ahead of text running from `first` to
    /// `last`, returning where the text goes. Text that starts or ends with
    /// the kind's own symbol is typed into the region unsplit.
    fn open_split(&mut self, first: char, last: char) -> Position {
        let Some(kind) = self.pending_split.take() else {
            return self.cursor;
        };
        let touches = kind
            .symbol()
            .is_some_and(|sym| first == char::from(sym) || last == char::from(sym));
        if touches {
            return self.cursor;
        }
        format::split_formatting_at_cursor(&mut self.buffer, self.cursor, kind)
            .unwrap_or(self.cursor)
    }

    /// Insert text literally as its own undo step, replacing the selection.
    /// Sticky formatting is not applied to pasted text.
    pub fn paste(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.begin(ActionKind::Paste);
        self.remove_selected();
        self.cursor = self.buffer.insert_str(self.cursor, text);
        self.modified = true;
    }

    /// Split the line at the cursor.
    pub fn insert_newline(&mut self) {
        self.begin(ActionKind::Newline);
        self.remove_selected();
        self.cursor = self.buffer.split_line(self.cursor);
        self.modified = true;
    }

    /// Insert a literal tab.
    pub fn insert_tab(&mut self) {
        self.begin(ActionKind::Indent);
        self.remove_selected();
        self.cursor = self.buffer.insert_char(self.cursor, '\t');
        self.modified = true;
    }

    /// Remove one leading tab from the cursor line. Returns `false` when the
    /// line does not start with one.
    pub fn unindent(&mut self) -> bool {
        let line = self.cursor.line;
        if !self.buffer.line(line).starts_with('\t') {
            return false;
        }
        self.begin(ActionKind::Indent);
        self.selection.clear();
        self.buffer.delete_range(Range::new(
            Position::new(line, 0),
            Position::new(line, 1),
        ));
        self.cursor.col = self.cursor.col.saturating_sub(1);
        self.modified = true;
        true
    }

    /// Open an empty line above the cursor line and move onto it.
    pub fn open_line_above(&mut self) {
        self.begin(ActionKind::OpenLine);
        self.selection.clear();
        let line = self.cursor.line;
        self.buffer.insert_line(line, "");
        self.cursor = Position::new(line, 0);
        self.modified = true;
    }

    /// Open an empty line below the cursor line and move onto it.
    pub fn open_line_below(&mut self) {
        self.begin(ActionKind::OpenLine);
        self.selection.clear();
        let line = self.cursor.line + 1;
        self.buffer.insert_line(line, "");
        self.cursor = Position::new(line, 0);
        self.modified = true;
    }

    // -- Deletion -----------------------------------------------------------

    /// Delete the selection, or the character before the cursor (joining
    /// with the previous line at column 0). Returns `false` at the start of
    /// the buffer.
    pub fn backspace(&mut self) -> bool {
        if self.selection.non_empty_range().is_some() {
            return self.delete_selection();
        }
        self.selection.clear();
        if self.cursor.is_zero() {
            return false;
        }
        self.begin(ActionKind::Backspace);
        self.cursor = self.buffer.delete_backward(self.cursor);
        self.modified = true;
        true
    }

    /// Delete the selection, or the character under the cursor (joining the
    /// next line at end of line). Returns `false` at the end of the buffer.
    pub fn delete_forward(&mut self) -> bool {
        if self.selection.non_empty_range().is_some() {
            return self.delete_selection();
        }
        self.selection.clear();
        if self.cursor == self.buffer.end() {
            return false;
        }
        self.begin(ActionKind::DeleteForward);
        let removed = self.buffer.delete_forward(self.cursor);
        self.modified |= removed;
        removed
    }

    // -- Formatting ---------------------------------------------------------

    /// Toggle one formatting kind for the selection or at the cursor.
    ///
    /// With a non-empty selection (after widening it over any marker it
    /// cuts), the selected text is stripped and rewrapped with `kind`
    /// flipped, and the result is re-selected. Without one, a cursor at the
    /// edge of a `kind` region steps outside it, a cursor strictly inside
    /// arms a split, and anywhere else the sticky toggle flips.
    pub fn toggle_format(&mut self, kind: FormatKind) -> FormatOutcome {
        if self.pending_split.take() == Some(kind) {
            return FormatOutcome::SplitCancelled(kind);
        }
        if self.selection.is_active() {
            self.selection.adjust_for_formatting(&self.buffer);
            if let Some(range) = self.selection.non_empty_range() {
                return self.format_range(range, kind);
            }
        }

        let line = self.buffer.line(self.cursor.line);
        let col = self.cursor.col;
        if marker::straddles_tag(line, col) {
            return FormatOutcome::Rejected;
        }
        let Some(region) = marker::marker_at(line, col, kind) else {
            return FormatOutcome::Toggled(self.session.toggle(kind));
        };

        if col == region.content_end || col == region.content_start {
            let to = if col == region.content_end {
                region.end
            } else {
                region.start
            };
            self.settle();
            self.selection.clear();
            self.cursor = self.cursor.with_col(to);
            self.session.set(kind, false);
            return FormatOutcome::SteppedOut(kind);
        }

        if !format::can_split_at(line, col, kind) {
            return FormatOutcome::Rejected;
        }
        self.settle();
        self.selection.clear();
        self.pending_split = Some(kind);
        FormatOutcome::Split(kind)
    }

    fn format_range(&mut self, range: Range, kind: FormatKind) -> FormatOutcome {
        if marker::straddles_tag(self.buffer.line(range.start.line), range.start.col)
            || marker::straddles_tag(self.buffer.line(range.end.line), range.end.col)
        {
            return FormatOutcome::Rejected;
        }

        let extracted = format::extract_formatting_from_text(&self.buffer.text_in(range));
        let target = extracted.formats ^ kind.flag();
        let rebuilt = format::wrap_in(target, &extracted.plain_text);

        self.begin(ActionKind::Format);
        let start = self.buffer.delete_range(range);
        let end = self.buffer.insert_str(start, &rebuilt);
        self.selection.start(start);
        self.selection.update(end);
        self.cursor = end;
        self.modified = true;

        if target.has(kind) {
            FormatOutcome::Applied(kind)
        } else {
            FormatOutcome::Removed(kind)
        }
    }

    // -- History ------------------------------------------------------------

    /// Undo the last edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.selection.clear();
        self.pending_split = None;
        self.last_action = ActionKind::Undo;
        let Some(pos) = self.history.undo(&mut self.buffer, self.cursor) else {
            return false;
        };
        self.cursor = self.buffer.clamp_position(pos);
        self.modified = true;
        true
    }

    /// Redo the last undone edit. Returns `false` when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        self.selection.clear();
        self.pending_split = None;
        self.last_action = ActionKind::Redo;
        let Some(pos) = self.history.redo(&mut self.buffer, self.cursor) else {
            return false;
        };
        self.cursor = self.buffer.clamp_position(pos);
        self.modified = true;
        true
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
