//! Text buffer — the fundamental unit of text storage.
//!
//! A `TextBuffer` is an ordered vector of lines, each a `String` without its
//! line terminator. Notes are small and edited a line at a time, and the
//! inline formatting markers are parsed per line, so a plain line vector
//! keeps every operation a direct `String` edit.
//!
//! # Design choices
//!
//! - **Never empty.** A buffer always holds at least one (possibly empty)
//!   line. Every constructor and every removal path restores that.
//!
//! - **Columns are byte offsets** on character boundaries. Editing methods
//!   trust the caller on that point; out-of-range positions are a contract
//!   violation and panic like slice indexing would.
//!
//! - **No undo/redo here.** [`crate::history::History`] snapshots and
//!   restores line ranges through [`TextBuffer::replace_lines`].

use std::fmt;

use crate::position::{Position, Range};
use crate::utf8;

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// Split text into line segments on `\n`, `\r\n` and lone `\r`.
///
/// Always yields at least one segment; a trailing break yields a final empty
/// segment, so `"a\n"` is `["a", ""]`. This is the shape inserted text needs:
/// the last segment merges with whatever followed the insertion point.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                segments.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                segments.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    segments.push(&text[start..]);
    segments
}

// ---------------------------------------------------------------------------
// TextBuffer
// ---------------------------------------------------------------------------

/// An ordered, never-empty sequence of lines.
#[derive(Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    // -- Construction -------------------------------------------------------

    /// A buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from already-split lines. An empty input yields one
    /// empty line.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { lines }
    }

    /// Build a buffer by splitting text on line breaks (see [`split_lines`]).
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(split_lines(text))
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    /// The text of one line.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[inline]
    #[must_use]
    pub fn line(&self, idx: usize) -> &str {
        &self.lines[idx]
    }

    /// Byte length of one line.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[inline]
    #[must_use]
    pub fn line_len(&self, idx: usize) -> usize {
        self.lines[idx].len()
    }

    /// All lines, in order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The position just past the last character of the buffer.
    #[must_use]
    pub fn end(&self) -> Position {
        let last = self.last_line();
        Position::new(last, self.lines[last].len())
    }

    /// True when the buffer is a single empty line.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// The full text, lines joined with `\n` and no trailing break.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// The text covered by `range`, lines joined with `\n`.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is out of range.
    #[must_use]
    pub fn text_in(&self, range: Range) -> String {
        let Range { start, end } = range;
        if start.line == end.line {
            return self.lines[start.line][start.col..end.col].to_string();
        }

        let mut out = String::from(&self.lines[start.line][start.col..]);
        for line in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(&self.lines[end.line][..end.col]);
        out
    }

    /// Clamp a position into the buffer: line to the last line, column to
    /// the line length and then down to a character boundary.
    #[must_use]
    pub fn clamp_position(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        let col = utf8::floor_boundary(&self.lines[line], pos.col);
        Position::new(line, col)
    }

    // -- Editing ------------------------------------------------------------

    /// Insert text at a position and return the position just after it.
    ///
    /// Multi-line text is merged the way typing it would: the first segment
    /// joins the line at `pos`, middle segments become new lines, and the
    /// last segment is followed by the remainder of the original line.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range or not on a character boundary.
    pub fn insert_str(&mut self, pos: Position, text: &str) -> Position {
        let segments = split_lines(text);
        if let [single] = segments.as_slice() {
            self.lines[pos.line].insert_str(pos.col, single);
            return pos.with_col(pos.col + single.len());
        }

        let tail = self.lines[pos.line].split_off(pos.col);
        self.lines[pos.line].push_str(segments[0]);

        let last = segments[segments.len() - 1];
        let mut new_lines: Vec<String> = segments[1..segments.len() - 1]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let mut last_line = String::with_capacity(last.len() + tail.len());
        last_line.push_str(last);
        last_line.push_str(&tail);
        new_lines.push(last_line);

        let end_line = pos.line + new_lines.len();
        self.lines.splice(pos.line + 1..pos.line + 1, new_lines);
        Position::new(end_line, last.len())
    }

    /// Insert one character and return the position after it. `'\n'` splits
    /// the line.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range or not on a character boundary.
    pub fn insert_char(&mut self, pos: Position, ch: char) -> Position {
        if ch == '\n' {
            return self.split_line(pos);
        }
        self.lines[pos.line].insert(pos.col, ch);
        pos.with_col(pos.col + ch.len_utf8())
    }

    /// Break the line at `pos`; the remainder moves to a new line below.
    /// Returns the start of the new line.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range or not on a character boundary.
    pub fn split_line(&mut self, pos: Position) -> Position {
        let tail = self.lines[pos.line].split_off(pos.col);
        self.lines.insert(pos.line + 1, tail);
        Position::new(pos.line + 1, 0)
    }

    /// Insert a whole line at index `idx` (which may equal the line count).
    ///
    /// # Panics
    ///
    /// Panics if `idx > line_count()`.
    pub fn insert_line(&mut self, idx: usize, text: impl Into<String>) {
        self.lines.insert(idx, text.into());
    }

    /// Delete the character before `pos`, joining with the previous line at
    /// column 0. Returns the new cursor position; a no-op at the buffer
    /// start.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    pub fn delete_backward(&mut self, pos: Position) -> Position {
        if pos.col > 0 {
            let prev = utf8::prev_boundary(&self.lines[pos.line], pos.col);
            self.lines[pos.line].drain(prev..pos.col);
            return pos.with_col(prev);
        }
        if pos.line == 0 {
            return pos;
        }
        let removed = self.lines.remove(pos.line);
        let above = &mut self.lines[pos.line - 1];
        let join = above.len();
        above.push_str(&removed);
        Position::new(pos.line - 1, join)
    }

    /// Delete the character at `pos`, joining the next line at end of line.
    /// Returns `true` when something was removed.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    pub fn delete_forward(&mut self, pos: Position) -> bool {
        let len = self.lines[pos.line].len();
        if pos.col < len {
            let next = utf8::next_boundary(&self.lines[pos.line], pos.col);
            self.lines[pos.line].drain(pos.col..next);
            return true;
        }
        if pos.line + 1 >= self.lines.len() {
            return false;
        }
        let removed = self.lines.remove(pos.line + 1);
        self.lines[pos.line].push_str(&removed);
        true
    }

    /// Delete the text in a range and return its start. A multi-line range
    /// joins the unselected head of the first line with the tail of the last
    /// and drops the lines between.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is out of range.
    pub fn delete_range(&mut self, range: Range) -> Position {
        let Range { start, end } = range;
        if range.is_empty() {
            return start;
        }
        if start.line == end.line {
            self.lines[start.line].drain(start.col..end.col);
            return start;
        }

        let tail = self.lines[end.line][end.col..].to_string();
        self.lines[start.line].truncate(start.col);
        self.lines[start.line].push_str(&tail);
        self.lines.drain(start.line + 1..=end.line);
        start
    }

    /// Replace `count` lines starting at `start` with `new_lines`.
    ///
    /// This is the primitive undo/redo uses to swap a changed line range.
    /// If the result would be empty, a single empty line is kept.
    ///
    /// # Panics
    ///
    /// Panics if `start + count` exceeds the line count.
    pub fn replace_lines(&mut self, start: usize, count: usize, new_lines: &[String]) {
        self.lines
            .splice(start..start + count, new_lines.iter().cloned());
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("lines", &self.lines)
            .finish()
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

    fn lines(b: &TextBuffer) -> Vec<&str> {
        b.lines().iter().map(String::as_str).collect()
    }

    // -- split_lines --------------------------------------------------------

    #[test]
    fn split_lines_handles_all_breaks() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn split_lines_trailing_break_yields_empty_segment() {
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_buffer_has_one_empty_line() {
        let b = TextBuffer::new();
        assert_eq!(b.line_count(), 1);
        assert!(b.is_blank());
        assert_eq!(b.end(), Position::ZERO);
    }

    #[test]
    fn from_lines_empty_input_is_not_empty() {
        let b = TextBuffer::from_lines(Vec::<String>::new());
        assert_eq!(lines(&b), vec![""]);
    }

    #[test]
    fn from_text_splits() {
        let b = TextBuffer::from_text("one\ntwo");
        assert_eq!(lines(&b), vec!["one", "two"]);
        assert_eq!(b.contents(), "one\ntwo");
    }

    // -- insert_str ---------------------------------------------------------

    #[test]
    fn insert_single_line_text() {
        let mut b = buf(&["hello world"]);
        let end = b.insert_str(Position::new(0, 5), " there");
        assert_eq!(lines(&b), vec!["hello there world"]);
        assert_eq!(end, Position::new(0, 11));
    }

    #[test]
    fn insert_multi_line_text_merges_first_and_last() {
        let mut b = buf(&["abXYZ", "next"]);
        let end = b.insert_str(Position::new(0, 2), "1\n2\n3");
        assert_eq!(lines(&b), vec!["ab1", "2", "3XYZ", "next"]);
        assert_eq!(end, Position::new(2, 1));
    }

    #[test]
    fn insert_text_ending_in_newline() {
        let mut b = buf(&["ab"]);
        let end = b.insert_str(Position::new(0, 1), "x\n");
        assert_eq!(lines(&b), vec!["ax", "b"]);
        assert_eq!(end, Position::new(1, 0));
    }

    #[test]
    fn insert_char_multibyte_advances_by_its_length() {
        let mut b = buf(&["ab"]);
        let end = b.insert_char(Position::new(0, 1), 'é');
        assert_eq!(lines(&b), vec!["aéb"]);
        assert_eq!(end, Position::new(0, 3));
    }

    #[test]
    fn insert_char_newline_splits() {
        let mut b = buf(&["abcd"]);
        let end = b.insert_char(Position::new(0, 2), '\n');
        assert_eq!(lines(&b), vec!["ab", "cd"]);
        assert_eq!(end, Position::new(1, 0));
    }

    // -- Deletion -----------------------------------------------------------

    #[test]
    fn delete_backward_removes_whole_character() {
        let mut b = buf(&["a€b"]);
        let pos = b.delete_backward(Position::new(0, 4));
        assert_eq!(lines(&b), vec!["ab"]);
        assert_eq!(pos, Position::new(0, 1));
    }

    #[test]
    fn delete_backward_at_col_zero_joins_lines() {
        let mut b = buf(&["one", "two"]);
        let pos = b.delete_backward(Position::new(1, 0));
        assert_eq!(lines(&b), vec!["onetwo"]);
        assert_eq!(pos, Position::new(0, 3));
    }

    #[test]
    fn delete_backward_at_buffer_start_is_noop() {
        let mut b = buf(&["x"]);
        assert_eq!(b.delete_backward(Position::ZERO), Position::ZERO);
        assert_eq!(lines(&b), vec!["x"]);
    }

    #[test]
    fn delete_forward_joins_next_line() {
        let mut b = buf(&["ab", "cd"]);
        assert!(b.delete_forward(Position::new(0, 2)));
        assert_eq!(lines(&b), vec!["abcd"]);
        assert!(!b.delete_forward(Position::new(0, 4)));
    }

    #[test]
    fn delete_range_single_line() {
        let mut b = buf(&["hello world"]);
        let pos = b.delete_range(Range::new(Position::new(0, 5), Position::new(0, 11)));
        assert_eq!(lines(&b), vec!["hello"]);
        assert_eq!(pos, Position::new(0, 5));
    }

    #[test]
    fn delete_range_multi_line_joins_ends() {
        let mut b = buf(&["abc", "middle", "xyz"]);
        let pos = b.delete_range(Range::new(Position::new(0, 1), Position::new(2, 2)));
        assert_eq!(lines(&b), vec!["az"]);
        assert_eq!(pos, Position::new(0, 1));
    }

    #[test]
    fn delete_everything_leaves_one_empty_line() {
        let mut b = buf(&["a", "b", "c"]);
        let pos = b.delete_range(Range::new(Position::ZERO, b.end()));
        assert_eq!(lines(&b), vec![""]);
        assert_eq!(pos, Position::ZERO);
    }

    // -- text_in ------------------------------------------------------------

    #[test]
    fn text_in_spans_lines() {
        let b = buf(&["abc", "def", "ghi"]);
        let r = Range::new(Position::new(0, 1), Position::new(2, 2));
        assert_eq!(b.text_in(r), "bc\ndef\ngh");
    }

    // -- replace_lines ------------------------------------------------------

    #[test]
    fn replace_lines_swaps_range() {
        let mut b = buf(&["a", "b", "c"]);
        b.replace_lines(1, 1, &["x".to_string(), "y".to_string()]);
        assert_eq!(lines(&b), vec!["a", "x", "y", "c"]);
    }

    #[test]
    fn replace_lines_never_leaves_buffer_empty() {
        let mut b = buf(&["only"]);
        b.replace_lines(0, 1, &[]);
        assert_eq!(lines(&b), vec![""]);
    }

    // -- Clamping -----------------------------------------------------------

    #[test]
    fn clamp_position_rounds_to_boundary() {
        let b = buf(&["hé", "x"]);
        assert_eq!(b.clamp_position(Position::new(0, 2)), Position::new(0, 1));
        assert_eq!(b.clamp_position(Position::new(9, 9)), Position::new(1, 1));
    }
}
