//! Selection — an anchor and a head over a [`TextBuffer`].
//!
//! The anchor stays where the selection started; the head follows the
//! cursor. Either may come first in the text, so every bound computation
//! goes through [`Range::ordered`].
//!
//! [`Selection::adjust_for_formatting`] widens a single-line selection so it
//! fully encloses every formatting marker it touches. Formatting toggles run
//! it first, which is what keeps a toggle from splitting a marker pair.

use crate::buffer::TextBuffer;
use crate::marker;
use crate::position::{Position, Range};

/// An optional anchor/head selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    ends: Option<(Position, Position)>,
}

impl Selection {
    /// An inactive selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { ends: None }
    }

    // -- State --------------------------------------------------------------

    /// Start selecting at `pos` (anchor and head both at `pos`).
    pub const fn start(&mut self, pos: Position) {
        self.ends = Some((pos, pos));
    }

    /// Move the head. Does nothing when no selection is active.
    pub const fn update(&mut self, pos: Position) {
        if let Some((anchor, _)) = self.ends {
            self.ends = Some((anchor, pos));
        }
    }

    /// Drop the selection. Idempotent.
    pub const fn clear(&mut self) {
        self.ends = None;
    }

    /// True when a selection has been started and not cleared.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.ends.is_some()
    }

    /// The anchor, if active.
    #[must_use]
    pub fn anchor(&self) -> Option<Position> {
        self.ends.map(|(anchor, _)| anchor)
    }

    /// The head, if active.
    #[must_use]
    pub fn head(&self) -> Option<Position> {
        self.ends.map(|(_, head)| head)
    }

    /// The normalized range, if active.
    #[must_use]
    pub fn range(&self) -> Option<Range> {
        self.ends.map(|(anchor, head)| Range::ordered(anchor, head))
    }

    /// The normalized range, if active and non-empty.
    #[must_use]
    pub fn non_empty_range(&self) -> Option<Range> {
        self.range().filter(|r| !r.is_empty())
    }

    // -- Queries ------------------------------------------------------------

    /// True when `pos` is selected.
    ///
    /// On a single line that is `start.col <= col < end.col`. Across lines
    /// the first line is selected from `start.col` to its end, interior
    /// lines entirely, and the last line up to `end.col`; that is exactly
    /// the half-open range `[start, end)` in position order.
    #[must_use]
    pub fn is_position_selected(&self, pos: Position) -> bool {
        self.range().is_some_and(|r| r.contains(pos))
    }

    /// The selected text with lines joined by `\n`. Empty when inactive.
    #[must_use]
    pub fn selected_text(&self, buf: &TextBuffer) -> String {
        self.range()
            .map(|r| buf.text_in(r))
            .unwrap_or_default()
    }

    // -- Editing ------------------------------------------------------------

    /// Delete the selected text and clear the selection.
    ///
    /// Returns the cursor position at the join point, or `None` (buffer
    /// untouched) when no selection is active.
    pub fn delete_selected(&mut self, buf: &mut TextBuffer) -> Option<Position> {
        let range = self.range()?;
        self.clear();
        Some(buf.delete_range(range))
    }

    /// Select the whole buffer and return the head (the buffer end).
    pub fn select_all(&mut self, buf: &TextBuffer) -> Position {
        let end = buf.end();
        self.ends = Some((Position::ZERO, end));
        end
    }

    /// Widen a single-line selection to fully enclose every marker it
    /// overlaps, repeating until stable since enclosing one marker can
    /// newly overlap another. The anchor/head orientation is preserved.
    ///
    /// Returns `true` when the selection changed. Multi-line and empty
    /// selections are left alone.
    pub fn adjust_for_formatting(&mut self, buf: &TextBuffer) -> bool {
        let Some((anchor, head)) = self.ends else {
            return false;
        };
        let range = Range::ordered(anchor, head);
        if !range.is_single_line() || range.is_empty() {
            return false;
        }

        let markers = marker::parse_markers(buf.line(range.start.line));
        let (mut from, mut to) = (range.start.col, range.end.col);
        loop {
            let (old_from, old_to) = (from, to);
            for m in &markers {
                if m.overlaps(from, to) {
                    from = from.min(m.start);
                    to = to.max(m.end);
                }
            }
            if (from, to) == (old_from, old_to) {
                break;
            }
        }
        if (from, to) == (range.start.col, range.end.col) {
            return false;
        }

        let line = range.start.line;
        let (lo, hi) = (Position::new(line, from), Position::new(line, to));
        self.ends = Some(if anchor <= head { (lo, hi) } else { (hi, lo) });
        true
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

    fn selected(anchor: Position, head: Position) -> Selection {
        let mut s = Selection::new();
        s.start(anchor);
        s.update(head);
        s
    }

    // -- State --------------------------------------------------------------

    #[test]
    fn update_without_start_is_noop() {
        let mut s = Selection::new();
        s.update(p(0, 3));
        assert!(!s.is_active());
        assert_eq!(s.range(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut once = selected(p(0, 0), p(0, 2));
        once.clear();
        let mut twice = once;
        twice.clear();
        assert_eq!(once, twice);
        assert!(!twice.is_active());
    }

    #[test]
    fn range_is_normalized() {
        let s = selected(p(2, 1), p(0, 4));
        assert_eq!(s.range(), Some(Range::new(p(0, 4), p(2, 1))));
        assert_eq!(s.anchor(), Some(p(2, 1)));
        assert_eq!(s.head(), Some(p(0, 4)));
    }

    // -- Membership ---------------------------------------------------------

    #[test]
    fn single_line_membership_is_half_open() {
        let s = selected(p(0, 4), p(0, 1));
        assert!(!s.is_position_selected(p(0, 0)));
        assert!(s.is_position_selected(p(0, 1)));
        assert!(s.is_position_selected(p(0, 3)));
        assert!(!s.is_position_selected(p(0, 4)));
    }

    #[test]
    fn multi_line_membership() {
        let s = selected(p(0, 2), p(2, 1));
        assert!(!s.is_position_selected(p(0, 1)));
        assert!(s.is_position_selected(p(0, 2)));
        assert!(s.is_position_selected(p(0, 99)));
        assert!(s.is_position_selected(p(1, 0)));
        assert!(s.is_position_selected(p(2, 0)));
        assert!(!s.is_position_selected(p(2, 1)));
    }

    #[test]
    fn inactive_selects_nothing() {
        assert!(!Selection::new().is_position_selected(p(0, 0)));
    }

    // -- Text ---------------------------------------------------------------

    #[test]
    fn selected_text_joins_lines() {
        let b = buf(&["hello", "big", "world"]);
        let s = selected(p(2, 3), p(0, 3));
        assert_eq!(s.selected_text(&b), "lo\nbig\nwor");
        assert_eq!(Selection::new().selected_text(&b), "");
    }

    #[test]
    fn delete_single_line() {
        let mut b = buf(&["hello world"]);
        let mut s = selected(p(0, 5), p(0, 11));
        assert_eq!(s.delete_selected(&mut b), Some(p(0, 5)));
        assert_eq!(b.lines(), ["hello"]);
        assert!(!s.is_active());
    }

    #[test]
    fn delete_multi_line_joins_remainders() {
        let mut b = buf(&["keep this", "gone", "and that"]);
        let mut s = selected(p(0, 5), p(2, 4));
        assert_eq!(s.delete_selected(&mut b), Some(p(0, 5)));
        assert_eq!(b.lines(), ["keep that"]);
    }

    #[test]
    fn select_all_then_delete_leaves_empty_line() {
        let mut b = buf(&["a", "b", "c"]);
        let mut s = Selection::new();
        assert_eq!(s.select_all(&b), p(2, 1));
        assert_eq!(s.delete_selected(&mut b), Some(p(0, 0)));
        assert_eq!(b.lines(), [""]);
    }

    #[test]
    fn delete_inactive_is_noop() {
        let mut b = buf(&["abc"]);
        assert_eq!(Selection::new().delete_selected(&mut b), None);
        assert_eq!(b.lines(), ["abc"]);
    }

    // -- Formatting adjustment ----------------------------------------------

    #[test]
    fn adjust_expands_to_overlapping_marker() {
        let b = buf(&["say **hello** now"]);
        let mut s = selected(p(0, 7), p(0, 9));
        assert!(s.adjust_for_formatting(&b));
        assert_eq!(s.range(), Some(Range::new(p(0, 4), p(0, 13))));
    }

    #[test]
    fn adjust_cascades_through_crossing_markers() {
        // Enclosing the italic pulls in the bold it crosses.
        let b = buf(&["*a **b* c**"]);
        let mut s = selected(p(0, 1), p(0, 0));
        assert!(s.adjust_for_formatting(&b));
        assert_eq!(s.range(), Some(Range::new(p(0, 0), p(0, 11))));
        // Orientation kept: the anchor is still the right end.
        assert_eq!(s.anchor(), Some(p(0, 11)));
    }

    #[test]
    fn adjust_leaves_boundaries_outside_delimiters() {
        let b = buf(&["x ~~strike~~ <u>under</u> y"]);
        let line = b.line(0);
        for from in 0..line.len() {
            for to in from + 1..=line.len() {
                let mut s = selected(p(0, from), p(0, to));
                s.adjust_for_formatting(&b);
                let r = s.range().unwrap();
                assert_eq!(marker::delimiter_around(line, r.start.col), None, "{from}..{to}");
                assert_eq!(marker::delimiter_around(line, r.end.col), None, "{from}..{to}");
            }
        }
    }

    #[test]
    fn adjust_ignores_multi_line_and_untouched_selections() {
        let b = buf(&["**a**", "**b**"]);
        let mut multi = selected(p(0, 3), p(1, 1));
        assert!(!multi.adjust_for_formatting(&b));
        assert_eq!(multi.range(), Some(Range::new(p(0, 3), p(1, 1))));

        let b = buf(&["plain **b**"]);
        let mut clear = selected(p(0, 0), p(0, 5));
        assert!(!clear.adjust_for_formatting(&b));
    }
}
