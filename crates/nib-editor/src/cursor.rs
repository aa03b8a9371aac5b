//! Cursor motions — UTF-8 safe movement over a [`TextBuffer`].
//!
//! Every motion is a free function taking the buffer, the current position
//! and an `extend` flag, and returning the new position. Motions never touch
//! the selection: the caller uses `extend` to decide whether to update or
//! clear it afterwards (see [`crate::editor::Editor::move_cursor`]).
//!
//! # Boundaries
//!
//! Horizontal steps move by one encoded character via [`crate::utf8`], so
//! the column always lands on a character boundary. Moves past the first or
//! last position of the buffer are no-ops.
//!
//! # Delimiter skipping
//!
//! When not extending a selection, a motion that would leave the cursor
//! strictly inside a formatting delimiter (between the two `*` of `**`, or
//! inside `<u>`) carries on to the delimiter's edge in the direction of
//! travel. Typed text then never lands between delimiter characters.
//! Extending motions stay character-precise.

use crate::buffer::TextBuffer;
use crate::marker;
use crate::position::Position;
use crate::utf8;

/// A cursor motion, one per movement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
    Home,
    End,
}

/// Which way a motion travels, for delimiter skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

/// Apply a motion.
#[must_use]
pub fn apply(motion: Motion, buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    match motion {
        Motion::Left => move_left(buf, pos, extend),
        Motion::Right => move_right(buf, pos, extend),
        Motion::Up => move_up(buf, pos, extend),
        Motion::Down => move_down(buf, pos, extend),
        Motion::WordLeft => move_word_left(buf, pos, extend),
        Motion::WordRight => move_word_right(buf, pos, extend),
        Motion::Home => move_home(buf, pos, extend),
        Motion::End => move_end(buf, pos, extend),
    }
}

// -- Horizontal -------------------------------------------------------------

/// One character left, wrapping to the end of the previous line.
#[must_use]
pub fn move_left(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    debug_assert!(pos.line < buf.line_count());
    let next = if pos.col > 0 {
        pos.with_col(utf8::prev_boundary(buf.line(pos.line), pos.col))
    } else if pos.line > 0 {
        Position::new(pos.line - 1, buf.line_len(pos.line - 1))
    } else {
        return pos;
    };
    settle(buf, next, extend, Direction::Backward)
}

/// One character right, wrapping to the start of the next line.
#[must_use]
pub fn move_right(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    debug_assert!(pos.line < buf.line_count());
    let line = buf.line(pos.line);
    let next = if pos.col < line.len() {
        pos.with_col(utf8::next_boundary(line, pos.col))
    } else if pos.line < buf.last_line() {
        Position::new(pos.line + 1, 0)
    } else {
        return pos;
    };
    settle(buf, next, extend, Direction::Forward)
}

// -- Vertical ---------------------------------------------------------------

/// One line up, clamping the column to the shorter line.
#[must_use]
pub fn move_up(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    if pos.line == 0 {
        return pos;
    }
    let next = buf.clamp_position(Position::new(pos.line - 1, pos.col));
    settle(buf, next, extend, Direction::Backward)
}

/// One line down, clamping the column to the shorter line.
#[must_use]
pub fn move_down(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    if pos.line >= buf.last_line() {
        return pos;
    }
    let next = buf.clamp_position(Position::new(pos.line + 1, pos.col));
    settle(buf, next, extend, Direction::Backward)
}

// -- Words ------------------------------------------------------------------

/// Back over non-word characters, then back over word characters. At
/// column 0 this wraps to the end of the previous line.
#[must_use]
pub fn move_word_left(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    if pos.col == 0 {
        return move_left(buf, pos, extend);
    }
    let line = buf.line(pos.line);
    let mut col = pos.col;
    while col > 0 && !utf8::is_word_byte(line, utf8::prev_boundary(line, col)) {
        col = utf8::prev_boundary(line, col);
    }
    while col > 0 && utf8::is_word_byte(line, utf8::prev_boundary(line, col)) {
        col = utf8::prev_boundary(line, col);
    }
    settle(buf, pos.with_col(col), extend, Direction::Backward)
}

/// Forward over non-word characters, then forward over word characters.
/// At end of line this wraps to the start of the next line.
#[must_use]
pub fn move_word_right(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    let line = buf.line(pos.line);
    if pos.col >= line.len() {
        return move_right(buf, pos, extend);
    }
    let mut col = pos.col;
    while col < line.len() && !utf8::is_word_byte(line, col) {
        col = utf8::next_boundary(line, col);
    }
    while col < line.len() && utf8::is_word_byte(line, col) {
        col = utf8::next_boundary(line, col);
    }
    settle(buf, pos.with_col(col), extend, Direction::Forward)
}

// -- Line edges -------------------------------------------------------------

/// Smart home: the first non-blank column, or column 0 when already there
/// or when the line is all blanks.
#[must_use]
pub fn move_home(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    let line = buf.line(pos.line);
    let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
    let col = if indent == line.len() || pos.col == indent {
        0
    } else {
        indent
    };
    settle(buf, pos.with_col(col), extend, Direction::Backward)
}

/// End of the current line.
#[must_use]
pub fn move_end(buf: &TextBuffer, pos: Position, extend: bool) -> Position {
    let next = pos.with_col(buf.line_len(pos.line));
    settle(buf, next, extend, Direction::Forward)
}

// -- Helpers ----------------------------------------------------------------

/// Step out of a delimiter when not extending a selection.
fn settle(buf: &TextBuffer, pos: Position, extend: bool, dir: Direction) -> Position {
    if extend {
        return pos;
    }
    match marker::delimiter_around(buf.line(pos.line), pos.col) {
        Some((start, _)) if dir == Direction::Backward => pos.with_col(start),
        Some((_, end)) => pos.with_col(end),
        None => pos,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_lines(lines.iter().copied())
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn left_twice_from_end() {
        let b = buf(&["ab"]);
        let pos = move_left(&b, p(0, 2), false);
        let pos = move_left(&b, pos, false);
        assert_eq!(pos, p(0, 0));
    }

    #[test]
    fn left_and_right_step_over_multibyte() {
        let b = buf(&["a日b"]);
        assert_eq!(move_right(&b, p(0, 1), false), p(0, 4));
        assert_eq!(move_left(&b, p(0, 4), false), p(0, 1));
    }

    #[test]
    fn horizontal_moves_wrap_lines() {
        let b = buf(&["ab", "cd"]);
        assert_eq!(move_left(&b, p(1, 0), false), p(0, 2));
        assert_eq!(move_right(&b, p(0, 2), false), p(1, 0));
    }

    #[test]
    fn horizontal_moves_stop_at_buffer_edges() {
        let b = buf(&["ab", "cd"]);
        assert_eq!(move_left(&b, p(0, 0), false), p(0, 0));
        assert_eq!(move_right(&b, p(1, 2), false), p(1, 2));
    }

    #[test]
    fn every_reachable_position_is_a_boundary() {
        let b = buf(&["é🦀x", "", "ñ **ü** 日"]);
        let mut pos = p(0, 0);
        for _ in 0..40 {
            pos = move_right(&b, pos, false);
            assert!(b.line(pos.line).is_char_boundary(pos.col), "{pos:?}");
        }
        assert_eq!(pos, b.end());
        for _ in 0..40 {
            pos = move_left(&b, pos, true);
            assert!(b.line(pos.line).is_char_boundary(pos.col), "{pos:?}");
        }
        assert_eq!(pos, p(0, 0));
    }

    // -- Delimiter skipping -------------------------------------------------

    #[test]
    fn right_skips_into_content_past_opening_delimiter() {
        let b = buf(&["**bold**"]);
        assert_eq!(move_right(&b, p(0, 0), false), p(0, 2));
    }

    #[test]
    fn left_skips_before_opening_delimiter() {
        let b = buf(&["**bold**"]);
        assert_eq!(move_left(&b, p(0, 2), false), p(0, 0));
    }

    #[test]
    fn right_skips_closing_underline_tag() {
        let b = buf(&["<u>x</u>!"]);
        assert_eq!(move_right(&b, p(0, 4), false), p(0, 8));
    }

    #[test]
    fn extending_moves_do_not_skip() {
        let b = buf(&["**bold**"]);
        assert_eq!(move_right(&b, p(0, 0), true), p(0, 1));
    }

    #[test]
    fn vertical_move_does_not_land_inside_delimiter() {
        let b = buf(&["abcdef", "x**y**"]);
        assert_eq!(move_down(&b, p(0, 2), false), p(1, 1));
        assert_eq!(move_down(&b, p(0, 2), true), p(1, 2));
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn vertical_moves_clamp_column() {
        let b = buf(&["long line", "ab", "long line"]);
        assert_eq!(move_down(&b, p(0, 7), false), p(1, 2));
        assert_eq!(move_up(&b, p(2, 7), false), p(1, 2));
    }

    #[test]
    fn vertical_clamp_respects_boundaries() {
        let b = buf(&["abc", "é"]);
        assert_eq!(move_down(&b, p(0, 1), false), p(1, 0));
    }

    #[test]
    fn vertical_moves_stop_at_edges() {
        let b = buf(&["a", "b"]);
        assert_eq!(move_up(&b, p(0, 1), false), p(0, 1));
        assert_eq!(move_down(&b, p(1, 0), false), p(1, 0));
    }

    // -- Words --------------------------------------------------------------

    #[test]
    fn word_right_skips_separators_then_word() {
        let b = buf(&["foo, bar_baz qux"]);
        assert_eq!(move_word_right(&b, p(0, 0), false), p(0, 3));
        assert_eq!(move_word_right(&b, p(0, 3), false), p(0, 12));
    }

    #[test]
    fn word_left_skips_separators_then_word() {
        let b = buf(&["foo, bar_baz qux"]);
        assert_eq!(move_word_left(&b, p(0, 16), false), p(0, 13));
        assert_eq!(move_word_left(&b, p(0, 13), false), p(0, 5));
    }

    #[test]
    fn multibyte_characters_are_word_boundaries() {
        let b = buf(&["abcédef"]);
        assert_eq!(move_word_right(&b, p(0, 0), false), p(0, 3));
        assert_eq!(move_word_left(&b, p(0, 8), false), p(0, 5));
    }

    #[test]
    fn word_moves_wrap_at_line_edges() {
        let b = buf(&["ab", "cd"]);
        assert_eq!(move_word_right(&b, p(0, 2), false), p(1, 0));
        assert_eq!(move_word_left(&b, p(1, 0), false), p(0, 2));
    }

    // -- Home / End ---------------------------------------------------------

    #[test]
    fn smart_home_toggles_between_indent_and_zero() {
        let b = buf(&["    text"]);
        assert_eq!(move_home(&b, p(0, 6), false), p(0, 4));
        assert_eq!(move_home(&b, p(0, 4), false), p(0, 0));
        assert_eq!(move_home(&b, p(0, 0), false), p(0, 4));
    }

    #[test]
    fn smart_home_on_blank_line_goes_to_zero() {
        let b = buf(&["\t  "]);
        assert_eq!(move_home(&b, p(0, 3), false), p(0, 0));
    }

    #[test]
    fn end_goes_to_line_length() {
        let b = buf(&["héllo"]);
        assert_eq!(move_end(&b, p(0, 0), false), p(0, 6));
    }

    #[test]
    fn apply_dispatches() {
        let b = buf(&["ab", "cd"]);
        assert_eq!(apply(Motion::Down, &b, p(0, 1), false), p(1, 1));
        assert_eq!(apply(Motion::End, &b, p(0, 0), false), p(0, 2));
    }
}
