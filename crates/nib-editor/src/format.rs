//! Formatting engine — the sticky session and wrap/split/extract.
//!
//! The [`FormattingSession`] holds four independent toggles. While any is on,
//! typing at a plain position first inserts an opening+closing marker pair
//! and types between them, so the new text carries the formatting.
//!
//! The free functions operate on literal text:
//!
//! - [`wrap_with`] / [`wrap_in`] surround text with markers, one line at a
//!   time since markers never span lines.
//! - [`extract_formatting_from_text`] strips markers back off, reporting
//!   which kinds were present. Selection toggles are built from the two:
//!   extract, flip one kind, wrap again.
//! - [`split_formatting_at_cursor`] closes and reopens a region around the
//!   cursor so new text lands outside it.
//!
//! # Nesting
//!
//! Kinds nest in a fixed order, bold outermost and strikethrough innermost:
//! `**<u>~~x~~</u>**`. Bold and italic together produce `***x***`, a run of
//! three that the parser deliberately does not match (see
//! [`crate::marker`]); extraction still recognises such edge runs.

use crate::buffer::{self, TextBuffer};
use crate::marker::{self, FormatKind, FormatSet};
use crate::position::Position;

// ---------------------------------------------------------------------------
// FormattingSession
// ---------------------------------------------------------------------------

/// Sticky formatting applied to newly typed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormattingSession {
    active: FormatSet,
}

impl FormattingSession {
    /// A session with every toggle off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: FormatSet::empty(),
        }
    }

    /// The toggles that are on.
    #[inline]
    #[must_use]
    pub const fn active(&self) -> FormatSet {
        self.active
    }

    /// True when `kind` is toggled on.
    #[must_use]
    pub fn is_enabled(&self, kind: FormatKind) -> bool {
        self.active.has(kind)
    }

    /// Turn one toggle on or off.
    pub fn set(&mut self, kind: FormatKind, on: bool) {
        self.active.set(kind.flag(), on);
    }

    /// Turn every toggle off.
    pub fn clear(&mut self) {
        self.active = FormatSet::empty();
    }

    /// Flip one toggle and return the status message for its new state,
    /// e.g. `"Bold enabled"`.
    pub fn toggle(&mut self, kind: FormatKind) -> &'static str {
        self.active.toggle(kind.flag());
        status(kind, self.active.has(kind))
    }

    /// [`toggle`](Self::toggle) for bold.
    pub fn toggle_bold(&mut self) -> &'static str {
        self.toggle(FormatKind::Bold)
    }

    /// [`toggle`](Self::toggle) for italic.
    pub fn toggle_italic(&mut self) -> &'static str {
        self.toggle(FormatKind::Italic)
    }

    /// [`toggle`](Self::toggle) for underline.
    pub fn toggle_underline(&mut self) -> &'static str {
        self.toggle(FormatKind::Underline)
    }

    /// [`toggle`](Self::toggle) for strikethrough.
    pub fn toggle_strikethrough(&mut self) -> &'static str {
        self.toggle(FormatKind::Strikethrough)
    }

    /// Opening delimiters of every active toggle, outermost first.
    #[must_use]
    pub fn opening_markers(&self) -> String {
        self.active.kinds().map(FormatKind::open).collect()
    }

    /// Closing delimiters of every active toggle, innermost first.
    #[must_use]
    pub fn closing_markers(&self) -> String {
        self.active.kinds().rev().map(FormatKind::close).collect()
    }

    /// Wrap text in every active toggle.
    #[must_use]
    pub fn wrap_text(&self, text: &str) -> String {
        wrap_in(self.active, text)
    }

    /// Prepare the cursor for a typed character.
    ///
    /// With no toggle on, or when the cursor already sits inside a marker's
    /// content, nothing changes. Right after the session's own closing
    /// delimiters the cursor moves back inside them so the region grows, and
    /// right before its opening delimiters it moves into the region that
    /// follows. Otherwise an empty opening+closing pair is inserted and the
    /// returned position is between the two halves.
    pub fn insert_formatting_markers(&self, buf: &mut TextBuffer, pos: Position) -> Position {
        if self.active.is_empty() {
            return pos;
        }
        let line = buf.line(pos.line);
        let opening = self.opening_markers();
        let closing = self.closing_markers();

        if marker::is_inside_marker(line, pos.col) || marker::straddles_tag(line, pos.col) {
            return pos;
        }
        if line[..pos.col].ends_with(&closing)
            && marker::is_inside_marker(line, pos.col - closing.len())
        {
            return pos.with_col(pos.col - closing.len());
        }
        let inner = pos.col + opening.len();
        if line[pos.col..].starts_with(&opening)
            && marker::parse_markers(line)
                .iter()
                .any(|m| m.start == pos.col && m.holds(inner))
        {
            return pos.with_col(inner);
        }
        // Between the halves of a pair the parser cannot see (`***a***`).
        if line[pos.col..].starts_with(&closing) && closes_run(line, pos.col) {
            return pos;
        }

        let mut pair = String::with_capacity(opening.len() + closing.len());
        pair.push_str(&opening);
        pair.push_str(&closing);
        buf.insert_str(pos, &pair);
        pos.with_col(pos.col + opening.len())
    }
}

/// True when the delimiter text at `col` closes an earlier one.
///
/// `</u>` always closes. A `*` or `~` run closes when an odd number of runs
/// of the same length come before it on the line, since runs pair up left
/// to right.
fn closes_run(line: &str, col: usize) -> bool {
    let bytes = line.as_bytes();
    let Some(&symbol) = bytes.get(col) else {
        return false;
    };
    if symbol != b'*' && symbol != b'~' {
        return line[col..].starts_with(FormatKind::Underline.close());
    }
    if col > 0 && bytes[col - 1] == symbol {
        return false;
    }
    let len = bytes[col..].iter().take_while(|&&b| b == symbol).count();
    let before = marker::exact_runs(line, symbol, len)
        .into_iter()
        .filter(|&at| at < col)
        .count();
    before % 2 == 1
}

const fn status(kind: FormatKind, on: bool) -> &'static str {
    match (kind, on) {
        (FormatKind::Bold, true) => "Bold enabled",
        (FormatKind::Bold, false) => "Bold disabled",
        (FormatKind::Italic, true) => "Italic enabled",
        (FormatKind::Italic, false) => "Italic disabled",
        (FormatKind::Underline, true) => "Underline enabled",
        (FormatKind::Underline, false) => "Underline disabled",
        (FormatKind::Strikethrough, true) => "Strikethrough enabled",
        (FormatKind::Strikethrough, false) => "Strikethrough disabled",
    }
}

// ---------------------------------------------------------------------------
// Wrapping
// ---------------------------------------------------------------------------

/// Wrap every non-empty line of `text` in the kinds of `set`, nested in
/// canonical order. Empty lines are left bare.
#[must_use]
pub fn wrap_in(set: FormatSet, text: &str) -> String {
    if set.is_empty() {
        return text.to_string();
    }
    let opening: String = set.kinds().map(FormatKind::open).collect();
    let closing: String = set.kinds().rev().map(FormatKind::close).collect();

    buffer::split_lines(text)
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{opening}{line}{closing}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text in one marker pair (per line).
#[must_use]
pub fn wrap_with(kind: FormatKind, text: &str) -> String {
    wrap_in(kind.flag(), text)
}

/// `**text**`, per line.
#[must_use]
pub fn wrap_with_bold(text: &str) -> String {
    wrap_with(FormatKind::Bold, text)
}

/// `*text*`, per line.
#[must_use]
pub fn wrap_with_italic(text: &str) -> String {
    wrap_with(FormatKind::Italic, text)
}

/// `<u>text</u>`, per line.
#[must_use]
pub fn wrap_with_underline(text: &str) -> String {
    wrap_with(FormatKind::Underline, text)
}

/// `~~text~~`, per line.
#[must_use]
pub fn wrap_with_strikethrough(text: &str) -> String {
    wrap_with(FormatKind::Strikethrough, text)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Plain text with its markers removed, and the kinds that were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub plain_text: String,
    pub formats: FormatSet,
}

/// Strip formatting from text, line by line.
///
/// Complete marker pairs are removed repeatedly until none parse (removing
/// one pair can make another one visible). What remains is cleaned up:
/// matching `*`/`~` runs at both ends of a line still count as formatting
/// (`***x***` is bold and italic), stray runs hugging either end of a line
/// are dropped, and leftover `<u>`/`</u>` tags are removed. Symbols inside
/// the text (`2*3`) or followed by a blank (a `* ` bullet) are kept.
#[must_use]
pub fn extract_formatting_from_text(text: &str) -> Extracted {
    let mut formats = FormatSet::empty();
    let plain_text = buffer::split_lines(text)
        .into_iter()
        .map(|line| extract_line(line, &mut formats))
        .collect::<Vec<_>>()
        .join("\n");
    Extracted {
        plain_text,
        formats,
    }
}

fn extract_line(line: &str, formats: &mut FormatSet) -> String {
    let mut text = line.to_string();
    loop {
        let markers = marker::parse_markers(&text);
        if markers.is_empty() {
            break;
        }
        let mut spans = Vec::with_capacity(markers.len() * 2);
        for m in &markers {
            *formats |= m.kind.flag();
            spans.push((m.start, m.content_start));
            spans.push((m.content_end, m.end));
        }
        spans.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        for (from, to) in spans {
            text.replace_range(from..to, "");
        }
    }

    let mut text = text
        .replace(FormatKind::Underline.open(), "")
        .replace(FormatKind::Underline.close(), "");
    *formats |= edge_pair_formats(&text);
    while let Some(len) = stray_edge(&text, Edge::Leading) {
        text.replace_range(..len, "");
    }
    while let Some(len) = stray_edge(&text, Edge::Trailing) {
        text.truncate(text.len() - len);
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Leading,
    Trailing,
}

/// Length of a `*` or `~` run at one end of `text`, when it hugs
/// non-blank text on its inner side.
fn stray_edge(text: &str, edge: Edge) -> Option<usize> {
    let bytes = text.as_bytes();
    let symbol = match edge {
        Edge::Leading => *bytes.first()?,
        Edge::Trailing => *bytes.last()?,
    };
    if symbol != b'*' && symbol != b'~' {
        return None;
    }
    let run = match edge {
        Edge::Leading => bytes.iter().take_while(|&&b| b == symbol).count(),
        Edge::Trailing => bytes.iter().rev().take_while(|&&b| b == symbol).count(),
    };
    let inner = match edge {
        Edge::Leading => bytes.get(run),
        Edge::Trailing => bytes.len().checked_sub(run + 1).and_then(|i| bytes.get(i)),
    };
    match inner {
        Some(b) if b.is_ascii_whitespace() => None,
        _ => Some(run),
    }
}

/// Formatting implied by equal `*` or `~` runs wrapping the whole text.
fn edge_pair_formats(text: &str) -> FormatSet {
    let (Some(lead), Some(trail)) = (
        stray_edge(text, Edge::Leading),
        stray_edge(text, Edge::Trailing),
    ) else {
        return FormatSet::empty();
    };
    let bytes = text.as_bytes();
    if lead != trail || bytes[0] != bytes[bytes.len() - 1] || text.len() <= lead * 2 {
        return FormatSet::empty();
    }
    match (bytes[0], lead) {
        (b'*', 1) => FormatSet::ITALIC,
        (b'*', 2) => FormatSet::BOLD,
        (b'*', 3) => FormatSet::BOLD | FormatSet::ITALIC,
        (b'~', 2) => FormatSet::STRIKETHROUGH,
        _ => FormatSet::empty(),
    }
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// True when the `kind` region around `col` can be split there.
///
/// `col` must sit strictly inside the region's content, outside any literal
/// underline tag, and not next to the kind's own symbol: a delimiter placed
/// against `*` or `~` would merge into a longer run that no longer parses.
#[must_use]
pub fn can_split_at(line: &str, col: usize, kind: FormatKind) -> bool {
    if marker::straddles_tag(line, col) {
        return false;
    }
    if !marker::marker_at(line, col, kind).is_some_and(|m| m.holds_strictly(col)) {
        return false;
    }
    let Some(symbol) = kind.symbol() else {
        return true;
    };
    let bytes = line.as_bytes();
    bytes[col - 1] != symbol && bytes[col] != symbol
}

/// Split the `kind` region around the cursor into two.
///
/// A closing delimiter is inserted at the cursor followed by a fresh
/// opening one, and the returned cursor sits between them, outside both
/// halves. The halves only parse as two regions once text goes between
/// them, so callers insert it right away. Returns `None` (buffer untouched)
/// when [`can_split_at`] says no.
pub fn split_formatting_at_cursor(
    buf: &mut TextBuffer,
    pos: Position,
    kind: FormatKind,
) -> Option<Position> {
    if !can_split_at(buf.line(pos.line), pos.col, kind) {
        return None;
    }

    let mut glue = String::from(kind.close());
    glue.push_str(kind.open());
    buf.insert_str(pos, &glue);
    Some(pos.with_col(pos.col + kind.close().len()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
