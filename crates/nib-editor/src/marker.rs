//! Inline formatting markers — parsing and queries.
//!
//! Formatting is stored in the text itself:
//!
//! | Kind | Opening | Closing |
//! |------|---------|---------|
//! | Bold | `**` | `**` |
//! | Italic | `*` | `*` |
//! | Underline | `<u>` | `</u>` |
//! | Strikethrough | `~~` | `~~` |
//!
//! # Design
//!
//! Each kind is scanned independently over the raw line, so nesting between
//! kinds falls out naturally (`**a *b* c**` is bold with italic inside).
//! Symbol delimiters are matched by *runs*: a maximal run of `*` or `~`
//! counts as a delimiter only when its length is exactly the delimiter's
//! length. `***x***` is therefore neither bold nor italic, and a `*` touching
//! another `*` never opens italic. Pairs are matched left to right, each
//! opening taking the nearest valid closing after it.
//!
//! A marker never spans lines; every function here works on one line.

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// FormatKind / FormatSet
// ---------------------------------------------------------------------------

/// One of the four inline formatting kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl FormatKind {
    /// All kinds in canonical nesting order, outermost first.
    pub const ALL: [Self; 4] = [Self::Bold, Self::Italic, Self::Underline, Self::Strikethrough];

    /// The opening delimiter.
    #[must_use]
    pub const fn open(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
            Self::Underline => "<u>",
            Self::Strikethrough => "~~",
        }
    }

    /// The closing delimiter.
    #[must_use]
    pub const fn close(self) -> &'static str {
        match self {
            Self::Underline => "</u>",
            other => other.open(),
        }
    }

    /// Human-readable name, as used in status messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Underline => "Underline",
            Self::Strikethrough => "Strikethrough",
        }
    }

    /// The repeated symbol a delimiter is made of; `None` for the tag.
    #[must_use]
    pub const fn symbol(self) -> Option<u8> {
        match self {
            Self::Bold | Self::Italic => Some(b'*'),
            Self::Strikethrough => Some(b'~'),
            Self::Underline => None,
        }
    }

    /// The single-flag set for this kind.
    #[must_use]
    pub const fn flag(self) -> FormatSet {
        match self {
            Self::Bold => FormatSet::BOLD,
            Self::Italic => FormatSet::ITALIC,
            Self::Underline => FormatSet::UNDERLINE,
            Self::Strikethrough => FormatSet::STRIKETHROUGH,
        }
    }
}

bitflags! {
    /// A set of formatting kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct FormatSet: u8 {
        const BOLD          = 0b0001;
        const ITALIC        = 0b0010;
        const UNDERLINE     = 0b0100;
        const STRIKETHROUGH = 0b1000;
    }
}

impl FormatSet {
    /// True when `kind` is in the set.
    #[inline]
    #[must_use]
    pub fn has(self, kind: FormatKind) -> bool {
        self.contains(kind.flag())
    }

    /// The kinds in the set, in canonical nesting order.
    pub fn kinds(self) -> impl DoubleEndedIterator<Item = FormatKind> {
        FormatKind::ALL.into_iter().filter(move |k| self.has(*k))
    }
}

// ---------------------------------------------------------------------------
// Marker
// ---------------------------------------------------------------------------

/// One parsed formatting region within a line.
///
/// All offsets are byte columns: `start..content_start` is the opening
/// delimiter, `content_end..end` the closing one, and
/// `start < content_start <= content_end < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub kind: FormatKind,
    pub start: usize,
    pub end: usize,
    pub content_start: usize,
    pub content_end: usize,
}

impl Marker {
    fn new(kind: FormatKind, open_at: usize, close_at: usize) -> Self {
        let content_start = open_at + kind.open().len();
        Self {
            kind,
            start: open_at,
            end: close_at + kind.close().len(),
            content_start,
            content_end: close_at,
        }
    }

    /// True when `col` is within the content, both edges included.
    #[inline]
    #[must_use]
    pub const fn holds(&self, col: usize) -> bool {
        self.content_start <= col && col <= self.content_end
    }

    /// True when `col` is within the content, edges excluded.
    #[inline]
    #[must_use]
    pub const fn holds_strictly(&self, col: usize) -> bool {
        self.content_start < col && col < self.content_end
    }

    /// The delimiter span `col` falls strictly inside of, if any.
    #[must_use]
    pub const fn delimiter_around(&self, col: usize) -> Option<(usize, usize)> {
        if self.start < col && col < self.content_start {
            Some((self.start, self.content_start))
        } else if self.content_end < col && col < self.end {
            Some((self.content_end, self.end))
        } else {
            None
        }
    }

    /// True when the spans `[start, end)` and `[from, to)` share a byte.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, from: usize, to: usize) -> bool {
        self.start < to && from < self.end
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse every formatting marker in a line, sorted by start column.
#[must_use]
pub fn parse_markers(line: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    pair_runs(line, b'*', 2, FormatKind::Bold, &mut markers);
    pair_runs(line, b'~', 2, FormatKind::Strikethrough, &mut markers);
    pair_tags(line, &mut markers);
    pair_runs(line, b'*', 1, FormatKind::Italic, &mut markers);
    markers.sort_by_key(|m| (m.start, m.kind));
    markers
}

/// Start columns of every maximal run of `symbol` whose length is exactly
/// `len`.
pub(crate) fn exact_runs(line: &str, symbol: u8, len: usize) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != symbol {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == symbol {
            i += 1;
        }
        if i - start == len {
            runs.push(start);
        }
    }
    runs
}

fn pair_runs(line: &str, symbol: u8, len: usize, kind: FormatKind, out: &mut Vec<Marker>) {
    for pair in exact_runs(line, symbol, len).chunks_exact(2) {
        out.push(Marker::new(kind, pair[0], pair[1]));
    }
}

fn pair_tags(line: &str, out: &mut Vec<Marker>) {
    let open = FormatKind::Underline.open();
    let close = FormatKind::Underline.close();
    let mut from = 0;
    while let Some(rel) = line[from..].find(open) {
        let open_at = from + rel;
        let search = open_at + open.len();
        let Some(close_rel) = line[search..].find(close) else {
            break;
        };
        let close_at = search + close_rel;
        out.push(Marker::new(FormatKind::Underline, open_at, close_at));
        from = close_at + close.len();
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The kinds whose content contains `col` (edges included).
#[must_use]
pub fn formats_at(line: &str, col: usize) -> FormatSet {
    parse_markers(line)
        .iter()
        .filter(|m| m.holds(col))
        .fold(FormatSet::empty(), |set, m| set | m.kind.flag())
}

/// The marker of `kind` whose content contains `col` (edges included).
#[must_use]
pub fn marker_at(line: &str, col: usize, kind: FormatKind) -> Option<Marker> {
    parse_markers(line)
        .into_iter()
        .find(|m| m.kind == kind && m.holds(col))
}

/// True when `col` is inside the content of any marker.
#[must_use]
pub fn is_inside_marker(line: &str, col: usize) -> bool {
    parse_markers(line).iter().any(|m| m.holds(col))
}

/// The delimiter span of a parsed marker that `col` falls strictly inside.
#[must_use]
pub fn delimiter_around(line: &str, col: usize) -> Option<(usize, usize)> {
    parse_markers(line)
        .iter()
        .find_map(|m| m.delimiter_around(col))
}

/// True when `col` sits strictly inside a literal `<u>` or `</u>` tag,
/// matched or not.
#[must_use]
pub fn straddles_tag(line: &str, col: usize) -> bool {
    [FormatKind::Underline.open(), FormatKind::Underline.close()]
        .iter()
        .any(|tag| {
            line.match_indices(tag)
                .any(|(at, _)| at < col && col < at + tag.len())
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
