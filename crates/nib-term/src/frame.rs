// SPDX-License-Identifier: MIT
//
// Frames and row-differential rendering.
//
// The application paints styled spans into a `Frame`, one row at a time.
// `Renderer` compares each row against the frame it drew last and emits
// escapes only for rows that differ. A note editor changes one or two rows
// per keystroke, so this keeps output small without a cell grid.
//
// Output accumulates in memory and goes to the terminal in a single write,
// wrapped in synchronized output so the terminal never shows half a frame.
// Text wider than the frame is clipped by display width (`unicode-width`);
// a wide character that would straddle the right edge is dropped.

use std::io::{self, Write};

use bitflags::bitflags;
use unicode_width::UnicodeWidthChar;

use crate::ansi;

// ─── Style ───────────────────────────────────────────────────────────────────

bitflags! {
    /// Text attributes of a span.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Style: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
        const DIM           = 0b0001_0000;
        const INVERSE       = 0b0010_0000;
    }
}

// ─── Span ────────────────────────────────────────────────────────────────────

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::empty())
    }

    /// Display width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.text.chars().map(|c| c.width().unwrap_or(0)).sum()
    }
}

// ─── Frame ───────────────────────────────────────────────────────────────────

/// One screen's worth of styled rows. Rows past `height` are ignored; rows
/// never set render as blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    rows: Vec<Vec<Span>>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            rows: vec![Vec::new(); usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Blank every row, keeping the allocation.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.rows.resize(usize::from(height), Vec::new());
        self.clear();
    }

    /// Replace row `y`. Out-of-range rows are ignored.
    pub fn set_row(&mut self, y: u16, spans: Vec<Span>) {
        if let Some(row) = self.rows.get_mut(usize::from(y)) {
            *row = spans;
        }
    }

    /// Append a span to row `y`. Out-of-range rows are ignored.
    pub fn push(&mut self, y: u16, span: Span) {
        if let Some(row) = self.rows.get_mut(usize::from(y)) {
            row.push(span);
        }
    }

    #[must_use]
    pub fn row(&self, y: u16) -> &[Span] {
        self.rows.get(usize::from(y)).map_or(&[], Vec::as_slice)
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// What a render pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub rows_rendered: usize,
    pub rows_skipped: usize,
}

/// Row-differential renderer. Holds the last frame drawn.
#[derive(Debug, Default)]
pub struct Renderer {
    output: Vec<u8>,
    previous: Option<Frame>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: Vec::with_capacity(8192),
            previous: None,
        }
    }

    /// Forget the previous frame so the next render repaints every row.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Render `frame` into the output buffer. Nothing reaches the terminal
    /// until [`flush`](Self::flush).
    pub fn render(&mut self, frame: &Frame) -> RenderStats {
        let mut stats = RenderStats::default();
        let full = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width != frame.width || prev.height != frame.height);

        // Writes into a Vec cannot fail.
        let out = &mut self.output;
        let _ = ansi::begin_sync(out);
        if full {
            let _ = ansi::reset(out);
            let _ = ansi::clear_screen(out);
        }

        for y in 0..frame.height {
            let unchanged = !full
                && self
                    .previous
                    .as_ref()
                    .is_some_and(|prev| prev.row(y) == frame.row(y));
            if unchanged {
                stats.rows_skipped += 1;
                continue;
            }
            let _ = write_row(out, frame, y);
            stats.rows_rendered += 1;
        }

        let _ = ansi::end_sync(out);

        match &mut self.previous {
            Some(prev) if !full => prev.clone_from(frame),
            _ => self.previous = Some(frame.clone()),
        }
        stats
    }

    /// Bytes waiting to be written.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write the pending output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.flush_to(&mut lock)
    }

    /// Write the pending output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.output.is_empty() {
            w.write_all(&self.output)?;
            w.flush()?;
            self.output.clear();
        }
        Ok(())
    }
}

fn write_row(out: &mut Vec<u8>, frame: &Frame, y: u16) -> io::Result<()> {
    ansi::cursor_to(out, 0, y)?;
    let mut remaining = usize::from(frame.width);

    'spans: for span in frame.row(y) {
        if remaining == 0 {
            break;
        }
        ansi::reset(out)?;
        ansi::attrs(out, span.style)?;
        for ch in span.text.chars() {
            let w = ch.width().unwrap_or(0);
            if w > remaining {
                break 'spans;
            }
            remaining -= w;
            let mut enc = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
        }
    }

    ansi::reset(out)?;
    ansi::clear_to_eol(out)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_with(rows: &[&str]) -> Frame {
        #[allow(clippy::cast_possible_truncation)]
        let mut frame = Frame::new(20, rows.len() as u16);
        for (y, text) in (0u16..).zip(rows) {
            frame.set_row(y, vec![Span::plain(*text)]);
        }
        frame
    }

    fn rendered(renderer: &mut Renderer, frame: &Frame) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let mut out = Vec::new();
        renderer.flush_to(&mut out).unwrap();
        (stats, String::from_utf8(out).unwrap())
    }

    // -- Frame ---

    #[test]
    fn frame_rows_ignore_out_of_range() {
        let mut frame = Frame::new(10, 2);
        frame.set_row(5, vec![Span::plain("x")]);
        frame.push(1, Span::plain("a"));
        frame.push(1, Span::new("b", Style::BOLD));
        assert!(frame.row(0).is_empty());
        assert_eq!(frame.row(1).len(), 2);
        assert!(frame.row(9).is_empty());
    }

    #[test]
    fn resize_blanks_rows() {
        let mut frame = frame_with(&["one", "two"]);
        frame.resize(30, 3);
        assert_eq!((frame.width(), frame.height()), (30, 3));
        assert!((0..3).all(|y| frame.row(y).is_empty()));
    }

    #[test]
    fn span_width_counts_cells() {
        assert_eq!(Span::plain("abc").width(), 3);
        assert_eq!(Span::plain("日本").width(), 4);
        assert_eq!(Span::plain("é").width(), 1);
    }

    // -- Renderer ---

    #[test]
    fn first_render_paints_every_row() {
        let mut renderer = Renderer::new();
        let (stats, out) = rendered(&mut renderer, &frame_with(&["hello", "world"]));
        assert_eq!(stats, RenderStats { rows_rendered: 2, rows_skipped: 0 });
        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.ends_with("\x1b[?2026l"));
        assert!(out.contains("\x1b[2J"));
        assert!(out.contains("\x1b[1;1H\x1b[0mhello\x1b[0m\x1b[K"));
        assert!(out.contains("\x1b[2;1H\x1b[0mworld\x1b[0m\x1b[K"));
    }

    #[test]
    fn unchanged_rows_are_skipped() {
        let mut renderer = Renderer::new();
        rendered(&mut renderer, &frame_with(&["hello", "world"]));
        let (stats, out) = rendered(&mut renderer, &frame_with(&["hello", "there"]));
        assert_eq!(stats, RenderStats { rows_rendered: 1, rows_skipped: 1 });
        assert!(!out.contains("hello"));
        assert!(out.contains("there"));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn resize_forces_full_repaint() {
        let mut renderer = Renderer::new();
        rendered(&mut renderer, &frame_with(&["a", "b"]));
        let mut bigger = frame_with(&["a", "b"]);
        bigger.resize(40, 2);
        bigger.set_row(0, vec![Span::plain("a")]);
        bigger.set_row(1, vec![Span::plain("b")]);
        let (stats, _) = rendered(&mut renderer, &bigger);
        assert_eq!(stats.rows_rendered, 2);
    }

    #[test]
    fn force_redraw_repaints() {
        let mut renderer = Renderer::new();
        let frame = frame_with(&["same"]);
        rendered(&mut renderer, &frame);
        renderer.force_redraw();
        let (stats, _) = rendered(&mut renderer, &frame);
        assert_eq!(stats.rows_rendered, 1);
    }

    #[test]
    fn styled_spans_emit_attributes() {
        let mut frame = Frame::new(20, 1);
        frame.set_row(
            0,
            vec![
                Span::new("**", Style::DIM),
                Span::new("hi", Style::BOLD),
            ],
        );
        let (_, out) = rendered(&mut Renderer::new(), &frame);
        assert!(out.contains("\x1b[0m\x1b[2m**\x1b[0m\x1b[1mhi\x1b[0m\x1b[K"));
    }

    #[test]
    fn text_is_clipped_to_width() {
        let mut frame = Frame::new(5, 1);
        frame.set_row(0, vec![Span::plain("abc"), Span::plain("defgh")]);
        let (_, out) = rendered(&mut Renderer::new(), &frame);
        assert!(out.contains("abc\x1b[0mde\x1b[0m\x1b[K"));
        assert!(!out.contains('f'));
    }

    #[test]
    fn wide_char_at_edge_is_dropped() {
        let mut frame = Frame::new(3, 1);
        frame.set_row(0, vec![Span::plain("a日本")]);
        let (_, out) = rendered(&mut Renderer::new(), &frame);
        assert!(out.contains("a日\x1b[0m\x1b[K"));
        assert!(!out.contains('本'));
    }

    #[test]
    fn flush_empties_output() {
        let mut renderer = Renderer::new();
        renderer.render(&frame_with(&["x"]));
        assert!(!renderer.output_bytes().is_empty());
        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();
        assert!(renderer.output_bytes().is_empty());
    }
}
