// SPDX-License-Identifier: MIT
//
// Screen layout and painting.
//
//   ┌──────────────────────────────┐
//   │ note text                    │  ← h - 2 rows, scrolled to the cursor
//   ├──────────────────────────────┤
//   │ status line (inverse)        │  ← name, position, formats, history
//   ├──────────────────────────────┤
//   │ message line                 │  ← result of the last action
//   └──────────────────────────────┘
//
// Markers stay visible in the text, dimmed, so the cursor can be placed on
// them; the content between them is drawn with the attributes they stand
// for. Columns on screen are display columns: tabs expand to the next tab
// stop and wide characters take two cells.

use nib_editor::editor::Editor;
use nib_editor::marker::{self, FormatKind, Marker};
use nib_editor::position::Position;
use nib_editor::utf8;
use nib_term::frame::{Frame, Span, Style};
use unicode_width::UnicodeWidthChar;

// ─── Messages ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Feedback shown on the message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    const fn style(&self) -> Style {
        match self.kind {
            MessageKind::Info | MessageKind::Success => Style::empty(),
            MessageKind::Warning => Style::BOLD,
            MessageKind::Error => Style::BOLD.union(Style::INVERSE),
        }
    }
}

// ─── View ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub tab_width: usize,
    pub scroll_margin: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            scroll_margin: 2,
        }
    }
}

/// Scroll state of the text area.
#[derive(Debug, Default)]
pub struct View {
    top_line: usize,
    left_col: usize,
    options: ViewOptions,
}

impl View {
    #[must_use]
    pub fn new(options: ViewOptions) -> Self {
        Self {
            top_line: 0,
            left_col: 0,
            options: ViewOptions {
                tab_width: options.tab_width.max(1),
                ..options
            },
        }
    }

    #[inline]
    #[must_use]
    pub const fn top_line(&self) -> usize {
        self.top_line
    }

    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    /// Scroll so the cursor is inside a `width` x `height` text area, with
    /// `scroll_margin` rows of context where the buffer allows it.
    pub fn scroll_to_cursor(&mut self, editor: &Editor, width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let cursor = editor.cursor();
        let margin = self.options.scroll_margin.min(height.saturating_sub(1) / 2);

        if cursor.line < self.top_line + margin {
            self.top_line = cursor.line.saturating_sub(margin);
        }
        if cursor.line + margin >= self.top_line + height {
            self.top_line = cursor.line + margin + 1 - height;
        }
        let last = editor.buffer().last_line();
        self.top_line = self.top_line.min((last + 1).saturating_sub(height));

        let line = editor.buffer().line(cursor.line);
        let col = display_col(line, cursor.col, self.options.tab_width);
        if col < self.left_col {
            self.left_col = col;
        }
        if col >= self.left_col + width {
            self.left_col = col + 1 - width;
        }
    }

    /// Paint the whole screen. Returns the cursor's screen position.
    pub fn render(
        &mut self,
        editor: &Editor,
        frame: &mut Frame,
        name: &str,
        message: Option<&Message>,
    ) -> Option<(u16, u16)> {
        let width = usize::from(frame.width());
        let height = usize::from(frame.height());
        if width == 0 || height == 0 {
            return None;
        }
        let text_height = height.saturating_sub(2);
        self.scroll_to_cursor(editor, width, text_height);

        let buf = editor.buffer();
        for row in 0..text_height {
            let idx = self.top_line + row;
            let spans = if idx < buf.line_count() {
                self.line_spans(editor, idx, width)
            } else {
                vec![Span::new("~", Style::DIM)]
            };
            frame.set_row(screen(row), spans);
        }

        if height >= 2 {
            frame.set_row(screen(height - 2), status_spans(editor, name, width));
        }
        if let Some(message) = message {
            frame.set_row(
                screen(height - 1),
                vec![Span::new(message.text.clone(), message.style())],
            );
        }

        if text_height == 0 {
            return None;
        }
        let cursor = editor.cursor();
        let col = display_col(buf.line(cursor.line), cursor.col, self.options.tab_width);
        Some((
            screen(col - self.left_col),
            screen(cursor.line - self.top_line),
        ))
    }

    fn line_spans(&self, editor: &Editor, idx: usize, width: usize) -> Vec<Span> {
        let line = editor.buffer().line(idx);
        let markers = marker::parse_markers(line);
        let tab_width = self.options.tab_width;
        let mut row = RowBuilder::new(self.left_col, width);

        for (col, ch) in line.char_indices() {
            if row.is_full() {
                break;
            }
            let mut style = style_at(&markers, col);
            if editor.is_selected(Position::new(idx, col)) {
                style |= Style::INVERSE;
            }
            let w = if ch == '\t' {
                tab_width - row.col % tab_width
            } else {
                ch.width().unwrap_or(0)
            };
            row.push(ch, w, style);
        }

        // A selected line break shows as one inverse cell.
        if idx < editor.buffer().last_line() && editor.is_selected(Position::new(idx, line.len())) {
            row.push(' ', 1, Style::INVERSE);
        }
        row.spans
    }
}

/// Display column of byte column `col` in `line`.
#[must_use]
pub fn display_col(line: &str, col: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line[..utf8::floor_boundary(line, col)]
        .chars()
        .fold(0, |acc, ch| {
            if ch == '\t' {
                acc + tab_width - acc % tab_width
            } else {
                acc + ch.width().unwrap_or(0)
            }
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn screen(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

const fn kind_style(kind: FormatKind) -> Style {
    match kind {
        FormatKind::Bold => Style::BOLD,
        FormatKind::Italic => Style::ITALIC,
        FormatKind::Underline => Style::UNDERLINE,
        FormatKind::Strikethrough => Style::STRIKETHROUGH,
    }
}

/// Delimiters are dimmed; content takes the style of every region it is in.
fn style_at(markers: &[Marker], col: usize) -> Style {
    markers.iter().fold(Style::empty(), |style, m| {
        let in_delimiter =
            (m.start <= col && col < m.content_start) || (m.content_end <= col && col < m.end);
        if in_delimiter {
            style | Style::DIM
        } else if m.content_start <= col && col < m.content_end {
            style | kind_style(m.kind)
        } else {
            style
        }
    })
}

/// Collects styled cells for the display columns `left..left + width`,
/// merging neighbours that share a style.
struct RowBuilder {
    spans: Vec<Span>,
    left: usize,
    right: usize,
    col: usize,
}

impl RowBuilder {
    const fn new(left: usize, width: usize) -> Self {
        Self {
            spans: Vec::new(),
            left,
            right: left + width,
            col: 0,
        }
    }

    const fn is_full(&self) -> bool {
        self.col >= self.right
    }

    fn push(&mut self, ch: char, width: usize, style: Style) {
        let (start, end) = (self.col, self.col + width);
        self.col = end;
        if (end <= self.left && width > 0) || start >= self.right {
            return;
        }
        if ch == '\t' || start < self.left || end > self.right {
            // Tabs, and wide characters cut by an edge, become blanks.
            let visible = end.min(self.right) - start.max(self.left);
            for _ in 0..visible {
                self.put(' ', style);
            }
        } else {
            self.put(ch, style);
        }
    }

    fn put(&mut self, ch: char, style: Style) {
        match self.spans.last_mut() {
            Some(span) if span.style == style => span.text.push(ch),
            _ => self.spans.push(Span::new(ch.to_string(), style)),
        }
    }
}

fn status_spans(editor: &Editor, name: &str, width: usize) -> Vec<Span> {
    let base = Style::INVERSE;
    let on = Style::INVERSE | Style::BOLD;
    let off = Style::INVERSE | Style::DIM;

    let modified = if editor.is_modified() { " [+]" } else { "" };
    let left = Span::new(format!(" {name}{modified}"), base | Style::BOLD);

    let cursor = editor.cursor();
    let col = utf8::char_col(editor.buffer().line(cursor.line), cursor.col);
    let active = editor.active_formats();

    let mut right = vec![Span::new(format!("{}:{}  ", cursor.line + 1, col + 1), base)];
    for (kind, letter) in FormatKind::ALL.into_iter().zip(["B", "I", "U", "S"]) {
        let style = if active.has(kind) { on } else { off };
        right.push(Span::new(letter, style));
        right.push(Span::new(" ", base));
    }
    right.push(Span::new(" ", base));
    right.push(Span::new("undo", if editor.can_undo() { on } else { off }));
    right.push(Span::new(" ", base));
    right.push(Span::new("redo", if editor.can_redo() { on } else { off }));
    right.push(Span::new(" ", base));

    let used = left.width() + right.iter().map(Span::width).sum::<usize>();
    let mut spans = vec![left, Span::new(" ".repeat(width.saturating_sub(used)), base)];
    spans.extend(right);
    spans
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts(scroll_margin: usize) -> ViewOptions {
        ViewOptions {
            tab_width: 4,
            scroll_margin,
        }
    }

    fn row_text(frame: &Frame, y: u16) -> String {
        frame.row(y).iter().map(|s| s.text.as_str()).collect()
    }

    fn spans(items: &[(&str, Style)]) -> Vec<Span> {
        items.iter().map(|(t, s)| Span::new(*t, *s)).collect()
    }

    // -- Line styling ---

    #[test]
    fn markers_dim_and_content_styled() {
        let editor = Editor::from_lines(["**hi** x"]);
        let mut frame = Frame::new(20, 5);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(
            frame.row(0),
            spans(&[
                ("**", Style::DIM),
                ("hi", Style::BOLD),
                ("**", Style::DIM),
                (" x", Style::empty()),
            ])
            .as_slice()
        );
    }

    #[test]
    fn underline_tags() {
        let editor = Editor::from_lines(["<u>u</u>"]);
        let mut frame = Frame::new(20, 4);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(
            frame.row(0),
            spans(&[
                ("<u>", Style::DIM),
                ("u", Style::UNDERLINE),
                ("</u>", Style::DIM),
            ])
            .as_slice()
        );
    }

    #[test]
    fn selection_is_inverse() {
        let mut editor = Editor::from_lines(["ab"]);
        editor.select_all();
        let mut frame = Frame::new(20, 4);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(frame.row(0), spans(&[("ab", Style::INVERSE)]).as_slice());
    }

    #[test]
    fn selected_line_break_shows() {
        let mut editor = Editor::from_lines(["a", "b"]);
        editor.select_all();
        let mut frame = Frame::new(20, 5);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(row_text(&frame, 0), "a ");
        assert_eq!(row_text(&frame, 1), "b");
    }

    #[test]
    fn tabs_expand_to_stops() {
        let editor = Editor::from_lines(["\tx", "ab\ty"]);
        let mut frame = Frame::new(20, 5);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(row_text(&frame, 0), "    x");
        assert_eq!(row_text(&frame, 1), "ab  y");
    }

    #[test]
    fn rows_past_the_end_show_tildes() {
        let editor = Editor::from_lines(["only"]);
        let mut frame = Frame::new(20, 5);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(frame.row(1), spans(&[("~", Style::DIM)]).as_slice());
        assert_eq!(frame.row(2), spans(&[("~", Style::DIM)]).as_slice());
    }

    // -- Scrolling ---

    #[test]
    fn scrolls_down_to_cursor() {
        let mut editor = Editor::from_lines((0..10).map(|i| i.to_string()));
        editor.set_cursor(Position::new(9, 0));
        let mut view = View::new(opts(0));
        view.scroll_to_cursor(&editor, 10, 3);
        assert_eq!(view.top_line(), 7);
    }

    #[test]
    fn scroll_margin_keeps_context() {
        let mut editor = Editor::from_lines((0..10).map(|i| i.to_string()));
        let mut view = View::new(opts(1));
        editor.set_cursor(Position::new(5, 0));
        view.scroll_to_cursor(&editor, 10, 4);
        assert_eq!(view.top_line(), 3);
        editor.set_cursor(Position::new(3, 0));
        view.scroll_to_cursor(&editor, 10, 4);
        assert_eq!(view.top_line(), 2);
    }

    #[test]
    fn horizontal_scroll_and_cursor_position() {
        let mut editor = Editor::from_lines(["a".repeat(30)]);
        editor.set_cursor(Position::new(0, 25));
        let mut view = View::new(opts(0));
        let mut frame = Frame::new(10, 4);
        let cursor = view.render(&editor, &mut frame, "n.md", None);
        assert_eq!(view.left_col(), 16);
        assert_eq!(cursor, Some((9, 0)));
        assert_eq!(row_text(&frame, 0), "a".repeat(10));
    }

    #[test]
    fn cursor_after_tab_and_wide_chars() {
        let mut editor = Editor::from_lines(["\t日x"]);
        editor.set_cursor(Position::new(0, 4));
        let mut frame = Frame::new(20, 4);
        let cursor = View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        assert_eq!(cursor, Some((6, 0)));
    }

    #[test]
    fn display_columns() {
        assert_eq!(display_col("\tab", 1, 4), 4);
        assert_eq!(display_col("a\tb", 2, 4), 4);
        assert_eq!(display_col("日本", 3, 4), 2);
        assert_eq!(display_col("abc", 2, 4), 2);
    }

    // -- Status and message lines ---

    #[test]
    fn status_line_contents() {
        let mut editor = Editor::from_lines(["hello"]);
        editor.insert_char('x');
        let mut frame = Frame::new(60, 4);
        View::new(opts(0)).render(&editor, &mut frame, "todo.md", None);
        let status = row_text(&frame, 2);
        assert!(status.starts_with(" todo.md [+]"));
        assert!(status.contains("1:2"));
        assert!(status.contains("B I U S"));
        assert!(status.trim_end().ends_with("undo redo"));
        assert_eq!(status.chars().count(), 60);
    }

    #[test]
    fn active_format_letters_are_bold() {
        let mut editor = Editor::from_lines(["**bold**"]);
        editor.set_cursor(Position::new(0, 3));
        let mut frame = Frame::new(60, 4);
        View::new(opts(0)).render(&editor, &mut frame, "n.md", None);
        let b = frame.row(2).iter().find(|s| s.text == "B").unwrap();
        let i = frame.row(2).iter().find(|s| s.text == "I").unwrap();
        assert!(b.style.contains(Style::BOLD));
        assert!(i.style.contains(Style::DIM));
    }

    #[test]
    fn message_line() {
        let editor = Editor::new();
        let mut frame = Frame::new(30, 4);
        let msg = Message::new(MessageKind::Warning, "Nothing to undo");
        View::new(opts(0)).render(&editor, &mut frame, "n.md", Some(&msg));
        assert_eq!(frame.row(3), spans(&[("Nothing to undo", Style::BOLD)]).as_slice());
    }

    #[test]
    fn tiny_frame_has_no_cursor() {
        let editor = Editor::new();
        let mut frame = Frame::new(10, 2);
        assert_eq!(View::new(opts(0)).render(&editor, &mut frame, "n.md", None), None);
    }
}
