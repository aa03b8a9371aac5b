// SPDX-License-Identifier: MIT
//
// ANSI escape sequences.
//
// Stateless writers over any `impl Write`. Whoever calls them decides when;
// this module only knows the bytes. Coordinates are 0-indexed here and
// converted to the terminal's 1-indexed form on output.

use std::io::{self, Write};

use crate::frame::Style;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to column `x`, row `y` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Whatever the user's terminal is configured with.
    #[default]
    Default,
    SteadyBlock,
    SteadyBar,
}

pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    match shape {
        CursorShape::Default => w.write_all(b"\x1b[0 q"),
        CursorShape::SteadyBlock => w.write_all(b"\x1b[2 q"),
        CursorShape::SteadyBar => w.write_all(b"\x1b[6 q"),
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Erase from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Reset every SGR attribute (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Emit one SGR sequence turning on every attribute in `style`, e.g.
/// `\x1b[1;3m` for bold + italic. Writes nothing for an empty style.
pub fn attrs(w: &mut impl Write, style: Style) -> io::Result<()> {
    const CODES: [(Style, &[u8]); 6] = [
        (Style::BOLD, b"1"),
        (Style::DIM, b"2"),
        (Style::ITALIC, b"3"),
        (Style::UNDERLINE, b"4"),
        (Style::INVERSE, b"7"),
        (Style::STRIKETHROUGH, b"9"),
    ];

    if style.is_empty() {
        return Ok(());
    }
    w.write_all(b"\x1b[")?;
    let mut first = true;
    for (flag, code) in CODES {
        if style.contains(flag) {
            if !first {
                w.write_all(b";")?;
            }
            w.write_all(code)?;
            first = false;
        }
    }
    w.write_all(b"m")
}

// ─── Modes ───────────────────────────────────────────────────────────────────

/// Begin synchronized output (DEC 2026); the terminal holds the frame until
/// [`end_sync`].
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

/// Switch to the alternate screen (DEC 1049), preserving the shell's content.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

/// Ask the terminal to wrap pasted text in `CSI 200~` / `CSI 201~` (DEC 2004).
#[inline]
pub fn enable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2004l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
