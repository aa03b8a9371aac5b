//! # nib-editor — Editing engine for nib
//!
//! The engine behind a terminal note editor whose formatting lives inline in
//! the text as markers (`**bold**`, `*italic*`, `<u>underline</u>`,
//! `~~strikethrough~~`). No I/O happens here: callers hand in lines, drive the
//! [`editor::Editor`] one action at a time, and read state back to draw it.
//!
//! - **[`position`]** — `Position` (line, byte col) and `Range` types, 0-indexed
//! - **[`utf8`]** — character-boundary arithmetic on byte offsets
//! - **[`buffer`]** — `TextBuffer`, a never-empty vector of lines
//! - **[`cursor`]** — UTF-8 safe motions over a buffer
//! - **[`selection`]** — anchor/head selection with marker-aware expansion
//! - **[`marker`]** — parsing of inline formatting markers
//! - **[`format`]** — sticky formatting session, wrap/split/extract
//! - **[`history`]** — diff-based undo/redo
//! - **[`editor`]** — the editing session tying it all together

pub mod buffer;
pub mod cursor;
pub mod editor;
pub mod format;
pub mod history;
pub mod marker;
pub mod position;
pub mod selection;
pub mod utf8;
