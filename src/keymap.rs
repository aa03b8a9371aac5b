// SPDX-License-Identifier: MIT
//
// Key bindings.
//
// Maps decoded input events to editor commands, one command per event. There
// is a single mode, so what a key does never depends on earlier keys. The
// double Ctrl+Q confirmation lives in the app.
//
// Legacy terminals send Tab and Ctrl+I as the same byte, so Ctrl+I only
// toggles italic on terminals that report modified keys (`CSI u`). Alt+I is
// bound as well so italic is reachable everywhere.

use nib_editor::cursor::Motion;
use nib_editor::marker::FormatKind;
use nib_term::input::{Event, KeyCode, KeyEvent, Modifiers};

/// One user-facing action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move { motion: Motion, extend: bool },
    Insert(char),
    Newline,
    Tab,
    Unindent,
    Backspace,
    DeleteForward,
    OpenLineAbove,
    OpenLineBelow,
    SelectAll,
    ClearSelection,
    Copy,
    Cut,
    /// Paste from the clipboard.
    Paste,
    /// Paste text the terminal delivered (bracketed paste).
    PasteText(String),
    Format(FormatKind),
    Undo,
    Redo,
    Save,
    Quit,
}

/// The command bound to `event`, if any.
#[must_use]
pub fn command_for(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) => command_for_key(*key),
        Event::Paste(text) => Some(Command::PasteText(text.clone())),
    }
}

#[must_use]
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    let mods = key.modifiers;
    let shift = mods.contains(Modifiers::SHIFT);
    let ctrl = mods.contains(Modifiers::CTRL);
    let alt = mods.contains(Modifiers::ALT);

    let command = match key.code {
        KeyCode::Left | KeyCode::Right => {
            let word = ctrl || alt;
            let motion = match (key.code, word) {
                (KeyCode::Left, false) => Motion::Left,
                (KeyCode::Left, true) => Motion::WordLeft,
                (_, false) => Motion::Right,
                (_, true) => Motion::WordRight,
            };
            Command::Move { motion, extend: shift }
        }
        KeyCode::Up => Command::Move { motion: Motion::Up, extend: shift },
        KeyCode::Down => Command::Move { motion: Motion::Down, extend: shift },
        // Any modifier on Home/End selects: several terminals keep Shift+Home
        // for scrollback, so Ctrl and Alt stand in for it.
        KeyCode::Home => Command::Move { motion: Motion::Home, extend: !mods.is_empty() },
        KeyCode::End => Command::Move { motion: Motion::End, extend: !mods.is_empty() },

        KeyCode::Backspace => Command::Backspace,
        KeyCode::Delete => Command::DeleteForward,
        KeyCode::Enter => Command::Newline,
        KeyCode::Tab if shift => Command::Unindent,
        KeyCode::Tab => Command::Tab,
        KeyCode::Escape => Command::ClearSelection,
        KeyCode::Insert if shift => Command::Paste,
        KeyCode::Insert if ctrl => Command::Copy,

        KeyCode::Char(ch) if ctrl => return ctrl_command(ch.to_ascii_lowercase(), shift),
        KeyCode::Char(ch) if alt => return alt_command(ch.to_ascii_lowercase()),
        KeyCode::Char(ch) if !ch.is_control() => Command::Insert(ch),

        _ => return None,
    };
    Some(command)
}

fn ctrl_command(ch: char, shift: bool) -> Option<Command> {
    let command = match ch {
        'a' => Command::SelectAll,
        'c' => Command::Copy,
        'x' => Command::Cut,
        'v' => Command::Paste,
        'z' if shift => Command::Redo,
        'z' => Command::Undo,
        'y' => Command::Redo,
        's' => Command::Save,
        'b' => Command::Format(FormatKind::Bold),
        'i' => Command::Format(FormatKind::Italic),
        'u' => Command::Format(FormatKind::Underline),
        't' => Command::Format(FormatKind::Strikethrough),
        'o' => Command::OpenLineAbove,
        'k' => Command::OpenLineBelow,
        'q' => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn alt_command(ch: char) -> Option<Command> {
    match ch {
        'i' => Some(Command::Format(FormatKind::Italic)),
        'c' => Some(Command::Copy),
        'v' => Some(Command::Paste),
        _ => None,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
