// SPDX-License-Identifier: MIT
//
// The note editor application.
//
// `NoteApp` implements nib-term's `App` trait. Each event flows through:
//
//   event → keymap::command_for → execute → Editor method → message
//   paint → View::render → Frame → row-diff renderer → terminal
//
// Every command leaves at most one message for the message line; the
// previous one is cleared when the next command runs.

use std::path::PathBuf;

use nib_editor::buffer::TextBuffer;
use nib_editor::editor::{Editor, FormatOutcome};
use nib_editor::marker::FormatKind;
use nib_term::event_loop::{Action, App};
use nib_term::frame::Frame;
use nib_term::input::Event;

use crate::clipboard::{Clipboard, Target};
use crate::config::Config;
use crate::keymap::{self, Command};
use crate::notes::{self, LineEnding, Note};
use crate::view::{Message, MessageKind, View, ViewOptions};

pub struct NoteApp {
    editor: Editor,
    view: View,
    clipboard: Clipboard,
    path: PathBuf,
    name: String,
    line_ending: LineEnding,
    confirm_quit: bool,
    /// Set by a first Ctrl+Q with unsaved changes.
    quit_armed: bool,
    message: Option<Message>,
    cursor_screen: Option<(u16, u16)>,
}

impl NoteApp {
    #[must_use]
    pub fn new(note: Note, config: &Config, clipboard: Clipboard) -> Self {
        let name = note.display_name();
        let message = if note.existed {
            format!("{} lines", note.lines.len())
        } else {
            "New note".to_string()
        };
        let buffer = TextBuffer::from_lines(note.lines);
        Self {
            editor: Editor::from_buffer(buffer, config.history_depth),
            view: View::new(ViewOptions {
                tab_width: config.tab_width,
                scroll_margin: config.scroll_margin,
            }),
            clipboard,
            path: note.path,
            name,
            line_ending: note.line_ending,
            confirm_quit: config.confirm_quit,
            quit_armed: false,
            message: Some(Message::new(MessageKind::Info, message)),
            cursor_screen: None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    #[inline]
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    fn say(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(Message::new(kind, text));
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Action {
        tracing::debug!(?command, "dispatch");
        self.message = None;
        if command != Command::Quit {
            self.quit_armed = false;
        }

        match command {
            Command::Move { motion, extend } => self.editor.move_cursor(motion, extend),
            Command::Insert(ch) => self.editor.insert_char(ch),
            Command::Newline => self.editor.insert_newline(),
            Command::Tab => self.editor.insert_tab(),
            Command::Unindent => {
                self.editor.unindent();
            }
            Command::Backspace => {
                self.editor.backspace();
            }
            Command::DeleteForward => {
                self.editor.delete_forward();
            }
            Command::OpenLineAbove => self.editor.open_line_above(),
            Command::OpenLineBelow => self.editor.open_line_below(),
            Command::SelectAll => {
                self.editor.select_all();
                self.say(MessageKind::Info, "Selected all");
            }
            Command::ClearSelection => self.editor.clear_selection(),
            Command::Copy => self.copy(),
            Command::Cut => self.cut(),
            Command::Paste => match self.clipboard.paste() {
                Some(text) => self.paste(&text),
                None => self.say(MessageKind::Info, "Clipboard is empty"),
            },
            Command::PasteText(text) => self.paste_typed(&text),
            Command::Format(kind) => self.format(kind),
            Command::Undo => {
                if self.editor.undo() {
                    self.say(MessageKind::Info, "Undo");
                } else {
                    self.say(MessageKind::Info, "Nothing to undo");
                }
            }
            Command::Redo => {
                if self.editor.redo() {
                    self.say(MessageKind::Info, "Redo");
                } else {
                    self.say(MessageKind::Info, "Nothing to redo");
                }
            }
            Command::Save => self.save(),
            Command::Quit => return self.quit(),
        }
        Action::Continue
    }

    /// Copy the selection. Also what SIGINT does.
    fn copy(&mut self) {
        let Some(text) = self.editor.selected_text() else {
            self.say(MessageKind::Info, "No text selected");
            return;
        };
        let target = self.clipboard.copy(&text);
        self.say(
            MessageKind::Success,
            format!("Copied {} chars{}", text.chars().count(), target_suffix(target)),
        );
    }

    fn cut(&mut self) {
        let Some(text) = self.editor.cut() else {
            self.say(MessageKind::Info, "No text selected");
            return;
        };
        let target = self.clipboard.copy(&text);
        self.say(
            MessageKind::Success,
            format!("Cut {} chars{}", text.chars().count(), target_suffix(target)),
        );
    }

    fn paste(&mut self, text: &str) {
        self.editor.paste(text);
        self.say(
            MessageKind::Success,
            format!("Pasted {} chars", text.chars().count()),
        );
    }

    /// Bracketed paste goes in as typed text, so the sticky toggles apply,
    /// but as an undo step of its own.
    fn paste_typed(&mut self, text: &str) {
        self.editor.save_state();
        self.editor.insert_text(text);
        self.editor.save_state();
        self.say(
            MessageKind::Success,
            format!("Pasted {} chars", text.chars().count()),
        );
    }

    fn format(&mut self, kind: FormatKind) {
        let name = kind.name();
        match self.editor.toggle_format(kind) {
            FormatOutcome::Applied(_) => {
                self.say(MessageKind::Success, format!("{name} formatting applied to selection"));
            }
            FormatOutcome::Removed(_) => {
                self.say(MessageKind::Success, format!("{name} formatting removed"));
            }
            FormatOutcome::SteppedOut(_) => self.say(MessageKind::Info, format!("{name} disabled")),
            FormatOutcome::Split(_) => {
                self.say(MessageKind::Info, format!("{name} split here, type to continue"));
            }
            FormatOutcome::SplitCancelled(_) => {
                self.say(MessageKind::Info, format!("{name} split cancelled"));
            }
            FormatOutcome::Toggled(status) => self.say(MessageKind::Info, status),
            FormatOutcome::Rejected => {
                self.say(MessageKind::Warning, "Cannot format here");
            }
        }
    }

    fn save(&mut self) {
        match notes::save(&self.path, self.editor.buffer().lines(), self.line_ending) {
            Ok(count) => {
                self.editor.mark_saved();
                self.say(
                    MessageKind::Success,
                    format!("Saved {count} lines to {}", self.path.display()),
                );
            }
            Err(e) => {
                tracing::warn!("save failed: {e}");
                self.say(MessageKind::Error, e.to_string());
            }
        }
    }

    fn quit(&mut self) -> Action {
        if self.editor.is_modified() && self.confirm_quit && !self.quit_armed {
            self.quit_armed = true;
            self.say(
                MessageKind::Warning,
                "Unsaved changes! Press Ctrl+Q again to quit.",
            );
            return Action::Continue;
        }
        Action::Quit
    }
}

const fn target_suffix(target: Target) -> &'static str {
    match target {
        Target::System => " to system clipboard",
        Target::Register => "",
    }
}

impl App for NoteApp {
    fn on_event(&mut self, event: &Event) -> Action {
        match keymap::command_for(event) {
            Some(command) => self.execute(command),
            None => Action::Continue,
        }
    }

    fn on_interrupt(&mut self) -> Action {
        tracing::debug!("SIGINT: copying selection");
        self.copy();
        Action::Continue
    }

    fn paint(&mut self, frame: &mut Frame) {
        self.cursor_screen = self
            .view
            .render(&self.editor, frame, &self.name, self.message.as_ref());
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor_screen
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use nib_editor::cursor::Motion;
    use nib_editor::position::Position;
    use nib_term::input::{KeyCode, KeyEvent, Modifiers};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    fn app_at(path: &Path, lines: &[&str]) -> NoteApp {
        let note = Note {
            path: path.to_path_buf(),
            lines: lines.iter().map(ToString::to_string).collect(),
            line_ending: LineEnding::Lf,
            existed: true,
        };
        NoteApp::new(note, &Config::default(), Clipboard::in_process())
    }

    fn app(lines: &[&str]) -> NoteApp {
        app_at(Path::new("/nonexistent/nib-test/note.md"), lines)
    }

    fn lines(app: &NoteApp) -> Vec<String> {
        app.editor().buffer().lines().to_vec()
    }

    fn message(app: &NoteApp) -> &str {
        app.message().map_or("", |m| m.text.as_str())
    }

    fn key(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn ctrl(ch: char) -> Event {
        key(KeyCode::Char(ch), Modifiers::CTRL)
    }

    fn type_text(app: &mut NoteApp, text: &str) {
        for ch in text.chars() {
            app.on_event(&key(KeyCode::Char(ch), Modifiers::empty()));
        }
    }

    // ── Typing and history ────────────────────────────────────────────

    #[test]
    fn typing_then_undo_redo() {
        let mut app = app(&[""]);
        type_text(&mut app, "hi");
        assert_eq!(lines(&app), vec!["hi"]);
        app.on_event(&ctrl('z'));
        assert_eq!(lines(&app), vec![""]);
        assert_eq!(message(&app), "Undo");
        app.on_event(&ctrl('y'));
        assert_eq!(lines(&app), vec!["hi"]);
        assert_eq!(message(&app), "Redo");
    }

    #[test]
    fn empty_history_messages() {
        let mut app = app(&["x"]);
        app.on_event(&ctrl('z'));
        assert_eq!(message(&app), "Nothing to undo");
        app.on_event(&ctrl('y'));
        assert_eq!(message(&app), "Nothing to redo");
    }

    // ── Clipboard ─────────────────────────────────────────────────────

    #[test]
    fn copy_without_selection() {
        let mut app = app(&["abc"]);
        app.on_event(&ctrl('c'));
        assert_eq!(message(&app), "No text selected");
    }

    #[test]
    fn cut_then_paste() {
        let mut app = app(&["hello world"]);
        for _ in 0..5 {
            app.execute(Command::Move { motion: Motion::Right, extend: true });
        }
        app.on_event(&ctrl('x'));
        assert_eq!(lines(&app), vec![" world"]);
        assert_eq!(message(&app), "Cut 5 chars");
        app.execute(Command::Move { motion: Motion::End, extend: false });
        app.on_event(&ctrl('v'));
        assert_eq!(lines(&app), vec![" worldhello"]);
        assert_eq!(message(&app), "Pasted 5 chars");
    }

    #[test]
    fn paste_with_empty_clipboard() {
        let mut app = app(&[""]);
        app.on_event(&ctrl('v'));
        assert_eq!(message(&app), "Clipboard is empty");
    }

    #[test]
    fn bracketed_paste_splits_lines() {
        let mut app = app(&["ab"]);
        app.execute(Command::Move { motion: Motion::Right, extend: false });
        app.on_event(&Event::Paste("1\n2".into()));
        assert_eq!(lines(&app), vec!["a1", "2b"]);
    }

    #[test]
    fn bracketed_paste_takes_sticky_formatting() {
        let mut app = app(&[""]);
        app.on_event(&ctrl('b'));
        app.on_event(&Event::Paste("hi".into()));
        assert_eq!(lines(&app), vec!["**hi**"]);
        assert_eq!(message(&app), "Pasted 2 chars");
        type_text(&mut app, "!");
        app.on_event(&ctrl('z'));
        assert_eq!(lines(&app), vec!["**hi**"]);
        app.on_event(&ctrl('z'));
        assert_eq!(lines(&app), vec![""]);
    }

    #[test]
    fn interrupt_copies_selection() {
        let mut app = app(&["abc"]);
        app.on_event(&ctrl('a'));
        assert_eq!(app.on_interrupt(), Action::Continue);
        assert_eq!(message(&app), "Copied 3 chars");
        app.on_event(&key(KeyCode::End, Modifiers::empty()));
        app.on_event(&ctrl('v'));
        assert_eq!(lines(&app), vec!["abcabc"]);
    }

    // ── Formatting ────────────────────────────────────────────────────

    #[test]
    fn bold_selection_and_back() {
        let mut app = app(&["hello"]);
        app.on_event(&ctrl('a'));
        app.on_event(&ctrl('b'));
        assert_eq!(lines(&app), vec!["**hello**"]);
        assert_eq!(message(&app), "Bold formatting applied to selection");
        app.on_event(&ctrl('b'));
        assert_eq!(lines(&app), vec!["hello"]);
        assert_eq!(message(&app), "Bold formatting removed");
    }

    #[test]
    fn sticky_toggle_reports_status() {
        let mut app = app(&[""]);
        app.on_event(&ctrl('u'));
        assert_eq!(message(&app), "Underline enabled");
        type_text(&mut app, "x");
        assert_eq!(lines(&app), vec!["<u>x</u>"]);
    }

    #[test]
    fn formatting_inside_tag_is_rejected() {
        // Unmatched, so motion can stop between `<` and `u`.
        let mut app = app(&["a<u>b"]);
        for _ in 0..2 {
            app.execute(Command::Move { motion: Motion::Right, extend: false });
        }
        assert_eq!(app.editor().cursor(), Position::new(0, 2));
        app.on_event(&ctrl('t'));
        assert_eq!(lines(&app), vec!["a<u>b"]);
        assert_eq!(app.message().map(|m| m.kind), Some(MessageKind::Warning));
        assert_eq!(message(&app), "Cannot format here");
        assert!(app.editor().session().active().is_empty());
    }

    #[test]
    fn split_waits_for_typing() {
        let mut app = app(&["**abcd**"]);
        // The first step jumps over the opening delimiter.
        for _ in 0..3 {
            app.execute(Command::Move { motion: Motion::Right, extend: false });
        }
        assert_eq!(app.editor().cursor(), Position::new(0, 4));
        app.on_event(&ctrl('b'));
        assert_eq!(message(&app), "Bold split here, type to continue");
        assert_eq!(lines(&app), vec!["**abcd**"]);
        app.on_event(&ctrl('b'));
        assert_eq!(message(&app), "Bold split cancelled");
        app.on_event(&ctrl('b'));
        type_text(&mut app, "x");
        assert_eq!(lines(&app), vec!["**ab**x**cd**"]);
    }

    // ── Saving and quitting ───────────────────────────────────────────

    #[test]
    fn save_writes_note_and_clears_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes").join("n.md");
        let mut app = app_at(&path, &[""]);
        type_text(&mut app, "hi");
        assert!(app.editor().is_modified());
        app.on_event(&ctrl('s'));
        assert!(!app.editor().is_modified());
        assert!(message(&app).starts_with("Saved 1 lines to "));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");
    }

    #[test]
    fn save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_at(dir.path(), &["x"]);
        app.on_event(&ctrl('s'));
        assert_eq!(app.message().map(|m| m.kind), Some(MessageKind::Error));
    }

    #[test]
    fn quit_needs_confirmation_when_modified() {
        let mut app = app(&[""]);
        type_text(&mut app, "x");
        assert_eq!(app.on_event(&ctrl('q')), Action::Continue);
        assert_eq!(message(&app), "Unsaved changes! Press Ctrl+Q again to quit.");
        assert_eq!(app.on_event(&ctrl('q')), Action::Quit);
    }

    #[test]
    fn other_keys_disarm_quit() {
        let mut app = app(&[""]);
        type_text(&mut app, "x");
        app.on_event(&ctrl('q'));
        app.on_event(&key(KeyCode::Left, Modifiers::empty()));
        assert_eq!(app.on_event(&ctrl('q')), Action::Continue);
    }

    #[test]
    fn clean_note_quits_at_once() {
        let mut app = app(&["x"]);
        assert_eq!(app.on_event(&ctrl('q')), Action::Quit);
    }

    // ── Painting ──────────────────────────────────────────────────────

    #[test]
    fn paint_sets_cursor() {
        let mut app = app(&["abc"]);
        app.on_event(&key(KeyCode::End, Modifiers::empty()));
        let mut frame = Frame::new(40, 6);
        app.paint(&mut frame);
        assert_eq!(app.cursor(), Some((3, 0)));
        let status: String = frame.row(4).iter().map(|s| s.text.as_str()).collect();
        assert!(status.starts_with(" note.md"));
    }

    #[test]
    fn new_note_message() {
        let note = Note {
            path: PathBuf::from("fresh.md"),
            lines: vec![String::new()],
            line_ending: LineEnding::Lf,
            existed: false,
        };
        let app = NoteApp::new(note, &Config::default(), Clipboard::in_process());
        assert_eq!(message(&app), "New note");
    }
}
