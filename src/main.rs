// SPDX-License-Identifier: MIT
//
// nib — a terminal note editor with inline markdown-style formatting.
//
// This binary wires the two library crates together:
//
//   nib-term   → terminal control, input parsing, frame rendering, event loop
//   nib-editor → text buffer, cursor, selection, formatting, undo history
//
// `NoteApp` implements nib-term's App trait. Each keypress flows through:
//
//   stdin → parser → keymap → NoteApp::execute → Editor mutation
//   paint → View::render → frame → row-diff renderer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ note text                    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ status line                  │  ← name, position, B I U S
//   ├──────────────────────────────┤
//   │ message line                 │  ← feedback from the last command
//   └──────────────────────────────┘

mod app;
mod cli;
mod clipboard;
mod config;
mod keymap;
mod logging;
mod notes;
mod view;

use anyhow::Context;
use clap::Parser;
use nib_term::event_loop::EventLoop;

use crate::app::NoteApp;
use crate::cli::Args;
use crate::clipboard::Clipboard;
use crate::config::Config;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The guard flushes buffered log lines on drop, so it lives until exit.
    let _guard = match logging::init(&logging::logs_dir(), args.log_level.as_deref()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("nib: logging disabled: {e:#}");
            None
        }
    };

    let config = Config::load(args.config.as_deref());
    let path = args.note_path(&config.notes_dir);
    let note = notes::load(&path).with_context(|| format!("cannot open {}", path.display()))?;
    tracing::info!(
        path = %note.path.display(),
        lines = note.lines.len(),
        ending = %note.line_ending,
        existed = note.existed,
        "opened note"
    );

    let mut app = NoteApp::new(note, &config, Clipboard::new());
    EventLoop::new()
        .run(&mut app)
        .context("terminal session failed")?;

    tracing::info!("exiting");
    Ok(())
}
