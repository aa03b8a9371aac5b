// SPDX-License-Identifier: MIT
//
// nib-term — Terminal layer for nib.
//
// Direct terminal control through termios and ANSI escape sequences, with
// no TUI framework underneath. The pieces, bottom up:
//
//   terminal   → raw mode, alternate screen, panic-safe restore
//   ansi       → byte-level escape sequences
//   input      → stdin bytes → key and paste events
//   frame      → styled rows, repainted only where they changed
//   reader     → background stdin thread feeding a channel
//   event_loop → the App trait and the loop that drives it

pub mod ansi;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod terminal;
