// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop.
//
// Stdin chunks arrive from the reader thread, the parser turns them into
// events, the application handles them and paints a frame, and the renderer
// writes out the rows that changed. Everything but the read happens here,
// on the caller's thread.
//
// The loop waits on the reader channel with a timeout. Bytes wake it at
// once. When the timeout fires with a lone ESC pending, the parser is
// flushed so the Escape key arrives. Either way the loop then checks the
// signal flags. Nothing is painted unless something changed.
//
// SIGWINCH and SIGINT handlers only set atomics. Raw mode turns ISIG off, so
// Ctrl+C normally arrives as a key; SIGINT still shows up when it is sent
// from outside (`kill -INT`), and the app decides what that means.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::ansi;
use crate::frame::{Frame, Renderer};
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── Signals ─────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);
static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_signal_handlers() {
    install_handler(libc::SIGWINCH, sigwinch_handler);
    install_handler(libc::SIGINT, sigint_handler);
}

#[cfg(unix)]
fn install_handler(signal: libc::c_int, handler: extern "C" fn(libc::c_int)) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(signal, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn sigint_handler(_sig: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the loop does after the application handles something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A terminal application driven by [`EventLoop`].
///
/// Per iteration the loop calls [`on_event`](App::on_event) for each decoded
/// event, [`on_resize`](App::on_resize) and
/// [`on_interrupt`](App::on_interrupt) when their signals arrived, then
/// [`paint`](App::paint) and [`cursor`](App::cursor) if anything happened.
pub trait App {
    fn on_event(&mut self, event: &Event) -> Action;

    /// The frame has already been resized when this is called.
    fn on_resize(&mut self, _size: Size) {}

    /// SIGINT arrived.
    fn on_interrupt(&mut self) -> Action {
        Action::Continue
    }

    /// Paint the whole screen. The frame is blank on entry.
    fn paint(&mut self, frame: &mut Frame);

    /// Where to show the hardware cursor after painting, as `(x, y)`.
    /// `None` hides it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long the loop waits for input before flushing a pending ESC and
    /// checking signals.
    pub escape_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            escape_timeout: Duration::from_millis(25),
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, parser and renderer. [`run`](Self::run) returns when
/// the application quits or stdin closes.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    config: LoopConfig,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoopConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoopConfig) -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: Renderer::new(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until [`Action::Quit`], and restore the
    /// terminal even when the loop fails.
    ///
    /// # Errors
    ///
    /// Returns an error if entering or leaving the terminal, spawning the
    /// reader, or writing a frame fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_signal_handlers();

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(e) => Err(e),
        };

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = Frame::new(size.cols, size.rows);
        let mut dirty = true;

        loop {
            let events = match rx.recv_timeout(self.config.escape_timeout) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => self.parser.flush(),
                Err(RecvTimeoutError::Timeout) => Vec::new(),
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("input channel closed");
                    return Ok(());
                }
            };
            for event in &events {
                if app.on_event(event) == Action::Quit {
                    return Ok(());
                }
            }
            dirty |= !events.is_empty();

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!(cols = size.cols, rows = size.rows, "resize");
                frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            if SIGINT_RECEIVED.swap(false, Ordering::Relaxed) {
                if app.on_interrupt() == Action::Quit {
                    return Ok(());
                }
                dirty = true;
            }

            if dirty {
                self.draw(app, &mut frame)?;
                dirty = false;
            }
        }
    }

    fn draw(&mut self, app: &mut impl App, frame: &mut Frame) -> io::Result<()> {
        frame.clear();
        app.paint(frame);
        self.renderer.render(frame);
        self.renderer.flush()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        if let Some((x, y)) = app.cursor() {
            ansi::cursor_to(&mut lock, x, y)?;
            ansi::cursor_show(&mut lock)?;
        } else {
            ansi::cursor_hide(&mut lock)?;
        }
        lock.flush()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
