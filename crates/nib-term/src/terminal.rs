// SPDX-License-Identifier: MIT
//
// Terminal session: raw mode, the alternate screen and bracketed paste.
//
// Safety: termios, ioctl(TIOCGWINSZ), isatty and the raw fd write used by
// the panic hook have no safe wrapper in std. Each unsafe block holds one
// call.
#![allow(unsafe_code)]
//
// ISIG is off in raw mode, so Ctrl+C, Ctrl+Z and Ctrl+\ arrive as key bytes
// and the keymap can bind them. SIGINT can still come from `kill`; the event
// loop handles that separately.
//
// A panic while the terminal is raw would leave the user's shell unusable.
// The hook installed on the first `enter` writes a fixed restore sequence
// directly to fd 1 (the panicking frame may hold the stdout lock) and puts
// the saved termios back before the default hook prints.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when stdout is not a terminal.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// The size of the terminal on stdout, or `None` when there is no terminal
/// or it reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) } == 0;
    (ok && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Saved termios for the panic hook, which cannot reach the live [`RawMode`].
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Raw mode on stdin, holding the termios to restore.
#[cfg(unix)]
struct RawMode {
    saved: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// Switch stdin to raw mode. `Ok(None)` when stdin is not a terminal.
    fn enable() -> io::Result<Option<Self>> {
        if !is_tty() {
            return Ok(None);
        }
        let fd = libc::STDIN_FILENO;

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut termios = saved;
        unsafe { libc::cfmakeraw(&raw mut termios) };
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Some(Self { saved }))
    }

    fn restore(&self) -> io::Result<()> {
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.saved) }
            != 0
        {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
impl RawMode {
    const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }

    const fn restore(&self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Panic Hook ─────────────────────────────────────────────────────────────

/// What [`Terminal::leave`] writes, as one buffer: end synchronized output,
/// bracketed paste off, attributes and cursor shape reset, cursor shown,
/// alternate screen left last.
#[rustfmt::skip]
const RESTORE_SEQUENCE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_after_panic();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn restore_after_panic() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            RESTORE_SEQUENCE.as_ptr().cast::<libc::c_void>(),
            RESTORE_SEQUENCE.len(),
        );
    }
    if let Ok(slot) = SAVED_TERMIOS.lock() {
        if let Some(saved) = slot.as_ref() {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, saved);
            }
        }
    }
}

#[cfg(not(unix))]
fn restore_after_panic() {
    let mut out = io::stdout();
    let _ = out.write_all(RESTORE_SEQUENCE);
    let _ = out.flush();
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The editor's hold on the terminal. Nothing changes until
/// [`enter`](Self::enter); [`leave`](Self::leave), drop and the panic hook
/// all put it back.
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    active: bool,
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query after SIGWINCH. A failed query keeps the previous size.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, bar cursor and bracketed paste. Calling
    /// it again while active does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;
        // From here on, leave (or drop) has something to undo.
        self.active = true;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::clear_screen(&mut out)?;
        ansi::set_cursor_shape(&mut out, ansi::CursorShape::SteadyBar)?;
        ansi::enable_bracketed_paste(&mut out)?;
        out.flush()?;

        tracing::debug!(cols = self.size.cols, rows = self.size.rows, "terminal entered");
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Calling it while inactive does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let written = {
            let mut out = io::stdout().lock();
            out.write_all(RESTORE_SEQUENCE).and_then(|()| out.flush())
        };
        // termios goes back even when the screen write failed.
        if let Some(raw) = self.raw.take() {
            raw.restore()?;
        }
        written?;

        tracing::debug!("terminal restored");
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            tracing::warn!("failed to restore terminal: {e}");
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_terminal_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
        assert!(term.size().cols > 0 && term.size().rows > 0);
    }

    #[test]
    fn leave_without_enter_is_noop() {
        let mut term = Terminal::new();
        assert!(term.leave().is_ok());
        assert!(!term.is_active());
    }

    #[test]
    fn restore_sequence_matches_ansi_writers() {
        let mut expected = Vec::new();
        ansi::end_sync(&mut expected).unwrap();
        ansi::disable_bracketed_paste(&mut expected).unwrap();
        ansi::reset(&mut expected).unwrap();
        ansi::set_cursor_shape(&mut expected, ansi::CursorShape::Default).unwrap();
        ansi::cursor_show(&mut expected).unwrap();
        ansi::exit_alt_screen(&mut expected).unwrap();
        assert_eq!(RESTORE_SEQUENCE, expected.as_slice());
    }
}
