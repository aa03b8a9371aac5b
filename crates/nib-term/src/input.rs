// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and paste events. Covers what a note
// editor's keymap binds:
//
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - CSI sequences for arrows and editing keys, with xterm modifier
//   parameters (`ESC [ 1 ; 5 C` is Ctrl+Right)
// - SS3 arrows and Home/End (application cursor mode)
// - `CSI u` keys, sent by terminals that disambiguate modified keys
// - Shift+Tab (`ESC [ Z`) and Alt+key (ESC prefix)
// - Bracketed paste, delivered as one event however many reads it spans
// - UTF-8 multi-byte characters
//
// Sequences can be split across reads, so the parser keeps unconsumed bytes
// between calls to [`Parser::advance`]. A lone ESC stays pending until the
// caller's timeout fires and [`Parser::flush`] turns it into the Escape key.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text between bracketed-paste delimiters, unmodified.
    Paste(String),
}

/// A key with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// True when Ctrl is held (with or without others).
    #[inline]
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }
}

/// Identity of a key. Printable characters use [`Char`](KeyCode::Char);
/// Ctrl+letter arrives as the lowercase letter with [`Modifiers::CTRL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys, as the xterm encoding's bitmask (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Stateful byte-to-event decoder.
#[derive(Debug)]
pub struct Parser {
    /// Bytes not yet consumed by a complete event.
    buf: Vec<u8>,
    /// Inside a bracketed paste, waiting for its closing delimiter.
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
            in_paste: false,
        }
    }

    /// Feed bytes and return every event they complete. Incomplete trailing
    /// sequences are kept for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let remaining = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(remaining, PASTE_END) else {
                    break;
                };
                let text = String::from_utf8_lossy(&remaining[..end]).into_owned();
                events.push(Event::Paste(text));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if remaining.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste opener could still become one.
            if remaining.len() < PASTE_START.len()
                && remaining.len() > 2
                && PASTE_START.starts_with(remaining)
            {
                break;
            }

            match try_parse(remaining) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        events
    }

    /// True when bytes are waiting for more input (or a flush).
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes after a quiet period: a lone ESC becomes the
    /// Escape key and other leftovers become literal keys. An unterminated
    /// paste is delivered as is.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            self.in_paste = false;
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            return vec![Event::Paste(text)];
        }

        let mut events = Vec::new();
        for &byte in &self.buf {
            let event = match byte {
                0x1B => press(KeyCode::Escape),
                0x7F => press(KeyCode::Backspace),
                b @ 0x01..=0x1A => ctrl_key(KeyCode::Char(char::from(b + b'a' - 1))),
                b @ 0x20..=0x7E => press(KeyCode::Char(char::from(b))),
                _ => continue,
            };
            events.push(event);
        }
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    /// An event and the number of bytes it consumed.
    Event(Event, usize),
    Incomplete,
    /// Unrecognised bytes to drop.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(ctrl_key(KeyCode::Char(' ')), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(ctrl_key(KeyCode::Char(char::from(b + b'a' - 1))), 1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    if buf.len() < 2 {
        return Parsed::Incomplete;
    }
    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        0x7F => Parsed::Event(key_with(KeyCode::Backspace, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(
                KeyCode::Char(char::from(b + b'a' - 1)),
                Modifiers::ALT | Modifiers::CTRL,
            ),
            2,
        ),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes run until a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |p| decode_modifiers(p.0));

    let code = match final_byte {
        b'~' => match params.first().map_or(0, |p| p.0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Parsed::Skip(consumed),
        },
        b'u' => return parse_csi_u(&params, consumed),
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'Z' => return Parsed::Event(key_with(KeyCode::Tab, Modifiers::SHIFT), consumed),
        _ => return Parsed::Skip(consumed),
    };
    Parsed::Event(key_with(code, modifiers), consumed)
}

/// `CSI codepoint ; modifiers[:event] u`. Release events are dropped.
fn parse_csi_u(params: &[Param], consumed: usize) -> Parsed {
    let codepoint = params.first().map_or(0, |p| p.0);
    let (modifier, event_type) = params.get(1).map_or((0, 0), |p| (p.0, p.1));
    if event_type == 3 {
        return Parsed::Skip(consumed);
    }

    let code = match codepoint {
        27 => KeyCode::Escape,
        13 => KeyCode::Enter,
        9 => KeyCode::Tab,
        127 | 8 => KeyCode::Backspace,
        cp => match char::from_u32(u32::from(cp)) {
            Some(ch) if !ch.is_control() => KeyCode::Char(ch),
            _ => return Parsed::Skip(consumed),
        },
    };
    Parsed::Event(key_with(code, decode_modifiers(modifier)), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(press(code), 3)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    match std::str::from_utf8(&buf[..expected]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Parsed::Event(press(KeyCode::Char(ch)), expected),
        None => Parsed::Skip(1),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn ctrl_key(code: KeyCode) -> Event {
    key_with(code, Modifiers::CTRL)
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// One CSI parameter: `(value, colon sub-parameter)`.
struct Param(u16, u16);

/// Parse `1;5` or `97;5:3` style parameter lists.
fn parse_params(raw: &[u8]) -> Vec<Param> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            let mut parts = field.split(|&b| b == b':');
            let main = parts.next().map_or(0, parse_u16);
            let sub = parts.next().map_or(0, parse_u16);
            Param(main, sub)
        })
        .collect()
}

fn parse_u16(digits: &[u8]) -> u16 {
    digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |acc, &b| {
            acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
        })
}

/// Decode an xterm modifier parameter (`1 + bitmask`; 0 and 1 mean none).
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let bits = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(bits as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
