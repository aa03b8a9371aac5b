// SPDX-License-Identifier: MIT
//
// Clipboard access.
//
// The system clipboard is opened once, on first use; headless sessions and
// bare consoles have none. Copied text is also kept in an in-process
// register, so copy and paste keep working inside the editor either way.

/// Where copied text ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    System,
    Register,
}

pub struct Clipboard {
    system: Option<arboard::Clipboard>,
    opened: bool,
    register: String,
}

impl Clipboard {
    /// A clipboard that opens the system one on first use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            system: None,
            opened: false,
            register: String::new(),
        }
    }

    /// A clipboard that never touches the system one.
    #[must_use]
    pub const fn in_process() -> Self {
        Self {
            system: None,
            opened: true,
            register: String::new(),
        }
    }

    fn system(&mut self) -> Option<&mut arboard::Clipboard> {
        if !self.opened {
            self.opened = true;
            match arboard::Clipboard::new() {
                Ok(cb) => self.system = Some(cb),
                Err(e) => tracing::warn!("system clipboard unavailable: {e}"),
            }
        }
        self.system.as_mut()
    }

    pub fn copy(&mut self, text: &str) -> Target {
        self.register.clear();
        self.register.push_str(text);
        match self.system().map(|cb| cb.set_text(text.to_owned())) {
            Some(Ok(())) => Target::System,
            Some(Err(e)) => {
                tracing::warn!("clipboard write failed: {e}");
                Target::Register
            }
            None => Target::Register,
        }
    }

    /// The system clipboard's text, else the register. `None` when both are
    /// empty.
    pub fn paste(&mut self) -> Option<String> {
        if let Some(text) = self
            .system()
            .and_then(|cb| cb.get_text().ok())
            .filter(|t| !t.is_empty())
        {
            return Some(text);
        }
        (!self.register.is_empty()).then(|| self.register.clone())
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}
