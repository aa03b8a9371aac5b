// SPDX-License-Identifier: MIT
//
// Note files on disk.
//
// A note is plain text, one buffer line per file line, with formatting kept
// as the inline markers the editor works with. Loading records the file's
// line ending so saving writes it back the same way.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("cannot create {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

// ─── LineEnding ─────────────────────────────────────────────────────────────

/// Line ending style of a note file. New notes use `Lf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// The style of the first line break in `text`; `Lf` when there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        match bytes.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) if bytes[i] == b'\n' => Self::Lf,
            Some(i) if bytes.get(i + 1) == Some(&b'\n') => Self::CrLf,
            Some(_) => Self::Cr,
            None => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lf => "LF",
            Self::CrLf => "CRLF",
            Self::Cr => "CR",
        })
    }
}

// ─── Note ───────────────────────────────────────────────────────────────────

/// A loaded note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub path: PathBuf,
    /// Never empty; an empty file is one empty line.
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
    /// False when the file did not exist yet.
    pub existed: bool,
}

impl Note {
    /// File name for the status line.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

/// Load the note at `path`. A missing file opens as a new empty note.
///
/// # Errors
///
/// [`NoteError::Read`] if the file exists but cannot be read,
/// [`NoteError::InvalidUtf8`] if it is not text.
pub fn load(path: &Path) -> Result<Note, NoteError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "new note");
            return Ok(Note {
                path: path.to_path_buf(),
                lines: vec![String::new()],
                line_ending: LineEnding::Lf,
                existed: false,
            });
        }
        Err(source) => {
            return Err(NoteError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let text = String::from_utf8(bytes).map_err(|_| NoteError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;

    let line_ending = LineEnding::detect(&text);
    let lines = split_lines(&text);
    tracing::info!(path = %path.display(), lines = lines.len(), %line_ending, "loaded note");
    Ok(Note {
        path: path.to_path_buf(),
        lines,
        line_ending,
        existed: true,
    })
}

/// Write `lines` to `path` joined by `ending`, with a trailing line break,
/// creating parent directories as needed. Returns the number of lines.
///
/// # Errors
///
/// [`NoteError::CreateDir`] or [`NoteError::Write`] on I/O failure.
pub fn save(path: &Path, lines: &[String], ending: LineEnding) -> Result<usize, NoteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| NoteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let sep = ending.as_str();
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + sep.len()).sum());
    for line in lines {
        text.push_str(line);
        text.push_str(sep);
    }

    fs::write(path, text).map_err(|source| NoteError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), lines = lines.len(), "saved note");
    Ok(lines.len())
}

/// Split on any of `\r\n`, `\n`, `\r`. A trailing break does not add an
/// empty line; an empty text is one empty line.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(i) = rest.find(['\n', '\r']) {
        lines.push(rest[..i].to_string());
        let skip = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + skip..];
    }
    if !rest.is_empty() || lines.is_empty() {
        lines.push(rest.to_string());
    }
    lines
}

// ─── Tests ──────────────────────────────────────────────────────────────────
