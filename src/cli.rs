// SPDX-License-Identifier: MIT
//
// Command-line arguments.

use std::path::{Path, PathBuf};

use clap::Parser;

/// Note file opened when no path is given, inside the notes directory.
pub const SCRATCH_NOTE: &str = "scratch.md";

/// A terminal note editor with inline formatting
#[derive(Parser, Debug)]
#[command(name = "nib", version, about)]
pub struct Args {
    /// Note to open (created on first save if missing)
    #[arg(value_name = "NOTE")]
    pub note: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `nib=trace` (RUST_LOG wins when set)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Args {
    /// The note to edit: the given path, else the scratch note in `notes_dir`.
    #[must_use]
    pub fn note_path(&self, notes_dir: &Path) -> PathBuf {
        self.note
            .clone()
            .unwrap_or_else(|| notes_dir.join(SCRATCH_NOTE))
    }
}
