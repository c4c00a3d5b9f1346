//! Side-channel artifact files written by the external compiler.
//!
//! Each invocation of the tool overwrites a fixed set of files in its
//! working directory. They are read-only to us and carry no identity
//! beyond the latest read: every pass re-reads them in full.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Logical role of an artifact file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    Assembly,
    Quadruples,
    Warnings,
    Errors,
    SymbolTable,
}

impl ArtifactRole {
    pub const ALL: [ArtifactRole; 5] = [
        ArtifactRole::Assembly,
        ArtifactRole::Quadruples,
        ArtifactRole::Warnings,
        ArtifactRole::Errors,
        ArtifactRole::SymbolTable,
    ];

    /// Fixed relative filename the tool writes this artifact to.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactRole::Assembly => "assembly.txt",
            ArtifactRole::Quadruples => "quadruples.txt",
            ArtifactRole::Warnings => "warnings.txt",
            ArtifactRole::Errors => "syntax_errors.txt",
            ArtifactRole::SymbolTable => "symbol_table.txt",
        }
    }

    /// Whether reads of this channel collapse repeated lines. The tool
    /// may emit the same warning or error more than once; assembly and
    /// quadruples keep every line because order and identity matter.
    pub fn deduplicate(self) -> bool {
        matches!(self, ArtifactRole::Warnings | ArtifactRole::Errors)
    }
}

/// Resolves artifact roles to paths under the compiler's working
/// directory and reads them with the role's dedup policy.
#[derive(Clone, Debug)]
pub struct ArtifactSet {
    dir: PathBuf,
}

impl ArtifactSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, role: ArtifactRole) -> PathBuf {
        self.dir.join(role.file_name())
    }

    pub fn read(&self, role: ArtifactRole) -> String {
        read_artifact(&self.path(role), role.deduplicate())
    }

    /// Raw read with the role's dedup policy; `Err` when the file is
    /// absent or unreadable. Used where a sentinel string must not be
    /// mistaken for channel content.
    pub fn try_read(&self, role: ArtifactRole) -> std::io::Result<String> {
        try_read_artifact(&self.path(role), role.deduplicate())
    }
}

/// Read a text artifact for display. An absent file yields the
/// "not found." sentinel instead of an error: the tool legitimately
/// writes zero files on some inputs and display must proceed with
/// partial results. Other I/O failures are not absence and report
/// themselves as such.
pub fn read_artifact(path: &Path, deduplicate: bool) -> String {
    match try_read_artifact(path, deduplicate) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            format!("{} not found.", path.display())
        }
        Err(e) => format!("{} cannot be read: {}", path.display(), e),
    }
}

/// Read a text artifact line by line, stripping trailing terminators and
/// rejoining with `\n`.
///
/// With `deduplicate`, exact duplicate lines are removed while keeping
/// the order of first occurrence.
pub fn try_read_artifact(path: &Path, deduplicate: bool) -> std::io::Result<String> {
    let content = String::from_utf8_lossy(&std::fs::read(path)?).into_owned();

    let lines = content.lines();
    let processed: Vec<&str> = if deduplicate {
        let mut seen = HashSet::new();
        lines.filter(|line| seen.insert(*line)).collect()
    } else {
        lines.collect()
    };
    Ok(processed.join("\n"))
}
