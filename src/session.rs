//! One-shot interactive pipeline: invoke the compiler on submitted
//! source, re-read every artifact channel, extract diagnostics, and map
//! them to highlight spans. This is the shell's "run" action with the
//! display surface factored out.

use std::collections::HashMap;

use crate::artifact::{ArtifactRole, ArtifactSet};
use crate::buffer::SourceBuffer;
use crate::diagnostic::{self, DiagnosticRecord, Severity};
use crate::highlight::{self, HighlightSpan};
use crate::invoke::{InvokeError, Invoker};
use crate::symtab::SymbolTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Compiler exited 0.
    Success,
    /// Compiler ran and exited nonzero (or died to a signal). Status
    /// text only; the diagnostics channels carry the details.
    CompileFailed,
}

/// Everything one run produced, built fresh per invocation and fully
/// replacing the previous report.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub status: SessionStatus,
    /// Compiler's primary stdout report.
    pub output: String,
    /// Artifact text per channel, dedup policy already applied.
    pub artifacts: HashMap<ArtifactRole, String>,
    /// Warning records first, then error records, each in channel order.
    pub records: Vec<DiagnosticRecord>,
    pub highlights: Vec<HighlightSpan>,
    /// Parsed symbol table, or the substitute "not found" table.
    pub symbol_table: SymbolTable,
}

/// Drives invoke → read artifacts → extract → map for one source text.
#[derive(Clone, Debug)]
pub struct Session {
    invoker: Invoker,
    artifacts: ArtifactSet,
}

impl Session {
    pub fn new(invoker: Invoker) -> Self {
        let artifacts = ArtifactSet::new(invoker.work_dir());
        Self { invoker, artifacts }
    }

    /// Run the compiler over `source` and assemble the report.
    ///
    /// Launch failure and timeout are fatal to the session and surface
    /// as errors here, distinct from compiler-reported diagnostics; a
    /// nonzero exit only downgrades the status.
    pub fn run(&self, source: &str) -> Result<SessionReport, InvokeError> {
        let result = self.invoker.invoke(source)?;

        let status = match result.exit_code {
            Some(0) => SessionStatus::Success,
            _ => SessionStatus::CompileFailed,
        };

        // Artifacts are stale the moment a new invocation happens, so
        // every channel is re-read in full right here.
        let mut artifacts = HashMap::new();
        for role in ArtifactRole::ALL {
            artifacts.insert(role, self.artifacts.read(role));
        }

        // Extraction reads the channels afresh: the display map holds a
        // sentinel naming the path for absent files, and a path is not
        // diagnostic text. An absent channel simply has no records.
        let mut records = Vec::new();
        if let Ok(warnings) = self.artifacts.try_read(ArtifactRole::Warnings) {
            records.extend(diagnostic::extract(&warnings, Severity::Warning));
        }
        if let Ok(errors) = self.artifacts.try_read(ArtifactRole::Errors) {
            records.extend(diagnostic::extract(&errors, Severity::Error));
        }

        let buffer = SourceBuffer::new(source);
        let highlights = highlight::map_to_highlights(&records, &buffer);

        let symtab_path = self.artifacts.path(ArtifactRole::SymbolTable);
        let symbol_table = SymbolTable::parse(&symtab_path)
            .unwrap_or_else(|missing| SymbolTable::not_found(&missing.path));

        Ok(SessionReport {
            status,
            output: result.stdout,
            artifacts,
            records,
            highlights,
            symbol_table,
        })
    }
}
