//! dmshell — developer shell and golden-file regression harness around an
//! external compiler executable.
//!
//! The compiler is a black box: `<executable> <input-file>` exits 0 or
//! nonzero, reports on stdout/stderr, and drops artifact files (assembly,
//! quadruples, warnings, syntax errors, symbol table) into its working
//! directory. This crate invokes it with a timeout, parses the artifact
//! channels into structured records, maps diagnostics back to source
//! lines, and verifies the executable against a fixture corpus with
//! exact-match golden files.

pub mod artifact;
pub mod buffer;
pub mod cli;
pub mod diagnostic;
pub mod harness;
pub mod highlight;
pub mod invoke;
pub mod session;
pub mod symtab;

pub use artifact::{read_artifact, ArtifactRole, ArtifactSet};
pub use buffer::SourceBuffer;
pub use diagnostic::{extract, DiagnosticRecord, Severity};
pub use harness::{discover, verify, FixtureCase, HarnessReport, Outcome};
pub use highlight::{map_to_highlights, HighlightSpan, HighlightStyle};
pub use invoke::{InvocationResult, InvokeError, Invoker};
pub use session::{Session, SessionReport, SessionStatus};
pub use symtab::SymbolTable;
