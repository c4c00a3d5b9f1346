pub mod run;

use std::path::Path;
use std::process;
use std::time::Duration;

use crate::invoke::Invoker;

/// Build the invoker shared by both subcommands, exiting on a bad
/// working directory.
pub fn build_invoker(exe: &Path, timeout_secs: u64, work_dir: &Path) -> Invoker {
    if !work_dir.is_dir() {
        eprintln!(
            "error: working directory '{}' does not exist",
            work_dir.display()
        );
        process::exit(1);
    }
    Invoker::new(exe, Duration::from_secs(timeout_secs), work_dir)
}

/// Default working directory: beside the executable, falling back to the
/// current directory for bare names.
pub fn default_work_dir(exe: &Path) -> std::path::PathBuf {
    exe.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}
