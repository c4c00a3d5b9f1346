//! Single timed invocation of the external compiler executable.
//!
//! The tool is a black box: it takes one argument (a path to the source
//! file), writes its artifact files into the working directory, reports
//! on stdout/stderr, and exits 0 on success or nonzero on failure.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Outcome of a compiler run that actually started and finished.
///
/// A nonzero exit code is not an error at this layer; callers decide what
/// it means (the shell shows "compilation failed", the harness compares
/// it to the fixture's expected code).
#[derive(Clone, Debug)]
pub struct InvocationResult {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Failures that preempt any result.
#[derive(Clone, Debug)]
pub enum InvokeError {
    /// The executable could not be started at all. Distinct from
    /// compiler-reported diagnostics: this never reaches the Errors
    /// channel.
    Launch { path: PathBuf, message: String },
    /// The child outlived the deadline and was forcibly killed.
    Timeout { limit: Duration },
    /// Scratch-file or wait/pipe I/O trouble around the invocation.
    Io { message: String },
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::Launch { path, message } => {
                write!(f, "cannot launch '{}': {}", path.display(), message)
            }
            InvokeError::Timeout { limit } => {
                write!(f, "compiler timed out after {}s", limit.as_secs())
            }
            InvokeError::Io { message } => write!(f, "invocation i/o error: {}", message),
        }
    }
}

impl std::error::Error for InvokeError {}

/// Runs the external executable against source text.
#[derive(Clone, Debug)]
pub struct Invoker {
    executable: PathBuf,
    timeout: Duration,
    work_dir: PathBuf,
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl Invoker {
    pub fn new(
        executable: impl Into<PathBuf>,
        timeout: Duration,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            timeout,
            work_dir: work_dir.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Write `source` to a uniquely named scratch file in the working
    /// directory and run `<executable> <scratch-path>` to completion or
    /// to the deadline.
    ///
    /// The scratch file is owned by this call alone and removed on every
    /// exit path, so concurrent invocations never race on it.
    pub fn invoke(&self, source: &str) -> Result<InvocationResult, InvokeError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("dmshell-input-")
            .suffix(".txt")
            .tempfile_in(&self.work_dir)
            .map_err(|e| InvokeError::Io {
                message: format!("cannot create scratch file: {}", e),
            })?;
        scratch
            .write_all(source.as_bytes())
            .and_then(|_| scratch.flush())
            .map_err(|e| InvokeError::Io {
                message: format!("cannot write scratch file: {}", e),
            })?;

        let mut child = Command::new(&self.executable)
            .arg(scratch.path())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| InvokeError::Launch {
                path: self.executable.clone(),
                message: e.to_string(),
            })?;

        // Drain both pipes off-thread so a chatty child cannot deadlock
        // against the deadline poll below.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(InvokeError::Timeout {
                            limit: self.timeout,
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(InvokeError::Io {
                        message: format!("cannot wait for compiler: {}", e),
                    });
                }
            }
        };

        Ok(InvocationResult {
            exit_code: status.code(),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
