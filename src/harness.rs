//! Golden-file regression harness for the external compiler.
//!
//! Fixtures follow a directory convention: `inputs/` holds source files
//! named `valid*.txt` (expected exit 0) or `invalid*.txt` (expected exit
//! 1); `outputs/` holds `.out` golden files with matching stems. A
//! fixture whose name carries the output-check marker compares the
//! appropriate captured stream against its golden file; all others check
//! the exit code only.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::invoke::{InvokeError, Invoker};

/// Filename substring gating golden-output comparison.
const OUTPUT_CHECK_MARKER: &str = "_1_";

/// One discovered fixture. Derived once at startup, immutable for the
/// run; fixtures share nothing mutable with each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureCase {
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
    pub expected_exit_code: i32,
    /// Whether the golden file is compared at all.
    pub check_output: bool,
}

impl FixtureCase {
    pub fn name(&self) -> String {
        self.input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }
}

/// Harness-level misconfiguration, reported before any fixture runs.
#[derive(Clone, Debug)]
pub enum HarnessError {
    MissingInputDir(PathBuf),
    /// The inputs directory exists but holds no qualifying fixture.
    /// Zero fixtures is a setup bug, not a passing run.
    NoFixtures(PathBuf),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::MissingInputDir(dir) => {
                write!(f, "input directory '{}' does not exist", dir.display())
            }
            HarnessError::NoFixtures(dir) => {
                write!(f, "no valid*/invalid* fixtures found in '{}'", dir.display())
            }
        }
    }
}

impl std::error::Error for HarnessError {}

/// Verdict for one fixture. Failures always carry full context, never a
/// bare boolean.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

#[derive(Clone, Debug)]
pub struct FixtureResult {
    pub fixture: FixtureCase,
    pub outcome: Outcome,
}

#[derive(Clone, Debug)]
pub struct HarnessReport {
    pub results: Vec<FixtureResult>,
}

/// Scan `<fixture_dir>/inputs` for fixture cases, in lexicographic
/// filename order so failure reports are deterministic and diffable.
pub fn discover(fixture_dir: &Path) -> Result<Vec<FixtureCase>, HarnessError> {
    let input_dir = fixture_dir.join("inputs");
    let output_dir = fixture_dir.join("outputs");

    let entries = std::fs::read_dir(&input_dir)
        .map_err(|_| HarnessError::MissingInputDir(input_dir.clone()))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut fixtures = Vec::new();
    for name in names {
        let Some(stem) = name.strip_suffix(".txt") else {
            continue;
        };
        let expected_exit_code = if stem.starts_with("valid") {
            0
        } else if stem.starts_with("invalid") {
            1
        } else {
            continue;
        };
        fixtures.push(FixtureCase {
            input_path: input_dir.join(&name),
            expected_output_path: output_dir.join(format!("{}.out", stem)),
            expected_exit_code,
            check_output: name.contains(OUTPUT_CHECK_MARKER),
        });
    }

    if fixtures.is_empty() {
        return Err(HarnessError::NoFixtures(input_dir));
    }
    Ok(fixtures)
}

/// Run one fixture: invoke the compiler on its input and compare exit
/// code and, when the marker asks for it, the captured stream against
/// the golden file. Every failure identifies the fixture and shows both
/// sides of whatever mismatched.
pub fn verify(fixture: &FixtureCase, invoker: &Invoker) -> Outcome {
    let source = match std::fs::read(&fixture.input_path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            return Outcome::Fail(format!(
                "cannot read input file '{}': {}",
                fixture.input_path.display(),
                e
            ));
        }
    };

    let result = match invoker.invoke(&source) {
        Ok(result) => result,
        // Launch failure names the missing executable and skips any
        // golden comparison; timeout names the offending input and is
        // never retried.
        Err(InvokeError::Launch { path, message }) => {
            return Outcome::Fail(format!(
                "cannot launch executable '{}': {}",
                path.display(),
                message
            ));
        }
        Err(InvokeError::Timeout { limit }) => {
            return Outcome::Fail(format!(
                "executable timed out after {}s on input: {}",
                limit.as_secs(),
                fixture.input_path.display()
            ));
        }
        Err(InvokeError::Io { message }) => {
            return Outcome::Fail(format!(
                "invocation failed on input '{}': {}",
                fixture.input_path.display(),
                message
            ));
        }
    };

    let actual_code = match result.exit_code {
        Some(code) => code,
        None => {
            return Outcome::Fail(format!(
                "executable terminated by signal on input: {}\nStderr: {}",
                fixture.input_path.display(),
                result.stderr
            ));
        }
    };

    if actual_code != fixture.expected_exit_code {
        return Outcome::Fail(format!(
            "expected exit code {}, got {}\nInput file: {}\nStderr: {}",
            fixture.expected_exit_code,
            actual_code,
            fixture.input_path.display(),
            result.stderr
        ));
    }

    // A marker fixture with no golden file on disk stays exit-code-only.
    if fixture.check_output && fixture.expected_output_path.exists() {
        let expected = match std::fs::read(&fixture.expected_output_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                return Outcome::Fail(format!(
                    "cannot read golden file '{}': {}",
                    fixture.expected_output_path.display(),
                    e
                ));
            }
        };
        let expected = expected.trim();

        // Success fixtures are judged on stdout, failure fixtures on the
        // diagnostic text the tool writes to stderr.
        let (channel, actual) = if fixture.expected_exit_code == 0 {
            ("output", result.stdout.trim())
        } else {
            ("error message", result.stderr.trim())
        };

        if actual != expected {
            return Outcome::Fail(format!(
                "{} mismatch!\nInput: {}\nExpected:\n{}\nGot:\n{}",
                channel,
                fixture.input_path.display(),
                expected,
                actual
            ));
        }
    }

    Outcome::Pass
}

/// Run all fixtures. Fixtures are independent, so they run on the rayon
/// pool; each invocation uses its own scratch file, so workers never
/// race on shared state. Results come back in discovery order.
pub fn run(fixtures: &[FixtureCase], invoker: &Invoker) -> HarnessReport {
    let results = fixtures
        .par_iter()
        .map(|fixture| FixtureResult {
            fixture: fixture.clone(),
            outcome: verify(fixture, invoker),
        })
        .collect();
    HarnessReport { results }
}

impl HarnessReport {
    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == Outcome::Pass)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Human-readable per-fixture lines plus a summary, in discovery
    /// order.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            match &result.outcome {
                Outcome::Pass => {
                    out.push_str(&format!("PASS {}\n", result.fixture.name()));
                }
                Outcome::Fail(reason) => {
                    out.push_str(&format!("FAIL {}\n", result.fixture.name()));
                    for line in reason.lines() {
                        out.push_str(&format!("    {}\n", line));
                    }
                }
            }
        }
        out.push_str(&format!(
            "\n{} fixtures: {} passed, {} failed\n",
            self.results.len(),
            self.passed_count(),
            self.failed_count()
        ));
        out
    }

    /// Serialize the report to JSON (hand-rolled, no serde dependency).
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        out.push_str("{\n");
        out.push_str(&format!("  \"total\": {},\n", self.results.len()));
        out.push_str(&format!("  \"passed\": {},\n", self.passed_count()));
        out.push_str(&format!("  \"failed\": {},\n", self.failed_count()));
        out.push_str("  \"fixtures\": [\n");
        for (i, result) in self.results.iter().enumerate() {
            out.push_str("    {\n");
            out.push_str(&format!(
                "      \"input\": {},\n",
                json_string(&result.fixture.input_path.display().to_string())
            ));
            out.push_str(&format!(
                "      \"expected_exit_code\": {},\n",
                result.fixture.expected_exit_code
            ));
            match &result.outcome {
                Outcome::Pass => out.push_str("      \"outcome\": \"pass\"\n"),
                Outcome::Fail(reason) => {
                    out.push_str("      \"outcome\": \"fail\",\n");
                    out.push_str(&format!("      \"reason\": {}\n", json_string(reason)));
                }
            }
            out.push_str("    }");
            if i + 1 < self.results.len() {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("  ]\n}\n");
        out
    }

    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        std::fs::write(path, self.to_json())
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e))
    }
}

fn json_string(s: &str) -> String {
    let mut out = String::from('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fixture_tree(cases: &[(&str, &str)], goldens: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inputs")).unwrap();
        std::fs::create_dir(dir.path().join("outputs")).unwrap();
        for (name, content) in cases {
            std::fs::write(dir.path().join("inputs").join(name), content).unwrap();
        }
        for (name, content) in goldens {
            std::fs::write(dir.path().join("outputs").join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_discovery_filters_and_sorts() {
        let dir = fixture_tree(
            &[
                ("valid_2_loop.txt", ""),
                ("readme.txt", "not a fixture"),
                ("invalid_1_badsyntax.txt", ""),
                ("valid_1_basic.txt", ""),
                ("notes.md", ""),
            ],
            &[],
        );
        let fixtures = discover(dir.path()).unwrap();
        let names: Vec<String> = fixtures.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "invalid_1_badsyntax.txt",
                "valid_1_basic.txt",
                "valid_2_loop.txt"
            ]
        );
        assert_eq!(fixtures[0].expected_exit_code, 1);
        assert_eq!(fixtures[1].expected_exit_code, 0);
    }

    #[test]
    fn test_marker_gates_output_check() {
        let dir = fixture_tree(&[("valid_1_basic.txt", ""), ("valid_2_loop.txt", "")], &[]);
        let fixtures = discover(dir.path()).unwrap();
        assert!(fixtures[0].check_output);
        assert!(!fixtures[1].check_output);
    }

    #[test]
    fn test_golden_path_shares_stem() {
        let dir = fixture_tree(&[("valid_1_basic.txt", "")], &[]);
        let fixtures = discover(dir.path()).unwrap();
        assert!(fixtures[0]
            .expected_output_path
            .ends_with("outputs/valid_1_basic.out"));
    }

    #[test]
    fn test_empty_fixture_dir_is_misconfiguration() {
        let dir = fixture_tree(&[("readme.txt", "")], &[]);
        match discover(dir.path()) {
            Err(HarnessError::NoFixtures(_)) => {}
            other => panic!("expected NoFixtures, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_dir_is_misconfiguration() {
        let dir = tempfile::tempdir().unwrap();
        match discover(dir.path()) {
            Err(HarnessError::MissingInputDir(_)) => {}
            other => panic!("expected MissingInputDir, got {:?}", other),
        }
    }

    #[cfg(unix)]
    fn fake_compiler(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("parser");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn invoker_for(dir: &Path, body: &str) -> Invoker {
        let exe = fake_compiler(dir, body);
        Invoker::new(exe, Duration::from_secs(5), dir)
    }

    #[cfg(unix)]
    #[test]
    fn test_valid_fixture_passes_on_matching_stdout() {
        let dir = fixture_tree(&[("valid_1_basic.txt", "x = 42")], &[("valid_1_basic.out", "42\n")]);
        let invoker = invoker_for(dir.path(), "echo 42");
        let fixtures = discover(dir.path()).unwrap();
        assert_eq!(verify(&fixtures[0], &invoker), Outcome::Pass);
    }

    #[cfg(unix)]
    #[test]
    fn test_valid_fixture_fails_on_stdout_mismatch() {
        let dir = fixture_tree(&[("valid_1_basic.txt", "x = 42")], &[("valid_1_basic.out", "42")]);
        let invoker = invoker_for(dir.path(), "echo 41");
        let fixtures = discover(dir.path()).unwrap();
        match verify(&fixtures[0], &invoker) {
            Outcome::Fail(reason) => {
                assert!(reason.contains("Expected:\n42"));
                assert!(reason.contains("Got:\n41"));
                assert!(reason.contains("valid_1_basic.txt"));
            }
            Outcome::Pass => panic!("mismatched stdout must fail"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_fixture_compares_stderr() {
        let dir = fixture_tree(
            &[("invalid_1_badsyntax.txt", "?")],
            &[("invalid_1_badsyntax.out", "Unexpected token at line 5\n")],
        );
        let invoker = invoker_for(dir.path(), "echo 'Unexpected token at line 5' >&2; exit 1");
        let fixtures = discover(dir.path()).unwrap();
        assert_eq!(verify(&fixtures[0], &invoker), Outcome::Pass);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_mismatch_reports_actual_code() {
        let dir = fixture_tree(&[("valid_2_loop.txt", "")], &[]);
        let invoker = invoker_for(dir.path(), "echo boom >&2; exit 1");
        let fixtures = discover(dir.path()).unwrap();
        match verify(&fixtures[0], &invoker) {
            Outcome::Fail(reason) => {
                assert!(reason.contains("expected exit code 0, got 1"));
                assert!(reason.contains("valid_2_loop.txt"));
                assert!(reason.contains("boom"));
            }
            Outcome::Pass => panic!("exit code mismatch must fail"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_golden_file_checks_exit_code_only() {
        let dir = fixture_tree(&[("invalid_1_nogolden.txt", "?")], &[]);
        let invoker = invoker_for(dir.path(), "exit 1");
        let fixtures = discover(dir.path()).unwrap();
        assert_eq!(verify(&fixtures[0], &invoker), Outcome::Pass);
    }

    #[test]
    fn test_missing_executable_fails_without_golden_comparison() {
        let dir = fixture_tree(
            &[("valid_1_basic.txt", "x")],
            &[("valid_1_basic.out", "42")],
        );
        let missing = dir.path().join("parser.exe");
        let invoker = Invoker::new(&missing, Duration::from_secs(5), dir.path());
        let fixtures = discover(dir.path()).unwrap();
        match verify(&fixtures[0], &invoker) {
            Outcome::Fail(reason) => {
                assert!(reason.contains("parser.exe"));
                assert!(reason.contains("cannot launch"));
                assert!(!reason.contains("Expected:"));
            }
            Outcome::Pass => panic!("missing executable must fail"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_run_isolates_failures_and_keeps_order() {
        let dir = fixture_tree(
            &[
                ("invalid_1_bad.txt", "?"),
                ("valid_1_basic.txt", "x"),
                ("valid_2_loop.txt", "y"),
            ],
            &[("valid_1_basic.out", "ok")],
        );
        // Always exits 0, so the invalid fixture's expectation fails
        // while both valid fixtures pass.
        let invoker = invoker_for(dir.path(), "echo ok");
        let fixtures = discover(dir.path()).unwrap();
        let report = run(&fixtures, &invoker);

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].fixture.name(), "invalid_1_bad.txt");
        assert!(matches!(report.results[0].outcome, Outcome::Fail(_)));
        assert_eq!(report.results[1].outcome, Outcome::Pass);
        assert_eq!(report.results[2].outcome, Outcome::Pass);
        assert_eq!(report.passed_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_report_json_shape() {
        let report = HarnessReport {
            results: vec![
                FixtureResult {
                    fixture: FixtureCase {
                        input_path: PathBuf::from("inputs/valid_1_basic.txt"),
                        expected_output_path: PathBuf::from("outputs/valid_1_basic.out"),
                        expected_exit_code: 0,
                        check_output: true,
                    },
                    outcome: Outcome::Pass,
                },
                FixtureResult {
                    fixture: FixtureCase {
                        input_path: PathBuf::from("inputs/invalid_1_bad.txt"),
                        expected_output_path: PathBuf::from("outputs/invalid_1_bad.out"),
                        expected_exit_code: 1,
                        check_output: true,
                    },
                    outcome: Outcome::Fail("expected exit code 1, got 0".to_string()),
                },
            ],
        };
        let json = report.to_json();
        assert!(json.contains("\"total\": 2"));
        assert!(json.contains("\"passed\": 1"));
        assert!(json.contains("\"failed\": 1"));
        assert!(json.contains("\"outcome\": \"pass\""));
        assert!(json.contains("\"reason\": \"expected exit code 1, got 0\""));
    }

    #[test]
    fn test_render_text_summary() {
        let report = HarnessReport {
            results: vec![FixtureResult {
                fixture: FixtureCase {
                    input_path: PathBuf::from("inputs/valid_1_basic.txt"),
                    expected_output_path: PathBuf::from("outputs/valid_1_basic.out"),
                    expected_exit_code: 0,
                    check_output: true,
                },
                outcome: Outcome::Pass,
            }],
        };
        let text = report.render_text();
        assert!(text.contains("PASS valid_1_basic.txt"));
        assert!(text.contains("1 fixtures: 1 passed, 0 failed"));
    }
}
