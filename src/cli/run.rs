use std::path::PathBuf;
use std::process;

use clap::Args;

use crate::artifact::ArtifactRole;
use crate::buffer::SourceBuffer;
use crate::diagnostic;
use crate::session::{Session, SessionStatus};

#[derive(Args)]
pub struct RunArgs {
    /// Source file to submit to the compiler
    pub input: PathBuf,
    /// Path to the compiler executable
    #[arg(long, default_value = "./parser.exe")]
    pub exe: PathBuf,
    /// Seconds to wait before killing the compiler
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
    /// Directory the compiler runs in and writes artifacts to
    /// (default: the executable's directory)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

pub fn cmd_run(args: RunArgs) {
    let source = match std::fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let work_dir = args
        .work_dir
        .unwrap_or_else(|| super::default_work_dir(&args.exe));
    let invoker = super::build_invoker(&args.exe, args.timeout, &work_dir);
    let session = Session::new(invoker);

    let report = match session.run(&source) {
        Ok(report) => report,
        Err(e) => {
            // Launch failure and timeout are fatal shell errors, not
            // compiler diagnostics.
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    match report.status {
        SessionStatus::Success => eprintln!("Compilation complete."),
        SessionStatus::CompileFailed => eprintln!("Compilation failed."),
    }

    print_channel("Output", &report.output);
    print_channel("Assembly", &report.artifacts[&ArtifactRole::Assembly]);
    print_channel("Quadruples", &report.artifacts[&ArtifactRole::Quadruples]);
    print_channel("Errors", &report.artifacts[&ArtifactRole::Errors]);
    print_channel("Warnings", &report.artifacts[&ArtifactRole::Warnings]);
    print_channel("Symbol Table", &report.symbol_table.render_text());

    if !report.records.is_empty() {
        let buffer = SourceBuffer::new(source);
        let filename = args.input.display().to_string();
        let mut stdout = std::io::stdout();
        if let Err(e) = diagnostic::render_records(&report.records, &filename, &buffer, &mut stdout)
        {
            eprintln!("error: cannot render diagnostics: {}", e);
        }
    }

    if report.status == SessionStatus::CompileFailed {
        process::exit(1);
    }
}

fn print_channel(title: &str, text: &str) {
    println!("── {} ──", title);
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        println!("(empty)");
    } else {
        println!("{}", trimmed);
    }
    println!();
}
