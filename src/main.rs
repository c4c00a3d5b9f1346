use clap::{Parser, Subcommand};

use dmshell::cli;

#[derive(Parser)]
#[command(
    name = "dmshell",
    version,
    about = "Shell and regression harness for an external compiler executable"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file and show every output channel
    Run(cli::run::RunArgs),
    /// Run the golden-file fixture corpus against the executable
    Test(cli::test::TestArgs),
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => cli::run::cmd_run(args),
        Command::Test(args) => cli::test::cmd_test(args),
    }
}
