#![forbid(unsafe_code)]

//! asweep: Artifactory old-artifact cleaner CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("asweep: {e}");
        std::process::exit(e.exit_code());
    }
}
