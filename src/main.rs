//! palswap - Command-line tool for remapping colors between palette rows

use std::process::ExitCode;

use palswap::cli;

fn main() -> ExitCode {
    cli::run()
}
