//! `scpigwd` entry point.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let Err(error) = scpigwd::run_gateway() else {
        return ExitCode::SUCCESS;
    };
    // Nothing useful remains to be done if stderr itself is gone.
    if writeln!(io::stderr().lock(), "scpigwd: {error}").is_err() {
        return ExitCode::from(2);
    }
    ExitCode::FAILURE
}
