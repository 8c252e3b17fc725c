//! taskmark - Markdown task progress and status propagation

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskmark::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
