//! plannav - Reference navigation for hierarchical plan files

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = plannav::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
