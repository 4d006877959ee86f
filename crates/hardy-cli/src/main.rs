//! Hardy CLI
//!
//! Solve a frame with both solvers and check that they agree.
//!
//! # Example
//!
//! ```bash
//! # Four workers (default)
//! hardy frame.txt
//!
//! # Eight workers, print the solved joints
//! hardy -n 8 --print frame.txt
//! ```

use std::io;
use std::process::ExitCode;

use clap::Parser;
use hardy_cli::{execute, render, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,hardy=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match execute(&args) {
        Ok(summary) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = render(&summary, args.print, &mut stdout) {
                eprintln!("error: {e}");
                return ExitCode::from(2);
            }
            ExitCode::from(summary.exit_code())
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
