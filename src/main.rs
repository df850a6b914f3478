// Entrypoint for the CLI application.
// - Accepts the single-dash long flags (`-realm`) older scripts use.
// - Sets up the day's log file and rotates old logs before anything else.
// - Hands the rest to `app::run` and turns its outcome into an exit code:
//   0 on success, 1 on any fatal error (printed and logged).

use chrono::Local;
use clap::Parser;
use pidea_users_cli::app::{self, RunOptions};
use pidea_users_cli::cli::{normalize_args, Cli, APP_NAME};
use pidea_users_cli::ui::TerminalPassword;
use pidea_users_cli::{logging, rotation};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let started = Instant::now();
    let today = Local::now().date_naive();

    let log_dir = cli.log_dir();
    // Held until main returns so buffered log lines get flushed.
    let (_guard, log_file) = match logging::init_logging(&log_dir, APP_NAME, today) {
        Ok(v) => v,
        Err(e) => {
            println!("failed to set up logging in {}:\n\t{:#}", log_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };
    info!(app = APP_NAME, log_file = %log_file.display(), "Program Started");

    info!(log_dir = %log_dir.display(), keep = cli.keep_logs, "rotating logs");
    match rotation::rotate(&log_dir, cli.keep_logs) {
        Ok(report) => info!(removed = report.removed.len(), "log rotation done"),
        Err(e) => {
            println!("failed to rotate logs:\n\t{}", e);
            warn!(error = %e, "log rotation failed, continuing");
        }
    }

    match app::run(&RunOptions::from(&cli), &mut TerminalPassword, today) {
        Ok(path) => {
            println!("DONE, result is in: {}", path.display());
            info!(elapsed_secs = started.elapsed().as_secs_f64(), "Program Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e);
            error!(error = %e, "exiting");
            ExitCode::FAILURE
        }
    }
}
