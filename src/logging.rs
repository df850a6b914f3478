// Log file setup: one append-mode file per calendar day inside the log
// directory, written through a non-blocking tracing writer.

use crate::export::FILE_DATE_FORMAT;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// `<app>_<dd.mm.yyyy>.log`
pub fn log_file_name(app: &str, date: NaiveDate) -> String {
    format!("{}_{}.log", app, date.format(FILE_DATE_FORMAT))
}

/// Create `dir` if needed and open the day's log file for appending.
pub fn open_daily_log(dir: &Path, app: &str, date: NaiveDate) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log dir {}", dir.display()))?;
    let path = dir.join(log_file_name(app, date));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Ok((file, path))
}

/// Install the global subscriber writing to today's log file. `RUST_LOG`
/// overrides the default `info` filter. The returned guard must be held
/// until exit or buffered lines are lost.
pub fn init_logging(dir: &Path, app: &str, date: NaiveDate) -> Result<(WorkerGuard, PathBuf)> {
    let (file, path) = open_daily_log(dir, app, date)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("failed to install logger")?;

    Ok((guard, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn name_has_app_and_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(log_file_name("app", date), "app_09.01.2025.log");
    }

    #[test]
    fn same_day_appends() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();

        let (mut first, path) = open_daily_log(&dir, "app", date).unwrap();
        writeln!(first, "one").unwrap();
        drop(first);
        let (mut second, again) = open_daily_log(&dir, "app", date).unwrap();
        writeln!(second, "two").unwrap();
        drop(second);

        assert_eq!(path, again);
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn new_day_gets_a_new_file() {
        let tmp = TempDir::new().unwrap();
        let d1 = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let d2 = d1.succ_opt().unwrap();

        let (_, p1) = open_daily_log(tmp.path(), "app", d1).unwrap();
        let (_, p2) = open_daily_log(tmp.path(), "app", d2).unwrap();

        assert_ne!(p1, p2);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
    }
}
