// Command-line flags.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

pub const APP_NAME: &str = "pi-get-users-by-realm";

/// Placeholder meaning "no realm given on the command line".
pub const REALM_UNSET: &str = "NONE";

#[derive(Parser, Debug, Clone)]
#[command(
    name = APP_NAME,
    version,
    about = "Get PrivacyIdea users by Realm",
    after_help = "Usage: <app> --realm <YOUR REALM>"
)]
pub struct Cli {
    /// Set custom log dir [default: <exe dir>/logs_pi-get-users-by-realm]
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// Number of logs to keep after rotation
    #[arg(long = "keep-logs", default_value_t = 7)]
    pub keep_logs: usize,

    /// Pidea realm to get users from (falls back to pideaRealm in the data file)
    #[arg(long, default_value = REALM_UNSET)]
    pub realm: String,

    /// JSON file with pideaUrl, pideaApiUser and optionally pideaRealm
    #[arg(long = "data-file", default_value = "data.json")]
    pub data_file: PathBuf,

    /// Directory the CSV result is written to
    #[arg(long = "results-dir", default_value = "Results")]
    pub results_dir: PathBuf,

    /// Timeout for each HTTP request, in seconds
    #[arg(long = "timeout-secs", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates from the API
    #[arg(long)]
    pub insecure: bool,

    /// Write a header-only CSV instead of failing when the realm has no users
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,
}

impl Cli {
    /// The log directory, defaulting to `logs_<app>` next to the executable.
    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => dir.clone(),
            None => exe_dir().join(format!("logs_{}", APP_NAME)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Long flags that older scripts pass with a single dash (`-realm corp`).
const SINGLE_DASH_FLAGS: &[&str] = &[
    "log-dir",
    "keep-logs",
    "realm",
    "data-file",
    "results-dir",
    "timeout-secs",
    "insecure",
    "allow-empty",
];

/// Rewrite `-flag` and `-flag=value` to their `--` forms for the long flags
/// above. Everything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
