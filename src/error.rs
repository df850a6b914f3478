// Error taxonomy for a run. Every variant except the rotation errors is
// fatal: `main` prints it, logs it and exits with status 1.

use std::path::PathBuf;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("data file {0} doesn't exist")]
    ConfigMissing(PathBuf),

    #[error("data file {path} is not valid json: {source}")]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("realm is not set, use '--realm <YOUR REALM>' or set pideaRealm in the data file")]
    RealmMissing,

    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("request failed: {0}")]
    RequestFailure(String),

    #[error("no users returned for realm {realm}")]
    EmptyResult { realm: String },

    #[error("{context} ({}): {source}", .path.display())]
    FileSystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read password: {0}")]
    PasswordInput(#[source] std::io::Error),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Shorthand for wrapping an io error with the path it concerns.
    pub fn fs(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::FileSystem {
            context,
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::RequestFailure(format!("timed out: {}", err))
        } else {
            AppError::RequestFailure(err.to_string())
        }
    }
}
