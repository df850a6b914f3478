// The export run: config -> realm -> password -> token -> users -> CSV.
// Each step either succeeds or ends the run with an `AppError`.

use crate::api::{ApiClient, ClientOptions, User};
use crate::cli::Cli;
use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::export;
use crate::ui::{self, PasswordSource};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything a run needs besides the password.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Raw `--realm` value; `NONE` defers to the data file.
    pub realm: String,
    pub data_file: PathBuf,
    pub results_dir: PathBuf,
    pub client: ClientOptions,
    /// Accept a realm without users and write a header-only file.
    pub allow_empty: bool,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        RunOptions {
            realm: cli.realm.clone(),
            data_file: cli.data_file.clone(),
            results_dir: cli.results_dir.clone(),
            client: ClientOptions {
                timeout: cli.timeout(),
                insecure: cli.insecure,
            },
            allow_empty: cli.allow_empty,
        }
    }
}

/// Zero users is an error unless the caller opted into empty results.
pub fn check_users(users: &[User], realm: &str, allow_empty: bool) -> AppResult<()> {
    if users.is_empty() && !allow_empty {
        return Err(AppError::EmptyResult {
            realm: realm.to_string(),
        });
    }
    Ok(())
}

/// Run one export and return the path of the written CSV.
pub fn run(
    options: &RunOptions,
    passwords: &mut dyn PasswordSource,
    today: NaiveDate,
) -> AppResult<PathBuf> {
    info!(data_file = %options.data_file.display(), "reading data file");
    let config = ApiConfig::load(&options.data_file)?;
    let realm = config.resolve_realm(&options.realm)?;
    info!(url = %config.url, user = %config.api_user, %realm, "data file loaded");

    if options.client.insecure {
        warn!("TLS certificate verification is disabled");
    }

    let password = ui::prompt_password(passwords)?;
    println!();

    let mut client = ApiClient::new(&config.url, &options.client)?;
    ui::with_spinner("Getting API token...", || {
        client.authenticate(&config.api_user, &password)
    })?;
    info!("api token received");

    let users = ui::with_spinner("Getting users...", || client.users_by_realm(&realm))?;
    info!(count = users.len(), %realm, "users received");
    check_users(&users, &realm, options.allow_empty)?;

    let path = export::write_result_file(&options.results_dir, &realm, today, &users)?;
    info!(path = %path.display(), rows = users.len(), "result written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_users_fail_by_default() {
        let err = check_users(&[], "corp", false).unwrap_err();
        assert!(matches!(err, AppError::EmptyResult { realm } if realm == "corp"));
    }

    #[test]
    fn empty_users_allowed_when_asked() {
        assert!(check_users(&[], "corp", true).is_ok());
    }

    #[test]
    fn non_empty_users_always_pass() {
        let users = vec![User::default()];
        assert!(check_users(&users, "corp", false).is_ok());
        assert!(check_users(&users, "corp", true).is_ok());
    }
}
