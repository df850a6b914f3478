// UI layer: the masked password prompt and the spinner shown while the API
// calls run. Both talk to the terminal directly through dialoguer/indicatif.

use crate::error::{AppError, AppResult};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::io;
use std::time::Duration;
use tracing::error;

pub const PASSWORD_PROMPT: &str = "Enter Pidea API user's Password and press Enter";

/// Where the API password comes from.
pub trait PasswordSource {
    fn read_password(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads from the controlling terminal with echo turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPassword;

impl PasswordSource for TerminalPassword {
    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        // Emptiness is checked by `prompt_password` so it can be logged.
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
    }
}

/// Ask for the password until a non-empty one is entered. A read error
/// (closed stdin, no terminal) ends the run.
pub fn prompt_password(source: &mut dyn PasswordSource) -> AppResult<SecretString> {
    loop {
        let password = source
            .read_password(PASSWORD_PROMPT)
            .map_err(AppError::PasswordInput)?;
        if password.is_empty() {
            println!("password may not be empty");
            error!("empty password entered");
            continue;
        }
        return Ok(SecretString::new(password));
    }
}

/// Run `f` while a spinner with `message` is shown on stderr.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}
