// Terminal helpers: the hidden password prompt and the request spinner.

use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Ask for the API password. `Password` hides input in the terminal.
pub fn prompt_password(user: &str) -> Result<String> {
    Password::new()
        .with_prompt(format!("Password for {}", user))
        .interact()
        .context("Failed to read password")
}

/// Spinner shown on stderr while a request is in flight. It stays hidden
/// when stderr is not a terminal.
pub fn spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
