//! Spinner for the token exchange and progress bar for the update loop
//!
//! Both hide themselves when stderr is not a terminal; anything that must
//! always reach the console goes through [`print_line`].

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the token request is in flight
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Bar over the configured user list
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    bar.set_style(style);
    bar.set_message(message.to_string());
    bar
}

/// Stop the spinner leaving a green check and the message
pub fn finish_spinner_success(spinner: &ProgressBar, message: &str) {
    finish_spinner_with(spinner, "{prefix:.green} {msg}", "✓", message);
}

/// Stop the spinner leaving a red cross and the message
pub fn finish_spinner_error(spinner: &ProgressBar, message: &str) {
    finish_spinner_with(spinner, "{prefix:.red} {msg}", "✗", message);
}

fn finish_spinner_with(spinner: &ProgressBar, template: &str, prefix: &'static str, message: &str) {
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_prefix(prefix);
    spinner.finish_with_message(message.to_string());
}

/// Print a line above the bar without tearing it
pub fn print_line(bar: &ProgressBar, line: &str) {
    bar.suspend(|| println!("{}", line));
}

/// Clear the indicator so the following log lines start on a clean row
pub fn finish(bar: &ProgressBar) {
    bar.finish_and_clear();
}
