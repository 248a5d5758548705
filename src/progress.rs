//! Spinner shown while packages are fetched from the registry

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Start a `Fetching <what>` spinner; finish it with `finish_and_clear`
///
/// indicatif draws nothing when stderr is not a terminal.
pub fn fetch_spinner(what: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner} Fetching {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);
    pb.set_style(style);
    pb.set_message(what.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
