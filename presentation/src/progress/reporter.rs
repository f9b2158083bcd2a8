//! Progress indication for background facilitator phases

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while the process waits for question generation or
/// consolidation to finish.
pub struct PhaseSpinner {
    bar: ProgressBar,
}

impl PhaseSpinner {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Stop the spinner and erase it from the terminal.
    pub fn finish_and_clear(self) {
        self.bar.finish_and_clear();
    }
}
