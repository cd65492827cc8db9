use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use dotmap_scanner::{ProgressSink, ProgressUpdate};

use crate::ui;

/// Percent bar on stderr, hidden when progress is disabled.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    #[must_use]
    pub fn new() -> Self {
        let bar = if ui::prefs().progress {
            ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl Default for BarSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarSink {
    fn on_start(&self, job_id: &str) {
        self.bar.set_prefix(job_id.to_string());
    }

    fn on_phase(&self, update: &ProgressUpdate) {
        self.bar.set_position(u64::from(update.percent));
        self.bar.set_message(update.message.clone());
    }

    fn on_complete(&self, scan_id: i64) {
        self.bar.finish_with_message(format!("stored scan {scan_id}"));
    }

    fn on_failed(&self, message: &str) {
        self.bar.abandon_with_message(format!("failed: {message}"));
    }
}
