use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Console progress for the long pipeline stages. A silent reporter is a no-op.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn silent() -> Self {
        Self { progress_bar: None }
    }

    /// Switch to a counted bar of `total` steps for the next stage.
    pub fn start_count(&self, total: u64, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_length(total);
            pb.set_position(0);
            pb.set_message(message.to_string());
        }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_is_noop() {
        let progress = ProgressReporter::silent();
        progress.increment(10);
        progress.set_message("ignored");
        progress.finish_with_message("done");
        progress.start_count(10, "ignored");
        assert!(progress.progress_bar.is_none());
    }

    #[test]
    fn test_start_count_tracks_position() {
        let progress = ProgressReporter::new_spinner("Reading layers...", false);
        progress.start_count(5, "Joining 5 parcels...");
        progress.increment(2);

        let pb = progress.progress_bar.as_ref().unwrap();
        assert_eq!(pb.length(), Some(5));
        assert_eq!(pb.position(), 2);
    }
}
