//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for the phases of a merge run
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub match_pb: Option<ProgressBar>,
    pub write_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for a merge run
    pub fn new_for_merge() -> Self {
        Self {
            load_pb: None,
            match_pb: None,
            write_pb: None,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            load_pb: None,
            match_pb: None,
            write_pb: None,
            show_progress: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.show_progress
    }

    /// Spinner while a table is read into memory
    pub fn start_load(&mut self, table: &str) {
        if self.show_progress {
            self.finish_load("");
            self.load_pb = Some(create_spinner(&format!("Reading table '{}'...", table)));
        }
    }

    pub fn finish_load(&mut self, message: &str) {
        if let Some(pb) = self.load_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn start_match(&mut self, total: u64) {
        if self.show_progress {
            self.match_pb = Some(create_progress_bar(total, "Matching rows"));
        }
    }

    pub fn update_match(&mut self, processed: u64) {
        if let Some(pb) = &self.match_pb {
            pb.set_position(processed);
        }
    }

    /// Hide the matching bar while the user is being prompted
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.match_pb {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    pub fn finish_match(&mut self, message: &str) {
        if let Some(pb) = self.match_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn start_write(&mut self, total: u64) {
        if self.show_progress {
            self.write_pb = Some(create_progress_bar(total, "Writing records"));
        }
    }

    pub fn update_write(&mut self, written: u64) {
        if let Some(pb) = &self.write_pb {
            pb.set_position(written);
        }
    }

    pub fn finish_write(&mut self, message: &str) {
        if let Some(pb) = self.write_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure all progress bars are cleaned up silently
        for pb in [self.load_pb.take(), self.match_pb.take(), self.write_pb.take()]
            .into_iter()
            .flatten()
        {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
