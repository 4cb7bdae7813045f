use crate::constants::PROGRESS_BAR_TEMPLATE;
use crate::error::RemoveBgError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Per-file outcome reporting. `index` is 1-based.
pub trait Notifier {
    fn success(&self, input_path: &Path, index: usize, total: usize);

    fn error(&self, err: &RemoveBgError, input_path: &Path, index: usize, total: usize);

    fn skip(&self, input_path: &Path, output_path: &Path, index: usize, total: usize);

    /// Called once the batch loop is done.
    fn finish(&self) {}
}

/// Logs each outcome as a structured tracing event and advances a progress bar.
pub struct LogNotifier {
    progress: ProgressBar,
}

impl LogNotifier {
    pub fn new(show_progress: bool) -> Self {
        let progress = if show_progress {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        Self { progress }
    }

    fn advance(&self, total: usize) {
        self.progress.set_length(total as u64);
        self.progress.inc(1);
    }
}

fn image_field(index: usize, total: usize) -> String {
    format!("{}/{}", index, total)
}

impl Notifier for LogNotifier {
    fn success(&self, input_path: &Path, index: usize, total: usize) {
        self.progress.suspend(|| {
            tracing::info!(
                image = %image_field(index, total),
                input = %input_path.display(),
                "Processed image"
            );
        });
        self.advance(total);
    }

    fn error(&self, err: &RemoveBgError, input_path: &Path, index: usize, total: usize) {
        self.progress.suspend(|| {
            tracing::error!(
                image = %image_field(index, total),
                input = %input_path.display(),
                "{}",
                err
            );
        });
        self.advance(total);
    }

    fn skip(&self, input_path: &Path, output_path: &Path, index: usize, total: usize) {
        self.progress.suspend(|| {
            tracing::info!(
                image = %image_field(index, total),
                input = %input_path.display(),
                output = %output_path.display(),
                "Skipping already processed image"
            );
        });
        self.advance(total);
    }

    fn finish(&self) {
        self.progress.finish_and_clear();
    }
}
