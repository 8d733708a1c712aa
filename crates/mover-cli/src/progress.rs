use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} messages ({percent}%)";

/// Renders transfer progress as a terminal progress bar on stderr.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(approximate_total: u64) -> anyhow::Result<Self> {
        let bar = ProgressBar::new(approximate_total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)?
                .progress_chars("#>-"),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl mover::Progress for ProgressReporter {
    fn report(&mut self, moved: u64, total: u64) {
        // the estimate may have been too low
        if total > self.bar.length().unwrap_or(0) {
            self.bar.set_length(total);
        }
        self.bar.set_position(moved);
    }
}
