//! Progress observers.
//!
//! Long-running loops report after each unit of work through
//! [`ProgressObserver`]. Core logic never prints progress itself, so it can be
//! driven silently from tests with [`NoProgress`].

use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress notifications from a processing loop.
pub trait ProgressObserver {
    /// A stage with `total` units is starting.
    fn begin(&mut self, _stage: &str, _total: usize) {}

    /// One unit finished.
    fn advance(&mut self) {}

    /// The current stage is done.
    fn finish(&mut self) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Terminal progress bars, one per stage.
#[derive(Default)]
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{msg}] [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressObserver for ConsoleProgress {
    fn begin(&mut self, stage: &str, total: usize) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(bar_style());
        bar.set_message(stage.to_string());
        self.bar = Some(bar);
    }

    fn advance(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

/// Counts notifications; handy for asserting that loops report progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountingProgress {
    pub stages: Vec<(String, usize)>,
    pub advanced: usize,
    pub finished: usize,
}

impl ProgressObserver for CountingProgress {
    fn begin(&mut self, stage: &str, total: usize) {
        self.stages.push((stage.to_string(), total));
    }

    fn advance(&mut self) {
        self.advanced += 1;
    }

    fn finish(&mut self) {
        self.finished += 1;
    }
}
