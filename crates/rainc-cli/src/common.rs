//! Helpers shared by the CLI binaries

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber (`RUST_LOG`, default `warn`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One progress bar per named stage, replaced when the stage changes
pub struct StageProgress {
    enabled: bool,
    current: Option<(&'static str, ProgressBar)>,
}

impl StageProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: None,
        }
    }

    /// Report `done` of `total` items for `stage`
    pub fn update(&mut self, stage: &'static str, done: usize, total: usize) {
        if !self.enabled {
            return;
        }

        let same_stage = matches!(&self.current, Some((name, _)) if *name == stage);
        if !same_stage {
            self.finish();
            self.current = Some((stage, new_bar(stage, total as u64)));
        }

        if let Some((_, bar)) = &self.current {
            bar.set_position(done as u64);
        }
    }

    /// Finish the active bar, if any
    pub fn finish(&mut self) {
        if let Some((_, bar)) = self.current.take() {
            bar.finish();
        }
    }
}

fn new_bar(stage: &'static str, total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    bar.set_message(stage);
    bar
}
