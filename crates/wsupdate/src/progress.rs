//! Progress display for the update pipeline
//!
//! A single [`MultiProgress`] is shared by the stage progress bar and the
//! log writer, so that log lines are printed above the bar instead of
//! through it.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;

use crate::stage::Stage;

/// Process-wide progress container
pub fn multi_progress() -> &'static MultiProgress {
    static MULTI: OnceLock<MultiProgress> = OnceLock::new();
    MULTI.get_or_init(MultiProgress::new)
}

/// Progress bar over the stages of one update run
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    /// Create a progress bar for `total` stages
    pub fn new(total: usize) -> Self {
        let bar = multi_progress().add(ProgressBar::new(total as u64));
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} stages {wide_msg}",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn start_stage(&self, stage: Stage) {
        self.bar.set_message(stage.to_string());
    }

    /// Show the tool currently running for `stage`
    pub fn set_message(&self, stage: Stage, tool: &str) {
        self.bar.set_message(format!("{}: {}", stage, tool));
    }

    pub fn finish_stage(&self) {
        self.bar.inc(1);
    }

    /// Remove the bar once every stage is done
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for StageProgress {
    fn drop(&mut self) {
        // An aborted run leaves the bar where it stopped, without the spinner
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// Writer that suspends progress bars while writing logs
#[derive(Clone)]
pub struct ProgressWriter {
    multi: MultiProgress,
}

impl ProgressWriter {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl MakeWriter<'_> for ProgressWriter {
    type Writer = Self;

    fn make_writer(&self) -> Self::Writer {
        self.clone()
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.multi.suspend(|| io::stderr().lock().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.multi.suspend(|| io::stderr().lock().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
