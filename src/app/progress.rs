//! Advisory progress output for loads.
//!
//! Reporters only observe; nothing they do affects what gets stored.

use std::io::{self, Write};

use log::info;

use crate::config::ProgressMode;
use crate::load::LoadSummary;
use crate::models::{Generation, LoadRequest};

/// Receives progress events from the load pipeline.
pub trait ProgressReporter {
    /// A load is starting to write `generation`.
    fn begin(&mut self, _request: &LoadRequest, _generation: Generation) {}

    /// A batch was committed; `cumulative` rows are stored so far.
    fn saved(&mut self, cumulative: u64);

    /// The load finished successfully.
    fn finish(&mut self, _summary: &LoadSummary) {}
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for Box<P> {
    fn begin(&mut self, request: &LoadRequest, generation: Generation) {
        (**self).begin(request, generation)
    }

    fn saved(&mut self, cumulative: u64) {
        (**self).saved(cumulative)
    }

    fn finish(&mut self, summary: &LoadSummary) {
        (**self).finish(summary)
    }
}

/// Console reporter that rewrites a single "Saved: N entries" line.
///
/// Uses ANSI save/restore cursor sequences, so output piped to a file shows
/// every update on its own line.
pub struct ConsoleProgress<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>) {
        // Progress is advisory; a closed stdout must not fail the load
        if let Err(e) = self.out.write_fmt(text).and_then(|_| self.out.flush()) {
            log::debug!("Progress output failed: {e}");
        }
    }
}

impl<W: Write> ProgressReporter for ConsoleProgress<W> {
    fn begin(&mut self, request: &LoadRequest, generation: Generation) {
        self.emit(format_args!(
            "rebuilding: {} {} (generation {})\n\x1b[s",
            request.kind.table(),
            request.family,
            generation
        ));
    }

    fn saved(&mut self, cumulative: u64) {
        self.emit(format_args!("\x1b[u\x1b[KSaved: {cumulative} entries\n"));
    }
}

/// Reporter that logs each committed batch at info level.
#[derive(Default)]
pub struct LogProgress {
    label: String,
}

impl ProgressReporter for LogProgress {
    fn begin(&mut self, request: &LoadRequest, generation: Generation) {
        self.label = format!(
            "{} {} generation {}",
            request.kind.table(),
            request.family,
            generation
        );
    }

    fn saved(&mut self, cumulative: u64) {
        info!("{}: saved {} entries", self.label, cumulative);
    }
}

/// Reporter that discards every event.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn saved(&mut self, _cumulative: u64) {}
}

/// Collects progress events for unit tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub begun: Vec<(LoadRequest, Generation)>,
    pub saved: Vec<u64>,
    pub finished: usize,
}

#[cfg(test)]
impl ProgressReporter for RecordingProgress {
    fn begin(&mut self, request: &LoadRequest, generation: Generation) {
        self.begun.push((request.clone(), generation));
    }

    fn saved(&mut self, cumulative: u64) {
        self.saved.push(cumulative);
    }

    fn finish(&mut self, _summary: &LoadSummary) {
        self.finished += 1;
    }
}

/// Builds the reporter selected by `--progress`.
pub fn reporter_for(mode: ProgressMode) -> Box<dyn ProgressReporter> {
    match mode {
        ProgressMode::Console => Box::new(ConsoleProgress::stdout()),
        ProgressMode::Log => Box::new(LogProgress::default()),
        ProgressMode::None => Box::new(SilentProgress),
    }
}
