//! Concurrent run over all shows of a library
//!
//! Each show is one unit of work. At most `max_workers` units are in flight
//! at once and reports come back in completion order. A failing show never
//! cancels its siblings: failures are already folded into its report.

use futures::stream::{self, Stream, StreamExt};
use std::io::{self, Write};
use tracing::info;

use crate::cli::Output;
use crate::library::LibraryService;
use crate::models::Show;
use crate::processor::{process_show, StreamPreferences};
use crate::report::ShowReport;

/// Counts of show outcomes for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// Total number of changed episodes
    pub episodes_changed: usize,
}

impl RunSummary {
    pub fn record(&mut self, report: &ShowReport) {
        match report {
            ShowReport::Changed { .. } => self.changed += 1,
            ShowReport::Unchanged { .. } => self.unchanged += 1,
            ShowReport::Failed { .. } => self.failed += 1,
        }
        self.episodes_changed += report.change_count();
    }

    pub fn shows(&self) -> usize {
        self.changed + self.unchanged + self.failed
    }
}

/// Stream of show reports, yielded as each show completes
pub fn show_reports<'a, S: LibraryService + 'a>(
    service: &'a S,
    shows: &'a [Show],
    prefs: &'a StreamPreferences,
    max_workers: usize,
) -> impl Stream<Item = ShowReport> + 'a {
    stream::iter(shows)
        .map(move |show| process_show(service, show, prefs))
        .buffer_unordered(max_workers.max(1))
}

/// Process every show, handing each report to `on_report` as soon as it is
/// available.
pub async fn run<S, F>(
    service: &S,
    shows: &[Show],
    prefs: &StreamPreferences,
    max_workers: usize,
    mut on_report: F,
) -> RunSummary
where
    S: LibraryService,
    F: FnMut(&ShowReport),
{
    info!(
        "Processing {} shows with {} workers",
        shows.len(),
        max_workers
    );

    let mut summary = RunSummary::default();
    let mut reports = std::pin::pin!(show_reports(service, shows, prefs, max_workers));

    while let Some(report) = reports.next().await {
        summary.record(&report);
        on_report(&report);
    }

    info!(
        "Run finished: {} changed ({} episodes), {} unchanged, {} failed",
        summary.changed, summary.episodes_changed, summary.unchanged, summary.failed
    );
    summary
}

/// Process every show, printing each report as it completes and the
/// completion line after the last one.
///
/// A write failure does not stop the run; the first one is returned once all
/// shows are done.
pub async fn run_to_output<S, W>(
    service: &S,
    shows: &[Show],
    prefs: &StreamPreferences,
    max_workers: usize,
    output: &mut Output<W>,
) -> io::Result<RunSummary>
where
    S: LibraryService,
    W: Write,
{
    let mut write_error = None;
    let summary = run(service, shows, prefs, max_workers, |report| {
        if write_error.is_none() {
            write_error = output.report(report).err();
        }
    })
    .await;

    if let Some(e) = write_error {
        return Err(e);
    }
    output.finish()?;
    Ok(summary)
}
