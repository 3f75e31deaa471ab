//! Running the classifier over many files.
//!
//! Files are independent: each one is loaded, parsed and walked into its own
//! [`ObservationCollector`], and the per-file collectors are merged at the
//! end. With more than one job the files are spread over a rayon pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::collector::{AnalysisResult, CoverageAudit, ObservationCollector};
use crate::error::{AnalysisError, FileFailure};
use crate::parser::parse_source;
use crate::source::{FileSource, SourceEntry};
use crate::walker::TreeWalker;

/// Shared flag that stops a run before its next file.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Analyze one file's text. Observations are returned in traversal order.
pub fn analyze_source(
    repository: &str,
    file: &str,
    text: &str,
) -> Result<ObservationCollector, AnalysisError> {
    let parsed = parse_source(file, text)?;
    let mut collector = ObservationCollector::new();
    let stats = TreeWalker::new(repository, file).walk(&parsed, &mut collector);
    tracing::debug!(
        repository,
        file,
        nodes = stats.nodes,
        monitored = stats.monitored,
        observations = stats.observations,
        "analyzed file"
    );
    Ok(collector)
}

/// Analyze one entry. A file that cannot be read or parsed yields a
/// collector holding only its failure note.
pub fn analyze_entry(entry: &SourceEntry) -> ObservationCollector {
    let outcome = entry
        .load()
        .and_then(|text| analyze_source(&entry.repository, &entry.file, &text));

    match outcome {
        Ok(collector) => collector,
        Err(err) => {
            tracing::warn!(
                repository = %entry.repository,
                file = %entry.file,
                kind = %err.kind(),
                "skipping file: {}",
                err
            );
            let mut collector = ObservationCollector::new();
            collector.record_failure(FileFailure::new(&entry.repository, &entry.file, &err));
            collector
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub result: AnalysisResult,
    pub failures: Vec<FileFailure>,
    pub coverage: CoverageAudit,
    /// Entries that were attempted, whether they succeeded or failed.
    pub files_analyzed: usize,
    pub cancelled: bool,
}

impl RunReport {
    fn from_collector(collector: ObservationCollector, files_analyzed: usize, cancelled: bool) -> Self {
        let (result, mut failures, coverage) = collector.into_parts();
        failures.sort_by(|a, b| (&a.repository, &a.file).cmp(&(&b.repository, &b.file)));
        Self {
            result,
            failures,
            coverage,
            files_analyzed,
            cancelled,
        }
    }
}

/// Configured run over a set of entries.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    jobs: usize,
    cancel: CancelToken,
}

impl AnalysisRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker count; 0 means one per CPU, 1 runs on the calling thread.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn run(&self, entries: &[SourceEntry]) -> RunReport {
        self.run_with_progress(entries, &|_| {})
    }

    /// Run over everything a [`FileSource`] lists.
    pub fn run_source<S: FileSource>(&self, source: &S) -> anyhow::Result<RunReport> {
        let entries = source.entries()?;
        Ok(self.run(&entries))
    }

    /// Run, calling `progress` once for every entry that was attempted.
    pub fn run_with_progress(
        &self,
        entries: &[SourceEntry],
        progress: &(dyn Fn(&SourceEntry) + Sync),
    ) -> RunReport {
        let started = Instant::now();
        tracing::info!(files = entries.len(), jobs = self.jobs, "starting analysis");

        let (collector, attempted) = if self.jobs == 1 || entries.len() < 2 {
            self.run_sequential(entries, progress)
        } else {
            self.run_parallel(entries, progress)
        };

        let cancelled = self.cancel.is_cancelled();
        let report = RunReport::from_collector(collector, attempted, cancelled);

        tracing::info!(
            files = report.files_analyzed,
            observations = report.result.len(),
            failures = report.failures.len(),
            cancelled,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        report
    }

    fn step(&self, entry: &SourceEntry, progress: &(dyn Fn(&SourceEntry) + Sync)) -> Option<ObservationCollector> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let collector = analyze_entry(entry);
        progress(entry);
        Some(collector)
    }

    fn run_sequential(
        &self,
        entries: &[SourceEntry],
        progress: &(dyn Fn(&SourceEntry) + Sync),
    ) -> (ObservationCollector, usize) {
        let mut total = ObservationCollector::new();
        let mut attempted = 0;
        for entry in entries {
            match self.step(entry, progress) {
                Some(collector) => {
                    total.merge(collector);
                    attempted += 1;
                }
                None => break,
            }
        }
        (total, attempted)
    }

    fn run_parallel(
        &self,
        entries: &[SourceEntry],
        progress: &(dyn Fn(&SourceEntry) + Sync),
    ) -> (ObservationCollector, usize) {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build();

        match pool {
            Ok(pool) => pool.install(|| {
                entries
                    .par_iter()
                    .filter_map(|entry| self.step(entry, progress))
                    .fold(
                        || (ObservationCollector::new(), 0usize),
                        |(acc, n), collector| (acc.merged(collector), n + 1),
                    )
                    .reduce(
                        || (ObservationCollector::new(), 0usize),
                        |(a, n), (b, m)| (a.merged(b), n + m),
                    )
            }),
            Err(err) => {
                tracing::warn!("thread pool unavailable, running sequentially: {}", err);
                self.run_sequential(entries, progress)
            }
        }
    }
}
