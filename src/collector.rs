//! Accumulation of observations, failure notes and coverage counts.
//!
//! Each file is analyzed into its own [`ObservationCollector`]; a run folds
//! the per-file collectors together with [`ObservationCollector::merge`].
//! Merging concatenates per-file sequences, so the multiset of observations
//! does not depend on the merge order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::ConstructKind;
use crate::error::FileFailure;
use crate::observation::Observation;

/// Observations keyed by repository, then file, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult {
    repositories: BTreeMap<String, BTreeMap<String, Vec<Observation>>>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations for one file, if it was analyzed.
    pub fn get(&self, repository: &str, file: &str) -> Option<&[Observation]> {
        self.repositories
            .get(repository)
            .and_then(|files| files.get(file))
            .map(|v| v.as_slice())
    }

    /// Repository identifiers in sorted order.
    pub fn repositories(&self) -> impl Iterator<Item = &str> {
        self.repositories.keys().map(|k| k.as_str())
    }

    /// Every analyzed file as `(repository, file, observations)`.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str, &[Observation])> {
        self.repositories.iter().flat_map(|(repo, files)| {
            files
                .iter()
                .map(move |(file, obs)| (repo.as_str(), file.as_str(), obs.as_slice()))
        })
    }

    /// All observations, file by file.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.repositories
            .values()
            .flat_map(|files| files.values())
            .flatten()
    }

    pub fn file_count(&self) -> usize {
        self.repositories.values().map(|files| files.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.observations().count()
    }

    pub fn is_empty(&self) -> bool {
        self.observations().next().is_none()
    }

    fn entry(&mut self, repository: &str, file: &str) -> &mut Vec<Observation> {
        self.repositories
            .entry(repository.to_string())
            .or_default()
            .entry(file.to_string())
            .or_default()
    }

    fn merge(&mut self, other: AnalysisResult) {
        for (repo, files) in other.repositories {
            let target = self.repositories.entry(repo).or_default();
            for (file, observations) in files {
                target.entry(file).or_default().extend(observations);
            }
        }
    }
}

/// Monitored nodes that produced no observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageAudit {
    /// The kind has a rule, but none of its branches matched the node's shape.
    pub unmatched: BTreeMap<ConstructKind, usize>,
    /// The kind is monitored but has no rule.
    pub unruled: BTreeMap<ConstructKind, usize>,
}

impl CoverageAudit {
    pub fn record(&mut self, kind: ConstructKind) {
        let bucket = if kind.has_rule() {
            &mut self.unmatched
        } else {
            &mut self.unruled
        };
        *bucket.entry(kind).or_insert(0) += 1;
    }

    pub fn unmatched_total(&self) -> usize {
        self.unmatched.values().sum()
    }

    pub fn unruled_total(&self) -> usize {
        self.unruled.values().sum()
    }

    pub fn merge(&mut self, other: CoverageAudit) {
        for (kind, n) in other.unmatched {
            *self.unmatched.entry(kind).or_insert(0) += n;
        }
        for (kind, n) in other.unruled {
            *self.unruled.entry(kind).or_insert(0) += n;
        }
    }
}

/// Accumulates everything one or more file analyses produced.
#[derive(Debug, Clone, Default)]
pub struct ObservationCollector {
    result: AnalysisResult,
    failures: Vec<FileFailure>,
    coverage: CoverageAudit,
}

impl ObservationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file as analyzed, even if it yields no observations.
    pub fn begin_file(&mut self, repository: &str, file: &str) {
        self.result.entry(repository, file);
    }

    pub fn record(&mut self, observation: Observation) {
        self.result
            .entry(&observation.repository, &observation.file)
            .push(observation);
    }

    pub fn record_miss(&mut self, kind: ConstructKind) {
        self.coverage.record(kind);
    }

    pub fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    /// Fold another collector into this one.
    pub fn merge(&mut self, other: ObservationCollector) {
        self.result.merge(other.result);
        self.failures.extend(other.failures);
        self.coverage.merge(other.coverage);
    }

    /// Consuming form of [`merge`](Self::merge), handy for folds.
    pub fn merged(mut self, other: ObservationCollector) -> Self {
        self.merge(other);
        self
    }

    /// Read-only view of the observations gathered so far.
    pub fn snapshot(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn coverage(&self) -> &CoverageAudit {
        &self.coverage
    }

    pub fn into_parts(self) -> (AnalysisResult, Vec<FileFailure>, CoverageAudit) {
        (self.result, self.failures, self.coverage)
    }
}
