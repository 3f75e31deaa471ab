//! Level summaries over an analysis result.
//!
//! Histograms always carry all six levels, zero-filled, so that reports have
//! a fixed shape regardless of what a codebase contains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collector::AnalysisResult;
use crate::level::Level;
use crate::observation::Observation;

/// Observation counts per level.
pub type Histogram = BTreeMap<Level, usize>;

fn empty_histogram() -> Histogram {
    Level::ALL.iter().map(|level| (*level, 0)).collect()
}

fn histogram<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Histogram {
    let mut hist = empty_histogram();
    for obs in observations {
        *hist.entry(obs.level).or_insert(0) += 1;
    }
    hist
}

/// Summary of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    #[serde(rename = "Levels")]
    pub levels: Histogram,
    #[serde(rename = "Observations")]
    pub observations: usize,
}

/// Summary of a whole result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSummary {
    pub levels: Histogram,
    pub files: BTreeMap<String, BTreeMap<String, FileSummary>>,
    pub total: usize,
    pub min_level: Option<Level>,
    pub max_level: Option<Level>,
}

impl LevelSummary {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let mut files: BTreeMap<String, BTreeMap<String, FileSummary>> = BTreeMap::new();
        for (repo, file, observations) in result.files() {
            files.entry(repo.to_string()).or_default().insert(
                file.to_string(),
                FileSummary {
                    levels: histogram(observations),
                    observations: observations.len(),
                },
            );
        }

        let levels = histogram(result.observations());
        let total = levels.values().sum();
        let min_level = result.observations().map(|o| o.level).min();
        let max_level = result.observations().map(|o| o.level).max();

        Self {
            levels,
            files,
            total,
            min_level,
            max_level,
        }
    }

    pub fn count(&self, level: Level) -> usize {
        self.levels.get(&level).copied().unwrap_or(0)
    }

    /// Share of observations at `level`, 0.0 when there are none.
    pub fn share(&self, level: Level) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(level) as f64 / self.total as f64
    }
}
