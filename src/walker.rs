//! Single-pass classification of a parsed file.

use crate::catalog::ConstructKind;
use crate::collector::ObservationCollector;
use crate::observation::Observation;
use crate::parser::ParsedFile;
use crate::rules;

/// Counters from one walk, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub nodes: usize,
    pub monitored: usize,
    pub observations: usize,
}

/// Visits every node of one file's tree exactly once, in pre-order, and
/// levels each monitored node as it goes.
pub struct TreeWalker {
    repository: String,
    file: String,
}

impl TreeWalker {
    pub fn new(repository: &str, file: &str) -> Self {
        Self {
            repository: repository.to_string(),
            file: file.to_string(),
        }
    }

    /// Walk `parsed`, emitting observations and coverage misses into
    /// `collector` under this walker's (repository, file).
    pub fn walk(&self, parsed: &ParsedFile, collector: &mut ObservationCollector) -> WalkStats {
        collector.begin_file(&self.repository, &self.file);

        let mut stats = WalkStats::default();
        let mut cursor = parsed.root().walk();

        loop {
            let node = cursor.node();
            stats.nodes += 1;

            if let Some(kind) = ConstructKind::of(node) {
                stats.monitored += 1;
                match rules::judge(kind, node) {
                    Some(judgment) => {
                        stats.observations += 1;
                        collector.record(Observation::from_node(
                            &self.repository,
                            &self.file,
                            node,
                            judgment,
                        ));
                    }
                    None => collector.record_miss(kind),
                }
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return stats;
                }
            }
        }
    }
}
