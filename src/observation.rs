//! Observation records emitted by the classifier.

use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::rules::Judgment;

/// One leveled construct instance in one file.
///
/// Positions come from the tree-sitter node: lines are 1-indexed, the
/// column offset is the 0-indexed byte offset of the node's first byte within
/// its line. An `elif` ends where the last alternative after it ends.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Observation {
    pub repository: String,
    pub file: String,
    pub label: String,
    pub start_line: usize,
    pub end_line: usize,
    pub col_offset: usize,
    pub level: Level,
}

impl Observation {
    /// Build an observation for a node that a rule leveled.
    pub fn from_node(
        repository: &str,
        file: &str,
        node: tree_sitter::Node,
        judgment: Judgment,
    ) -> Self {
        let start = node.start_position();
        let end = end_position(node);
        Self {
            repository: repository.to_string(),
            file: file.to_string(),
            label: judgment.label.to_string(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            end_line: end.row + 1,
            col_offset: start.column,
            level: judgment.level,
        }
    }
}

/// An `elif` is an `If` nested in the preceding `else`, so it owns every
/// `elif` and `else` that follows it.
fn end_position(node: tree_sitter::Node) -> tree_sitter::Point {
    if node.kind() != "elif_clause" {
        return node.end_position();
    }
    let mut last = node;
    let mut next = node.next_named_sibling();
    while let Some(sibling) = next {
        match sibling.kind() {
            "elif_clause" | "else_clause" => last = sibling,
            "comment" => {}
            _ => break,
        }
        next = sibling.next_named_sibling();
    }
    last.end_position()
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{} {} [{}]",
            self.file, self.start_line, self.col_offset, self.label, self.level
        )
    }
}
