//! Per-file analysis errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop the analysis of a single file.
///
/// None of these abort a run: the run records a [`FileFailure`] for the file
/// and moves on.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{file}: cannot read source: {reason}")]
    SourceUnreadable { file: String, reason: String },
    #[error("{file}:{line}:{column}: syntax error")]
    SourceUnparseable {
        file: String,
        line: usize,
        column: usize,
    },
    #[error("failed to load python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::SourceUnreadable { .. } => FailureKind::SourceUnreadable,
            AnalysisError::SourceUnparseable { .. } => FailureKind::SourceUnparseable,
            AnalysisError::Language(_) => FailureKind::Internal,
        }
    }
}

/// Category of a per-file failure note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceUnreadable,
    SourceUnparseable,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::SourceUnreadable => "source_unreadable",
            FailureKind::SourceUnparseable => "source_unparseable",
            FailureKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Note attached to a file that contributed no observations because it
/// could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub repository: String,
    pub file: String,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    pub fn new(repository: &str, file: &str, error: &AnalysisError) -> Self {
        Self {
            repository: repository.to_string(),
            file: file.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
