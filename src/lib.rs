//! pycefrl - Python code level analyzer.
//!
//! Grades the syntactic constructs of Python source code on a CEFR-style
//! scale from A1 (beginner) to C2 (mastery). Every monitored construct that a
//! leveling rule recognizes becomes an [`Observation`] carrying a label, its
//! source position and a [`Level`].
//!
//! # Architecture
//!
//! - `parser`: tree-sitter parsing of one file
//! - `catalog`: the closed set of monitored construct kinds
//! - `rules`: per-kind leveling rules
//! - `walker`: single pre-order pass dispatching nodes to rules
//! - `collector`: per-file observation sequences and merging
//! - `run`: analysis over many files, in parallel
//! - `source`: where the files come from
//! - `config`, `report`, `summary`: configuration and output
//!
//! ```no_run
//! use pycefrl::{AnalysisRun, DirectorySource};
//!
//! let report = AnalysisRun::new().run_source(&DirectorySource::new("src"))?;
//! for obs in report.result.observations() {
//!     println!("{}", obs);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod level;
pub mod observation;
pub mod parser;
pub mod report;
pub mod rules;
pub mod run;
pub mod source;
pub mod summary;
pub mod walker;

pub use catalog::{ConstructGroup, ConstructKind};
pub use collector::{AnalysisResult, CoverageAudit, ObservationCollector};
pub use config::Config;
pub use error::{AnalysisError, FailureKind, FileFailure};
pub use level::Level;
pub use observation::Observation;
pub use run::{analyze_source, AnalysisRun, CancelToken, RunReport};
pub use source::{DirectorySource, FileSource, MemorySource, SourceEntry};
pub use summary::LevelSummary;
