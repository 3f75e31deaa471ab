//! File sources: where the sources to analyze come from.
//!
//! The classifier only consumes `(repository, file, text)` triples. A
//! [`FileSource`] produces [`SourceEntry`] values; the text is loaded lazily
//! so that reading happens on the worker that analyzes the file.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::AnalysisError;

/// Where a source entry's text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Text supplied directly.
    Text(String),
    /// A file to read when the entry is analyzed.
    Path(PathBuf),
}

/// One file to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub repository: String,
    pub file: String,
    pub origin: SourceOrigin,
}

impl SourceEntry {
    pub fn from_text(repository: &str, file: &str, text: impl Into<String>) -> Self {
        Self {
            repository: repository.to_string(),
            file: file.to_string(),
            origin: SourceOrigin::Text(text.into()),
        }
    }

    pub fn from_path(repository: &str, file: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.to_string(),
            file: file.to_string(),
            origin: SourceOrigin::Path(path.into()),
        }
    }

    /// Load the entry's text. Bytes that are not valid UTF-8 make the source
    /// unreadable.
    pub fn load(&self) -> Result<String, AnalysisError> {
        match &self.origin {
            SourceOrigin::Text(text) => Ok(text.clone()),
            SourceOrigin::Path(path) => {
                let bytes = std::fs::read(path).map_err(|e| AnalysisError::SourceUnreadable {
                    file: self.file.clone(),
                    reason: e.to_string(),
                })?;
                String::from_utf8(bytes).map_err(|e| AnalysisError::SourceUnreadable {
                    file: self.file.clone(),
                    reason: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
                })
            }
        }
    }
}

/// Supplies the entries of a run, in order.
pub trait FileSource {
    fn entries(&self) -> anyhow::Result<Vec<SourceEntry>>;
}

/// In-memory `(repository, file, text)` triples.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<SourceEntry>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, repository: &str, file: &str, text: impl Into<String>) -> Self {
        self.entries
            .push(SourceEntry::from_text(repository, file, text));
        self
    }
}

impl FileSource for MemorySource {
    fn entries(&self) -> anyhow::Result<Vec<SourceEntry>> {
        Ok(self.entries.clone())
    }
}

/// Python files found by walking a local directory.
pub struct DirectorySource {
    root: PathBuf,
    repository: String,
    excluded: GlobSet,
    include_hidden: bool,
}

impl DirectorySource {
    /// Walk `root`; the repository identifier defaults to the root's
    /// directory name.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let repository = default_repository_name(&root);
        Self {
            root,
            repository,
            excluded: GlobSet::empty(),
            include_hidden: false,
        }
    }

    pub fn repository(mut self, name: &str) -> Self {
        self.repository = name.to_string();
        self
    }

    /// Skip paths (relative to the root) matching any of these globs.
    pub fn exclude(mut self, patterns: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        self.excluded = builder.build()?;
        Ok(self)
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn repository_name(&self) -> &str {
        &self.repository
    }

    /// Relative name of a `.py` path that is not excluded.
    fn python_file(&self, path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            return None;
        }
        let rel = self.relative(path);
        if self.excluded.is_match(&rel) {
            return None;
        }
        Some(rel)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

impl FileSource for DirectorySource {
    fn entries(&self) -> anyhow::Result<Vec<SourceEntry>> {
        // A single file is a repository of one.
        if self.root.is_file() {
            let name = self
                .root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Ok(vec![SourceEntry::from_path(&self.repository, &name, &self.root)]);
        }

        let include_hidden = self.include_hidden;
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 || include_hidden || !e.file_type().is_dir() {
                    return true;
                }
                !e.file_name().to_string_lossy().starts_with('.')
            })
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    // A broken path is one file's failure, not the run's.
                    tracing::warn!(error = %err, "skipping unreadable path");
                    if let Some(rel) = err.path().and_then(|p| self.python_file(p)) {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        entries.push(SourceEntry::from_path(&self.repository, &rel, path));
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = self.python_file(entry.path()) {
                entries.push(SourceEntry::from_path(&self.repository, &rel, entry.path()));
            }
        }

        entries.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(entries)
    }
}

fn default_repository_name(root: &Path) -> String {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let dir = if resolved.is_file() {
        resolved.parent().map(Path::to_path_buf).unwrap_or(resolved)
    } else {
        resolved
    };
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn files(entries: &[SourceEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.file.as_str()).collect()
    }

    #[test]
    fn test_directory_source_finds_python_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("main.py"), "import os\n").unwrap();
        fs::write(temp.path().join("pkg/util.py"), "x = 1\n").unwrap();
        fs::write(temp.path().join("README.md"), "# readme\n").unwrap();

        let source = DirectorySource::new(temp.path()).repository("demo");
        let entries = source.entries().unwrap();

        assert_eq!(files(&entries), vec!["main.py", "pkg/util.py"]);
        assert!(entries.iter().all(|e| e.repository == "demo"));
    }

    #[test]
    fn test_hidden_directories_are_skipped_by_default() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".venv/lib")).unwrap();
        fs::write(temp.path().join(".venv/lib/site.py"), "x = 1\n").unwrap();
        fs::write(temp.path().join("app.py"), "x = 1\n").unwrap();

        let entries = DirectorySource::new(temp.path()).entries().unwrap();
        assert_eq!(files(&entries), vec!["app.py"]);

        let entries = DirectorySource::new(temp.path())
            .include_hidden(true)
            .entries()
            .unwrap();
        assert_eq!(files(&entries), vec![".venv/lib/site.py", "app.py"]);
    }

    #[test]
    fn test_excluded_globs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("build/gen")).unwrap();
        fs::write(temp.path().join("build/gen/out.py"), "x = 1\n").unwrap();
        fs::write(temp.path().join("keep.py"), "x = 1\n").unwrap();

        let entries = DirectorySource::new(temp.path())
            .exclude(&["build/**".to_string()])
            .unwrap()
            .entries()
            .unwrap();
        assert_eq!(files(&entries), vec!["keep.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_a_file_failure() {
        use crate::error::FailureKind;
        use crate::run::AnalysisRun;

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ok.py"), "x = [1]\n").unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.py"), temp.path().join("dangling.py"))
            .unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), temp.path().join("notes.txt"))
            .unwrap();

        let source = DirectorySource::new(temp.path()).repository("r");
        let entries = source.entries().unwrap();
        assert_eq!(files(&entries), vec!["dangling.py", "ok.py"]);

        let report = AnalysisRun::new().jobs(1).run(&entries);
        assert_eq!(report.result.get("r", "ok.py").map(|o| o.len()), Some(1));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "dangling.py");
        assert_eq!(report.failures[0].kind, FailureKind::SourceUnreadable);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(DirectorySource::new(temp.path().join("absent"))
            .entries()
            .is_err());
    }

    #[test]
    fn test_default_config_exclusions() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/venv/lib")).unwrap();
        fs::create_dir_all(temp.path().join("src/__pycache__")).unwrap();
        fs::write(temp.path().join("src/venv/lib/x.py"), "x = 1\n").unwrap();
        fs::write(temp.path().join("src/__pycache__/y.py"), "y = 1\n").unwrap();
        fs::write(temp.path().join("src/app.py"), "z = 1\n").unwrap();

        let config = crate::config::Config::parse_str(crate::config::DEFAULT_CONFIG_YAML).unwrap();
        let entries = DirectorySource::new(temp.path())
            .exclude(&config.excluded_paths)
            .unwrap()
            .entries()
            .unwrap();
        assert_eq!(files(&entries), vec!["src/app.py"]);
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(DirectorySource::new(temp.path())
            .exclude(&["[".to_string()])
            .is_err());
    }

    #[test]
    fn test_single_file_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("solo.py");
        fs::write(&file, "pass\n").unwrap();

        let entries = DirectorySource::new(&file).entries().unwrap();
        assert_eq!(files(&entries), vec!["solo.py"]);
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("latin1.py");
        fs::write(&file, b"x = '\xe9'\n").unwrap();

        let entry = SourceEntry::from_path("r", "latin1.py", &file);
        assert!(matches!(
            entry.load(),
            Err(AnalysisError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let entry = SourceEntry::from_path("r", "gone.py", "/definitely/not/here.py");
        assert!(matches!(
            entry.load(),
            Err(AnalysisError::SourceUnreadable { .. })
        ));
    }

    #[test]
    fn test_memory_source_keeps_order() {
        let source = MemorySource::new()
            .add("r", "b.py", "pass\n")
            .add("r", "a.py", "pass\n");
        assert_eq!(files(&source.entries().unwrap()), vec!["b.py", "a.py"]);
    }
}
