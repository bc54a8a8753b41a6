use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::constants::documents::JSON_EXTENSION;
use crate::source::JsonFileSource;

/// Expands configured source locations into per-file JSON sources.
///
/// A directory becomes every `*.json` file beneath it in sorted path order.
/// Anything else is kept verbatim, so a missing path still reaches the loader
/// and is reported there as unavailable. Excluded directories are pruned from
/// directory walks.
#[derive(Clone, Debug, Default)]
pub struct JsonDiscovery {
    follow_links: bool,
    excluded: Vec<PathBuf>,
}

impl JsonDiscovery {
    /// Discovery that does not follow symlinks and excludes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Never descend into `dir` while walking directory locations.
    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded.push(dir.into());
        self
    }

    /// Configure symlink traversal inside directory locations.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Resolve `locations` in order.
    pub fn expand(&self, locations: &[PathBuf]) -> Vec<JsonFileSource> {
        let excluded: Vec<PathBuf> = self.excluded.iter().map(|dir| resolve(dir)).collect();
        let mut sources = Vec::new();
        for location in locations {
            if location.is_dir() {
                let files = self.json_files_under(location, &excluded);
                debug!(
                    root = %location.display(),
                    files = files.len(),
                    "expanded source directory"
                );
                sources.extend(files.into_iter().map(JsonFileSource::new));
            } else {
                sources.push(JsonFileSource::new(location.clone()));
            }
        }
        sources
    }

    fn json_files_under(&self, root: &Path, excluded: &[PathBuf]) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || !excluded.iter().any(|dir| resolve(entry.path()).starts_with(dir))
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_json_file(path))
            .collect();
        files.sort();
        files
    }
}

/// Canonical form when the path exists, otherwise the path as given.
fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// True if the path has a `.json` extension (case-insensitive).
pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(JSON_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SampleSource;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn directories_expand_to_sorted_json_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b").join("2.json"), "[]").unwrap();
        fs::write(root.join("a.JSON"), "[]").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();

        let sources = JsonDiscovery::new().expand(&[root.to_path_buf()]);
        let paths: Vec<_> = sources.iter().map(|source| source.path().to_path_buf()).collect();
        assert_eq!(paths, vec![root.join("a.JSON"), root.join("b").join("2.json")]);
    }

    #[test]
    fn files_and_missing_paths_pass_through_in_order() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("given.json");
        fs::write(&file, "[]").unwrap();
        let missing = dir.path().join("missing.json");

        let sources = JsonDiscovery::new()
            .with_follow_symlinks(true)
            .expand(&[missing.clone(), file.clone()]);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].path(), missing.as_path());
        assert_eq!(sources[1].id(), file.display().to_string());
    }

    #[test]
    fn excluded_directories_are_not_walked() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        fs::create_dir_all(root.join("out").join("server").join("O")).unwrap();
        fs::write(root.join("input.json"), "[]").unwrap();
        fs::write(root.join("out").join("server").join("O").join("O_0.json"), "{}").unwrap();

        let sources = JsonDiscovery::new()
            .excluding(root.join(".").join("out"))
            .expand(&[root.clone()]);
        let paths: Vec<_> = sources.iter().map(|source| source.path().to_path_buf()).collect();
        assert_eq!(paths, vec![root.join("input.json")]);
    }

    #[test]
    fn json_extension_check_is_case_insensitive() {
        assert!(is_json_file(Path::new("x.json")));
        assert!(is_json_file(Path::new("x.Json")));
        assert!(!is_json_file(Path::new("x.jsonl")));
        assert!(!is_json_file(Path::new("json")));
    }
}
