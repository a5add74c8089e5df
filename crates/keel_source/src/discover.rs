//! Recursive discovery of contract source files.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extension of contract source files.
pub const SOURCE_EXTENSION: &str = "sol";

/// Discovers contract source files under `dir` (recursive), sorted by path.
///
/// A missing directory yields an empty list; the caller decides whether
/// that is an error.
pub fn discover_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_sources_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("b.sol"), "").unwrap();
        std::fs::write(dir.path().join("lib/a.sol"), "").unwrap();
        std::fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = discover_sources(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.sol"), dir.path().join("lib/a.sol")]
        );
    }

    #[test]
    fn missing_dir_is_empty() {
        let files = discover_sources(Path::new("/nonexistent/contracts")).unwrap();
        assert!(files.is_empty());
    }
}
