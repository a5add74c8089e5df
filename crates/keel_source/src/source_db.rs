//! Central database of all source files in a build pass.

use crate::file_id::FileId;
use crate::source_file::SourceFile;
use std::io;
use std::path::{Path, PathBuf};

/// The source database, owning all loaded source text for one build pass.
#[derive(Debug)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Loads a source file from disk, recording it under `name`.
    ///
    /// `name` is the project-relative path reported in artifacts and used
    /// as the compilation unit key.
    pub fn load_file(&mut self, disk_path: &Path, name: impl Into<PathBuf>) -> io::Result<FileId> {
        let content = std::fs::read_to_string(disk_path)?;
        Ok(self.add_source(name, content))
    }

    /// Adds a source file from an in-memory string (useful for tests).
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        let file = SourceFile::new(id, name.into(), content);
        self.files.push(file);
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` was not issued by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Iterates over all loaded files in load order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Returns the number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no files have been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}
