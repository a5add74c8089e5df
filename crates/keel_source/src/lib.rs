//! Source file management and discovery for contract projects.
//!
//! This crate provides the [`SourceDb`] for loading and hashing the source files
//! of one build pass, [`FileId`] handles into it, and [`discover_sources`] for
//! walking a project's contract tree.

#![warn(missing_docs)]

pub mod discover;
pub mod file_id;
pub mod source_db;
pub mod source_file;

pub use discover::{discover_sources, SOURCE_EXTENSION};
pub use file_id::FileId;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
