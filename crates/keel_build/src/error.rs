//! Error types for build passes.

use std::path::PathBuf;

use keel_cache::CacheError;

use crate::backend::BackendError;

/// Errors that abort a build pass.
///
/// Discovery errors (`NoSources` through `InheritanceCycle`) are raised before
/// any compilation is attempted. A stale or unreadable cached artifact is
/// never an error; it only makes its declaration dirty.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The contracts directory holds no source files.
    #[error("cannot find any source files in {}", dir.display())]
    NoSources {
        /// The directory that was scanned.
        dir: PathBuf,
    },

    /// A source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Source {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Two declarations share a name.
    #[error("multiple declarations named '{name}' ({first} and {second})")]
    DuplicateDeclaration {
        /// The duplicated name.
        name: String,
        /// Location of the first declaration, as `path:line`.
        first: String,
        /// Location of the second declaration, as `path:line`.
        second: String,
    },

    /// A declaration inherits from a name no project file declares.
    #[error("'{name}' inherits from unknown declaration '{base}'")]
    UnknownBase {
        /// The inheriting declaration.
        name: String,
        /// The base name that could not be resolved.
        base: String,
    },

    /// The inheritance graph contains a cycle.
    #[error("inheritance cycle: {}", cycle.join(" -> "))]
    InheritanceCycle {
        /// Declarations on the cycle, ending with the first one repeated.
        cycle: Vec<String>,
    },

    /// The backend reported errors for a file.
    #[error("unable to compile {}: {} error(s)", file.display(), messages.len())]
    Compilation {
        /// The file that failed to compile.
        file: PathBuf,
        /// Every backend-formatted error message, verbatim.
        messages: Vec<String>,
    },

    /// The backend could not be invoked or returned unusable output.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend output lacks a declaration discovered in the file.
    #[error("compiler output for {} has no entry for '{name}'", file.display())]
    MissingOutput {
        /// The compiled file.
        file: PathBuf,
        /// The declaration missing from the output.
        name: String,
    },

    /// A library link reference does not fit inside its bytecode.
    #[error("invalid link reference to '{library}' at byte {start} in '{name}'")]
    InvalidLinkReference {
        /// The declaration whose bytecode holds the reference.
        name: String,
        /// The referenced library.
        library: String,
        /// Byte offset of the reference.
        start: usize,
    },

    /// Persisting an artifact failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
