//! Dependency-aware incremental compilation of contract projects.
//!
//! A build pass discovers every declaration in the project's sources, computes
//! each declaration's transitive inheritance dependencies, decides which
//! declarations are dirty against the persisted artifacts, submits only the
//! files holding dirty declarations to the compiler backend, and persists the
//! post-processed output through [`keel_cache::ArtifactStore`].

#![warn(missing_docs)]

pub mod backend;
pub mod builder;
pub mod closure;
pub mod error;
pub mod extract;
pub mod index;
pub mod link;
pub mod pipeline;
pub mod process;
pub mod session;

pub use backend::{
    BackendError, BackendMessage, CompilerBackend, CompilerInput, CompilerOutput, ContractOutput,
    LinkReference,
};
pub use builder::build_artifacts;
pub use closure::compute_closures;
pub use error::BuildError;
pub use extract::{extract_declarations, ExtractedDeclaration};
pub use index::{Declaration, ProjectIndex};
pub use link::{library_marker, placeholder_library, rewrite_link_placeholders};
pub use pipeline::{
    compile_project, BuildOutput, BuildProgress, CompilerSettings, NoProgress, ProjectLayout,
};
pub use process::ProcessBackend;
pub use session::BuildSession;
