//! Persistent per-declaration build artifacts and deployment history.
//!
//! Each compiled declaration is stored as one deterministically serialized
//! JSON record in the build directory. Records are overwritten wholesale on
//! recompilation, while their per-network deployment history is carried
//! across rebuilds and pruned only when the active network changes.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod fingerprint;
pub mod store;

pub use artifact::{Artifact, NetworkRecord};
pub use error::CacheError;
pub use fingerprint::CompilerFingerprint;
pub use store::ArtifactStore;
