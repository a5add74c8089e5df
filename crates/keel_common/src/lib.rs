//! Shared foundational types used across the Keel contract build toolchain.
//!
//! This crate provides content hashing for change detection, the kinds of
//! declarations a source file can contain, and time-based deployment
//! identifiers for per-network deployment history.

#![warn(missing_docs)]

pub mod deployment;
pub mod hash;
pub mod kind;

pub use deployment::{now_millis, DeploymentId, ParseDeploymentIdError};
pub use hash::{ContentHash, ParseHashError};
pub use kind::DeclarationKind;
