//! Compiler identity and settings recorded with every artifact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The compiler identity and optimizer settings that produced an artifact.
///
/// A cached artifact is only reused when its fingerprint equals the current
/// one in every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompilerFingerprint {
    /// Whether the optimizer was enabled.
    pub optimize: bool,
    /// Optimizer run count.
    pub runs: u32,
    /// Backend version string.
    pub version: String,
}

impl CompilerFingerprint {
    /// Creates a fingerprint from its parts.
    pub fn new(version: impl Into<String>, optimize: bool, runs: u32) -> Self {
        Self {
            optimize,
            runs,
            version: version.into(),
        }
    }
}

impl fmt::Display for CompilerFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optimize {
            write!(f, "{} (optimizer: {} runs)", self.version, self.runs)
        } else {
            write!(f, "{} (optimizer disabled)", self.version)
        }
    }
}
