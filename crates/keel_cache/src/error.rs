//! Error types for artifact store operations.

use std::path::PathBuf;

/// Errors that can occur during artifact store operations.
///
/// Reads are fail-safe and never produce these errors: an unreadable record
/// is a cache miss. Writes and deployment updates do.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing artifact files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A deployment was recorded for a declaration that has no artifact.
    #[error("no artifact for '{name}'; build the project first")]
    MissingArtifact {
        /// The declaration name.
        name: String,
    },

    /// Persisting the artifact of a declaration failed.
    #[error("failed to persist artifact '{name}': {source}")]
    Persist {
        /// The declaration name.
        name: String,
        /// The underlying failure.
        source: Box<CacheError>,
    },
}

impl CacheError {
    /// Wraps this error with the name of the declaration being persisted.
    pub fn persisting(self, name: &str) -> Self {
        CacheError::Persist {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("build/contracts/Token.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("Token.json"));
    }

    #[test]
    fn missing_artifact_display() {
        let err = CacheError::MissingArtifact {
            name: "Token".to_string(),
        };
        assert!(err.to_string().contains("'Token'"));
    }

    #[test]
    fn persisting_attaches_name() {
        let err = CacheError::Serialization {
            reason: "bad".to_string(),
        }
        .persisting("Token");
        let msg = err.to_string();
        assert!(msg.contains("failed to persist artifact 'Token'"));
        assert!(msg.contains("serialization error: bad"));
    }
}
