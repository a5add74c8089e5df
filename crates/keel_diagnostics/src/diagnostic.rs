//! Structured diagnostic messages with severity, codes, and locations.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A structured diagnostic message.
///
/// Diagnostics raised by Keel itself carry a message and an optional location.
/// Diagnostics relayed from the compiler backend also carry the backend's
/// pre-formatted text in `rendered`, which is shown verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The source file the diagnostic refers to, if any.
    pub file: Option<PathBuf>,
    /// The 1-indexed line within `file`, if known.
    pub line: Option<u32>,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Backend-formatted text, rendered unchanged when present.
    pub rendered: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity, code, and message.
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            file: None,
            line: None,
            notes: Vec::new(),
            rendered: None,
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Attaches a source location.
    pub fn at(mut self, file: impl Into<PathBuf>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Sets the backend-formatted text.
    pub fn with_rendered(mut self, rendered: impl Into<String>) -> Self {
        self.rendered = Some(rendered.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Backend, 1);
        let diag = Diagnostic::error(code, "Expected ';' but got '}'");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(format!("{}", diag.code), "B001");
        assert!(diag.file.is_none());
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Backend, 1);
        let diag = Diagnostic::warning(code, "unused variable")
            .at("contracts/A.sol", Some(4))
            .with_note("declared here")
            .with_rendered("contracts/A.sol:4:5: Warning: unused variable");
        assert_eq!(diag.line, Some(4));
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.rendered.unwrap().starts_with("contracts/A.sol:4:5"));
    }
}
