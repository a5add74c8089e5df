//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[W001]: compiler reports version 0.4.24, but the project pins 0.5.0
///    = note: artifacts are fingerprinted with the reported version
/// ```
/// Diagnostics carrying backend-formatted text print that text unchanged.
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_severity(&self, severity: Severity) -> String {
        if !self.color {
            return severity.to_string();
        }
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Info => "36",
        };
        format!("\x1b[1;{code}m{severity}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        if let Some(rendered) = &diag.rendered {
            return rendered.trim_end().to_string();
        }

        let mut out = format!(
            "{}[{}]: {}",
            self.paint_severity(diag.severity),
            diag.code,
            diag.message
        );
        if let Some(file) = &diag.file {
            match diag.line {
                Some(line) => out.push_str(&format!("\n  --> {}:{line}", file.display())),
                None => out.push_str(&format!("\n  --> {}", file.display())),
            }
        }
        for note in &diag.notes {
            out.push_str(&format!("\n   = note: {note}"));
        }
        out
    }
}
