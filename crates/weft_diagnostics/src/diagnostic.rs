//! Structured diagnostic messages with severity, codes, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured diagnostic message.
///
/// Diagnostics are the primary mechanism for reporting errors and warnings
/// to the user. Each diagnostic includes a severity level, a unique code,
/// a primary message, and optional explanatory notes. Messages name the
/// offending nets, wires, pips and sink indices directly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The unique code identifying the type of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code and message.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given code and message.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(code, "no wire found for source of net clk");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "no wire found for source of net clk");
        assert_eq!(format!("{}", diag.code), "E101");
    }

    #[test]
    fn create_warning() {
        let code = DiagnosticCode::new(Category::Routing, 201);
        let diag = Diagnostic::warning(code, "failed to find a route for arc 2 of net data");
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn notes_accumulate() {
        let code = DiagnosticCode::new(Category::Error, 102);
        let diag = Diagnostic::error(code, "two nets share a source wire")
            .with_note("first net: a")
            .with_note("second net: b");
        assert_eq!(diag.notes.len(), 2);
    }

    #[test]
    fn display_includes_code_and_notes() {
        let code = DiagnosticCode::new(Category::Routing, 202);
        let diag = Diagnostic::warning(code, "did not converge").with_note("queue: 3 arcs");
        let s = format!("{diag}");
        assert!(s.contains("warning[R202]"));
        assert!(s.contains("note: queue: 3 arcs"));
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Warning, 1);
        let diag = Diagnostic::warning(code, "dead soft routing removed");
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, diag.message);
        assert_eq!(back.severity, diag.severity);
    }
}
