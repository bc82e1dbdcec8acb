//! Structured, span-carrying diagnostic reporting (C1).
//!
//! Front-end passes (lexer, parser, name resolution, arity checks,
//! compile-time Dutch-book checks) accumulate diagnostics in a
//! [`DiagnosticBus`] rather than stopping at the first error, so an editor
//! (or the CLI) can show every problem in one pass.

use crate::error::Error;
use crate::span::{SourceMap, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A single structured diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Closed error-kind tag, e.g. `"DutchBook.Violation"`.
    pub kind: String,
    pub message: String,
    pub primary_span: Span,
    pub secondary_spans: Vec<Span>,
    pub remediation: Option<String>,
}

impl Diagnostic {
    pub fn from_error(err: &Error) -> Self {
        Diagnostic {
            severity: if err.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            },
            kind: err.kind().to_string(),
            message: err.to_string(),
            primary_span: err.span(),
            secondary_spans: Vec::new(),
            remediation: remediation_hint(err),
        }
    }

    pub fn note(kind: impl Into<String>, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity: Severity::Note,
            kind: kind.into(),
            message: message.into(),
            primary_span: span,
            secondary_spans: Vec::new(),
            remediation: None,
        }
    }

    /// Renders one line-oriented diagnostic: `severity[kind] file:line:col: message`.
    pub fn render_line(&self, map: &SourceMap) -> String {
        let mut out = format!(
            "{}[{}] {}: {}",
            self.severity,
            self.kind,
            map.render_span(self.primary_span),
            self.message
        );
        if let Some(hint) = &self.remediation {
            out.push_str(&format!("\n  help: {}", hint));
        }
        out
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn remediation_hint(err: &Error) -> Option<String> {
    match err {
        Error::CoolOffActive { remaining, .. } => {
            Some(format!("wait {:.1}s before betting again", remaining))
        }
        Error::DutchBookViolation { sum, .. } => Some(format!(
            "normalize weights so they sum to 1 (currently {})",
            sum
        )),
        Error::NameUnbound { name, .. } => {
            Some(format!("bind '{}' with a `let`, `define`, or lambda parameter", name))
        }
        _ => None,
    }
}

/// Accumulates diagnostics across a front-end pass without short-circuiting.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBus {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBus {
    pub fn new() -> Self {
        DiagnosticBus::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn push_error(&mut self, err: &Error) {
        self.push(Diagnostic::from_error(err));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn extend(&mut self, other: DiagnosticBus) {
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_accumulates_multiple_errors() {
        let mut bus = DiagnosticBus::new();
        bus.push_error(&Error::NameUnbound {
            name: "x".into(),
            span: Span::dummy(),
        });
        bus.push_error(&Error::DivisionByZero { span: Span::dummy() });
        assert_eq!(bus.into_vec().len(), 2);
    }

    #[test]
    fn coolor_off_gets_remediation_hint() {
        let err = Error::CoolOffActive {
            remaining: 4.9,
            span: Span::dummy(),
        };
        let d = Diagnostic::from_error(&err);
        assert!(d.remediation.unwrap().contains("4.9"));
    }
}
