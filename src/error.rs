//! Error types for the BetLang pipeline.

use crate::span::Span;
use thiserror::Error;

/// BetLang pipeline errors. One variant per closed error kind from the
/// closed error-kind namespace (`Lex.*`, `Parse.*`, `Name.Unbound`, ...).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ---- Lex.* ----
    /// Lex.UnterminatedString
    #[error("unterminated string literal")]
    LexUnterminatedString { span: Span },

    /// Lex.BadEscape
    #[error("invalid escape sequence '\\{escape}'")]
    LexBadEscape { escape: char, span: Span },

    /// Lex.InvalidChar
    #[error("unexpected character '{found}'")]
    LexInvalidChar { found: char, span: Span },

    // ---- Parse.* ----
    /// Parse.UnexpectedToken
    #[error("expected {expected}, found {found}")]
    ParseUnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// Parse.UnexpectedEof
    #[error("unexpected end of input, expected {expected}")]
    ParseUnexpectedEof { expected: String, span: Span },

    /// Parse.Malformed
    #[error("malformed {construct}: {reason}")]
    ParseMalformed {
        construct: String,
        reason: String,
        span: Span,
    },

    // ---- Name.Unbound ----
    #[error("unbound name '{name}'")]
    NameUnbound { name: String, span: Span },

    // ---- Arity.Mismatch ----
    #[error("{form} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        form: String,
        expected: String,
        got: usize,
        span: Span,
    },

    // ---- Type.Mismatch ----
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: String,
        got: String,
        span: Span,
    },

    // ---- Pattern.NonExhaustive (warning by default) ----
    #[error("match is not exhaustive over known tags: missing {missing:?}")]
    PatternNonExhaustive { missing: Vec<String>, span: Span },

    // ---- DutchBook.Violation ----
    #[error("Dutch-book violation: probabilities sum to {sum} (margin {margin})")]
    DutchBookViolation {
        sum: f64,
        margin: f64,
        span: Span,
    },

    // ---- Probability.* ----
    #[error("probability {value} is out of range [0, 1]")]
    ProbabilityOutOfRange { value: f64, span: Span },

    #[error("negative weight {weight} is not allowed")]
    ProbabilityNegativeWeight { weight: f64, span: Span },

    #[error("total weight is zero")]
    ProbabilityZeroTotal { span: Span },

    // ---- Risk.* ----
    #[error("stake {stake} on bankroll {bankroll} exceeds the safe fraction")]
    RiskStakeUnsafe {
        stake: f64,
        bankroll: f64,
        span: Span,
    },

    #[error("stake fraction {fraction} exceeds Kelly bound {kelly_bound}")]
    RiskKellyExceeded {
        fraction: f64,
        kelly_bound: f64,
        span: Span,
    },

    // ---- CoolOff.Active ----
    #[error("cool-off active, {remaining:.1}s remaining")]
    CoolOffActive { remaining: f64, span: Span },

    // ---- Numeric.* ----
    #[error("numeric domain error: {reason}")]
    NumericDomainError { reason: String, span: Span },

    #[error("Dempster-Shafer combination has total conflict (masses do not overlap)")]
    NumericTotalConflict { span: Span },

    // ---- Eval.Aborted ----
    #[error("evaluation aborted: {reason}")]
    EvalAborted { reason: String, span: Span },

    // ---- Misc runtime ----
    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("index {index} out of bounds for collection of length {length}")]
    IndexOutOfBounds {
        index: usize,
        length: usize,
        span: Span,
    },

    #[error("value of type {type_name} is not callable")]
    NotCallable { type_name: String, span: Span },

    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// The span this error is anchored to, for diagnostic rendering.
    pub fn span(&self) -> Span {
        match self {
            Error::LexUnterminatedString { span }
            | Error::LexBadEscape { span, .. }
            | Error::LexInvalidChar { span, .. }
            | Error::ParseUnexpectedToken { span, .. }
            | Error::ParseUnexpectedEof { span, .. }
            | Error::ParseMalformed { span, .. }
            | Error::NameUnbound { span, .. }
            | Error::ArityMismatch { span, .. }
            | Error::TypeMismatch { span, .. }
            | Error::PatternNonExhaustive { span, .. }
            | Error::DutchBookViolation { span, .. }
            | Error::ProbabilityOutOfRange { span, .. }
            | Error::ProbabilityNegativeWeight { span, .. }
            | Error::ProbabilityZeroTotal { span }
            | Error::RiskStakeUnsafe { span, .. }
            | Error::RiskKellyExceeded { span, .. }
            | Error::CoolOffActive { span, .. }
            | Error::NumericDomainError { span, .. }
            | Error::NumericTotalConflict { span }
            | Error::EvalAborted { span, .. }
            | Error::DivisionByZero { span }
            | Error::IndexOutOfBounds { span, .. }
            | Error::NotCallable { span, .. } => *span,
            Error::Internal(_) => Span::dummy(),
        }
    }

    /// The closed error-kind tag used in diagnostic output (`Lex.*`, `Parse.*`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            Error::LexUnterminatedString { .. } => "Lex.UnterminatedString",
            Error::LexBadEscape { .. } => "Lex.BadEscape",
            Error::LexInvalidChar { .. } => "Lex.InvalidChar",
            Error::ParseUnexpectedToken { .. } => "Parse.UnexpectedToken",
            Error::ParseUnexpectedEof { .. } => "Parse.UnexpectedEof",
            Error::ParseMalformed { .. } => "Parse.Malformed",
            Error::NameUnbound { .. } => "Name.Unbound",
            Error::ArityMismatch { .. } => "Arity.Mismatch",
            Error::TypeMismatch { .. } => "Type.Mismatch",
            Error::PatternNonExhaustive { .. } => "Pattern.NonExhaustive",
            Error::DutchBookViolation { .. } => "DutchBook.Violation",
            Error::ProbabilityOutOfRange { .. } => "Probability.OutOfRange",
            Error::ProbabilityNegativeWeight { .. } => "Probability.NegativeWeight",
            Error::ProbabilityZeroTotal { .. } => "Probability.ZeroTotal",
            Error::RiskStakeUnsafe { .. } => "Risk.StakeUnsafe",
            Error::RiskKellyExceeded { .. } => "Risk.KellyExceeded",
            Error::CoolOffActive { .. } => "CoolOff.Active",
            Error::NumericDomainError { .. } => "Numeric.DomainError",
            Error::NumericTotalConflict { .. } => "Numeric.TotalConflict",
            Error::EvalAborted { .. } => "Eval.Aborted",
            Error::DivisionByZero { .. } => "Eval.DivisionByZero",
            Error::IndexOutOfBounds { .. } => "Eval.IndexOutOfBounds",
            Error::NotCallable { .. } => "Eval.NotCallable",
            Error::Internal(_) => "Internal",
        }
    }

    /// Whether this kind is a warning rather than a hard error by default.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::PatternNonExhaustive { .. })
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// Result type for BetLang operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_spec_namespaces() {
        let e = Error::DutchBookViolation {
            sum: 1.1,
            margin: 0.1,
            span: Span::dummy(),
        };
        assert_eq!(e.kind(), "DutchBook.Violation");
        assert!(!e.is_warning());
    }

    #[test]
    fn non_exhaustive_is_a_warning() {
        let e = Error::PatternNonExhaustive {
            missing: vec!["c".into()],
            span: Span::dummy(),
        };
        assert!(e.is_warning());
    }
}
