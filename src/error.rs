// Diagnostics and error kinds for edgeflow
//
// Nothing in the pipeline aborts on a bad declaration or a bad edge. Each
// phase instead returns a list of diagnostics next to its output:
//
//   compile ──► (Program, Vec<ParseDiagnostic>)
//   run     ──► Vec<ExecDiagnostic>

use crate::token::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure converting a literal lexeme into a typed Value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ValueError {
    #[error("invalid int literal '{0}'")]
    InvalidInt(String),
    #[error("invalid double literal '{0}'")]
    InvalidDouble(String),
}

/// What went wrong while parsing a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseErrorKind {
    // Top level
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    // Block syntax: the declaration is dropped
    #[error("expected '{{' after '{0}', got '{1}'")]
    ExpectedBlock(String, String),
    #[error("expected a field name, got '{0}'")]
    ExpectedFieldName(String),
    #[error("expected ':' after '{0}', got '{1}'")]
    ExpectedColon(String, String),
    #[error("missing value for field '{0}'")]
    MissingValue(String),
    #[error("unterminated '{0}' block")]
    UnterminatedBlock(String),

    // Field semantics: the declaration continues
    #[error("unknown field '{field}' in {block} block")]
    UnknownField { block: String, field: String },
    #[error("unknown type '{0}', expected int, double, or string")]
    UnknownType(String),
    #[error("type must precede value")]
    TypeBeforeValue,
    #[error(transparent)]
    InvalidLiteral(#[from] ValueError),
    #[error("'{0}' is not a literal value")]
    NotALiteral(String),
    #[error("expected true or false for is_output, got '{0}'")]
    InvalidBool(String),
    #[error("expected a node name for '{field}', got '{got}'")]
    InvalidName { field: String, got: String },

    // Commit checks
    #[error("node must have a name")]
    MissingNodeName,
    #[error("duplicate node '{0}', keeping the first declaration")]
    DuplicateNode(String),
    #[error("edge must have from, to, and op")]
    IncompleteEdge,
}

/// A parse-time problem, located at the offending token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseDiagnostic {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Source text of the offending token.
    pub lexeme: String,
}

impl ParseDiagnostic {
    pub fn new(kind: ParseErrorKind, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.span, self.kind)
    }
}

impl std::error::Error for ParseDiagnostic {}

/// What went wrong while executing an edge. The edge is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ExecErrorKind {
    #[error("node not found for edge: '{0}'")]
    NodeNotFound(String),
    #[error("cannot perform numeric operation on a string ('{0}')")]
    NumericOnText(String),
    #[error("cannot repeat a string by a string count")]
    TextRepeatCount,
    #[error("text result of {len} bytes exceeds the limit of {limit}")]
    TextTooLong { len: usize, limit: usize },
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// An execution-time problem, tied to the edge that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecDiagnostic {
    /// Index of the edge in declaration order.
    pub edge: usize,
    pub from: String,
    pub to: String,
    pub kind: ExecErrorKind,
}

impl fmt::Display for ExecDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edge #{} ({} -> {}): {}",
            self.edge, self.from, self.to, self.kind
        )
    }
}

impl std::error::Error for ExecDiagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnostic_display() {
        let d = ParseDiagnostic::new(
            ParseErrorKind::UnexpectedToken("}".into()),
            Span::new(10, 1, 2, 5),
            "}",
        );
        assert_eq!(d.to_string(), "[2:5] unexpected token '}'");
    }

    #[test]
    fn test_literal_error_is_transparent() {
        let kind: ParseErrorKind = ValueError::InvalidInt("x".into()).into();
        assert_eq!(kind.to_string(), "invalid int literal 'x'");
    }

    #[test]
    fn test_exec_diagnostic_display() {
        let d = ExecDiagnostic {
            edge: 3,
            from: "a".into(),
            to: "b".into(),
            kind: ExecErrorKind::UnknownOperation("^".into()),
        };
        assert_eq!(d.to_string(), "edge #3 (a -> b): unknown operation '^'");
    }
}
