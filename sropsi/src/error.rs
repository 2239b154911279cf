use chumsky::error::{Simple, SimpleReason};
use thiserror::Error;

use crate::prelude::*;

/// Why the parser rejected its input.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    #[error("unexpected {}, expected {}", found_or_end(.found), expected_list(.expected))]
    Unexpected {
        expected: Vec<String>,
        found: Option<String>,
    },
    #[error("unclosed delimiter {delimiter}")]
    Unclosed { span: Span, delimiter: String },
    #[error("{0}")]
    Custom(String),
    #[error("terms nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

fn found_or_end(found: &Option<String>) -> &str {
    found.as_deref().unwrap_or("end of the input")
}

fn expected_list(expected: &[String]) -> String {
    if expected.is_empty() {
        "something else".to_string()
    } else {
        expected.join(", ")
    }
}

/// A rejected input, located by character offset into the raw text.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[error("at {}: {reason}", .span.start)]
pub struct SyntaxError {
    pub span: Span,
    pub reason: Reason,
}

impl SyntaxError {
    pub fn custom(span: Span, message: impl ToString) -> Self {
        Self {
            span,
            reason: Reason::Custom(message.to_string()),
        }
    }

    pub fn position(&self) -> usize {
        self.span.start
    }

    pub fn expected(&self) -> &[String] {
        match &self.reason {
            Reason::Unexpected { expected, .. } => expected,
            _ => &[],
        }
    }

    pub fn found(&self) -> Option<&str> {
        match &self.reason {
            Reason::Unexpected { found, .. } => found.as_deref(),
            _ => None,
        }
    }
}

impl From<Simple<String, Span>> for SyntaxError {
    fn from(e: Simple<String, Span>) -> Self {
        let reason = match e.reason() {
            SimpleReason::Unexpected => {
                let mut expected = e
                    .expected()
                    .map(|t| t.clone().unwrap_or_else(|| "end of the input".to_string()))
                    .collect::<Vec<_>>();
                expected.sort();
                Reason::Unexpected {
                    expected,
                    found: e.found().cloned(),
                }
            }
            SimpleReason::Unclosed { span, delimiter } => Reason::Unclosed {
                span: span.clone(),
                delimiter: delimiter.clone(),
            },
            SimpleReason::Custom(msg) => Reason::Custom(msg.clone()),
        };
        Self {
            span: e.span(),
            reason,
        }
    }
}

/// The evaluator met an intermediate value whose shape contradicts the case
/// analysis that led to it. Inputs accepted by the parser are not expected to
/// trigger this; it marks an edge of the notation, not a usage mistake.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
#[error("internal inconsistency in {context}: expected a ψ term, found {found}")]
pub struct InternalInconsistency {
    pub context: &'static str,
    pub found: Term,
}

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    #[error("{}", join_errors(.0))]
    Syntax(Vec<SyntaxError>),
    #[error(transparent)]
    Internal(#[from] InternalInconsistency),
}

fn join_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<SyntaxError>> for Error {
    fn from(errors: Vec<SyntaxError>) -> Self {
        Error::Syntax(errors)
    }
}

impl From<SyntaxError> for Error {
    fn from(error: SyntaxError) -> Self {
        Error::Syntax(vec![error])
    }
}
