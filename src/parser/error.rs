use thiserror::Error;

use super::span::Span;
use crate::diagnostics::{Category, Diagnostic};

/// Syntax problems, rendered with the canonical message wording
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Syntax error on token \"{found}\", {expected} expected")]
    Expected { found: String, expected: String },

    #[error("Syntax error on token \"{found}\", delete this token")]
    Delete { found: String },

    #[error("Syntax error, insert \"{insert}\" to complete {construct}")]
    Insert { insert: String, construct: String },

    #[error("Syntax error on token \"{found}\", {expected} expected after this token")]
    ExpectedAfter { found: String, expected: String },

    #[error("{message}")]
    Other { message: String },
}

impl ParseError {
    pub fn expected(found: &str, expected: &str) -> Self {
        ParseError::Expected { found: found.to_string(), expected: expected.to_string() }
    }

    pub fn delete(found: &str) -> Self {
        ParseError::Delete { found: found.to_string() }
    }

    pub fn insert(insert: &str, construct: &str) -> Self {
        ParseError::Insert { insert: insert.to_string(), construct: construct.to_string() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        ParseError::Other { message: message.into() }
    }

    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        Diagnostic::error(Category::SyntaxError, self.to_string(), span)
    }
}

/// Token index at which a failed production gave up; the enclosing driver loop
/// resynchronises from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovery {
    pub at: usize,
}

/// Result of a single grammar production
pub type PResult<T> = Result<T, Recovery>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_use_canonical_wording() {
        assert_eq!(
            ParseError::expected("int", "Identifier").to_string(),
            "Syntax error on token \"int\", Identifier expected"
        );
        assert_eq!(ParseError::delete(")").to_string(), "Syntax error on token \")\", delete this token");
        assert_eq!(
            ParseError::insert(";", "BlockStatements").to_string(),
            "Syntax error, insert \";\" to complete BlockStatements"
        );
    }
}
