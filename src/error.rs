//! Error types for document parsing and querying.
use thiserror::Error;
use xquery_xpath::XPathError;

/// Errors raised while building a document tree.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The input could not be turned into a tree. `position` is the byte
    /// offset in the input at which the problem was detected.
    #[error("Malformed document at byte {position}: {reason}")]
    MalformedDocument { reason: String, position: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>, position: u64) -> Self {
        ParseError::MalformedDocument {
            reason: reason.into(),
            position,
        }
    }
}

/// Errors raised while compiling or running a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid XPath expression '{expr}': {source}")]
    InvalidExpression {
        expr: String,
        #[source]
        source: XPathError,
    },

    /// The expression compiled, but its operands had types the evaluator
    /// rejects (e.g. `count('a')`).
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

impl QueryError {
    pub(crate) fn invalid(expr: &str, source: XPathError) -> Self {
        QueryError::InvalidExpression {
            expr: expr.to_string(),
            source,
        }
    }
}

impl From<XPathError> for QueryError {
    fn from(e: XPathError) -> Self {
        QueryError::TypeMismatch(e.to_string())
    }
}
