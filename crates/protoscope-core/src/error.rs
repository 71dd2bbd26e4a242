use thiserror::Error;

/// Failure modes of a query against the host's program model.
///
/// Only [`QueryError::Cancelled`] may cross a public entry point; the other
/// variants are contained and turned into "no answer yet".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("the program index is not ready")]
    IndexNotReady,

    #[error("the query was cancelled")]
    Cancelled,

    #[error("unable to resolve {what}")]
    Unresolved { what: String },
}

impl QueryError {
    pub fn unresolved(what: impl Into<String>) -> Self {
        QueryError::Unresolved { what: what.into() }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, QueryError::Cancelled)
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Marker returned by public entry points when the host cancelled the request.
///
/// The host is expected to reschedule the request; it must never be swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request cancelled")]
pub struct Cancelled;

impl From<Cancelled> for QueryError {
    fn from(_: Cancelled) -> Self {
        QueryError::Cancelled
    }
}
