use protoscope_core::{Cancelled, QueryError};
use thiserror::Error;

/// Failures inside the lookup engine. Everything except cancellation is
/// contained at the public entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("malformed attribute `{attribute}` on @{annotation}")]
    MalformedAttribute { annotation: String, attribute: String },

    #[error("declaration `{0}` could not be found")]
    MissingDeclaration(String),

    #[error("failed to read template manifest from {archive}: {message}")]
    Manifest { archive: String, message: String },
}

impl From<Cancelled> for LookupError {
    fn from(_: Cancelled) -> Self {
        LookupError::Query(QueryError::Cancelled)
    }
}

impl LookupError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LookupError::Query(err) if err.is_cancelled())
    }
}

pub type LookupResult<T> = Result<T, LookupError>;
