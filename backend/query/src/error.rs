use thiserror::Error;

/// Everything that can go wrong between raw request parameters and a finished filter.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter {name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid {name}: {reason}")]
    InvalidRange {
        name: &'static str,
        reason: &'static str,
    },

    #[error("Invalid polygon: {0}")]
    InvalidShape(&'static str),

    #[error("Invalid polygon: the first and last coordinates of a ring must be identical")]
    UnclosedRing,

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0} data is incomplete")]
    IncompleteData(&'static str),

    #[error("Store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// True for failures caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::IncompleteData(_) | Self::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
