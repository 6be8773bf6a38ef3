use crate::error::TideError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidQuery {
        reason: String,
    },
    /// The request combined options the server does not support together.
    /// User-facing, never a process abort.
    InvalidOptions {
        reason: String,
    },
    UnknownCollation {
        locale: String,
    },
    DepthExceeded {
        depth: usize,
        max: usize,
    },
    UnsupportedOperator {
        operator: &'static str,
        reason: String,
    },
    InternalError(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidQuery { reason } => write!(f, "invalid query: {reason}"),
            QueryError::InvalidOptions { reason } => write!(f, "invalid options: {reason}"),
            QueryError::UnknownCollation { locale } => {
                write!(f, "unknown collation locale '{locale}'")
            }
            QueryError::DepthExceeded { depth, max } => write!(
                f,
                "expression depth {depth} exceeds maximum allowed depth of {max}"
            ),
            QueryError::UnsupportedOperator { operator, reason } => {
                write!(f, "unsupported operator '{operator}': {reason}")
            }
            QueryError::InternalError(msg) => write!(f, "internal query error: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<TideError> for QueryError {
    fn from(value: TideError) -> Self {
        match value {
            TideError::Validation(reason) => QueryError::InvalidQuery { reason },
            TideError::InvalidOptions(reason) => QueryError::InvalidOptions { reason },
            TideError::UnknownCollation { locale } => QueryError::UnknownCollation { locale },
            TideError::DepthExceeded { depth, max } => QueryError::DepthExceeded { depth, max },
            TideError::UnsupportedOperator { operator, reason } => {
                QueryError::UnsupportedOperator { operator, reason }
            }
            TideError::Internal(msg) => QueryError::InternalError(msg),
        }
    }
}
