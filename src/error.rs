use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TideErrorCode {
    Validation,
    InvalidOptions,
    UnknownCollation,
    DepthExceeded,
    UnsupportedOperator,
    Internal,
}

impl TideErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            TideErrorCode::Validation => "validation",
            TideErrorCode::InvalidOptions => "invalid_options",
            TideErrorCode::UnknownCollation => "unknown_collation",
            TideErrorCode::DepthExceeded => "depth_exceeded",
            TideErrorCode::UnsupportedOperator => "unsupported_operator",
            TideErrorCode::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum TideError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("unknown collation locale '{locale}'")]
    UnknownCollation { locale: String },
    #[error("expression depth {depth} exceeds maximum allowed depth of {max}")]
    DepthExceeded { depth: usize, max: usize },
    #[error("unsupported operator '{operator}': {reason}")]
    UnsupportedOperator { operator: &'static str, reason: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl TideError {
    pub fn code(&self) -> TideErrorCode {
        match self {
            TideError::Validation(_) => TideErrorCode::Validation,
            TideError::InvalidOptions(_) => TideErrorCode::InvalidOptions,
            TideError::UnknownCollation { .. } => TideErrorCode::UnknownCollation,
            TideError::DepthExceeded { .. } => TideErrorCode::DepthExceeded,
            TideError::UnsupportedOperator { .. } => TideErrorCode::UnsupportedOperator,
            TideError::Internal(_) => TideErrorCode::Internal,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::{TideError, TideErrorCode};

    #[test]
    fn error_code_strings_are_stable() {
        assert_eq!(TideErrorCode::InvalidOptions.as_str(), "invalid_options");
        assert_eq!(TideErrorCode::DepthExceeded.as_str(), "depth_exceeded");
        assert_eq!(
            TideErrorCode::UnknownCollation.as_str(),
            "unknown_collation"
        );
    }

    #[test]
    fn error_code_matches_variant_mapping() {
        let err = TideError::UnknownCollation {
            locale: "xx_YY".into(),
        };
        assert_eq!(err.code(), TideErrorCode::UnknownCollation);
        assert_eq!(err.code_str(), "unknown_collation");
        assert_eq!(err.to_string(), "unknown collation locale 'xx_YY'");
    }
}
