use thiserror::Error;

/// Caller input errors raised while compiling a lead query.
///
/// `field` is the query parameter that failed, e.g. `score_between`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid range for '{field}': expected two comma-separated values with min <= max, got '{value}'")]
    InvalidRange { field: String, value: String },

    #[error("Invalid number for '{field}': '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Invalid date for '{field}': '{value}'")]
    InvalidDate { field: String, value: String },

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Limit {requested} exceeds the maximum of {max}")]
    LimitExceeded { requested: i64, max: u32 },
}

impl ValidationError {
    /// Stable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidRange { .. } => "INVALID_RANGE",
            ValidationError::InvalidNumber { .. } => "INVALID_NUMBER",
            ValidationError::InvalidDate { .. } => "INVALID_DATE",
            ValidationError::InvalidLimit(_) => "INVALID_LIMIT",
            ValidationError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
        }
    }
}
