//! Error types for the pull policy filter
//!
//! Every variant is fatal to the batch being filtered; nothing is retried.

use pullpolicy_tree::{Location, Shape, TreeError};

/// Filter error
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Node shape differs from what resolution or the policy requires
    #[error("type mismatch at {location}: expected {expected}, found {actual}")]
    TypeMismatch {
        location: Location,
        expected: Shape,
        actual: Shape,
    },

    /// Container entry without its identifying field
    #[error("missing field '{field}' at {location}")]
    MissingField { location: Location, field: String },

    /// Field path that cannot be parsed
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// Invalid transformer configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Document tree error other than a shape mismatch
    #[error("document error: {0}")]
    Tree(TreeError),
}

impl FilterError {
    /// Create malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create missing field error
    pub fn missing_field(location: Location, field: impl Into<String>) -> Self {
        Self::MissingField {
            location,
            field: field.into(),
        }
    }
}

impl From<TreeError> for FilterError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::TypeMismatch {
                location,
                expected,
                actual,
            } => Self::TypeMismatch {
                location,
                expected,
                actual,
            },
            other => Self::Tree(other),
        }
    }
}

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
