//! Error types for document trees

use crate::document::Location;
use crate::node::Shape;

/// Errors raised while building, reading or mutating a document
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Node does not have the shape the operation requires
    #[error("type mismatch at {location}: expected {expected}, found {actual}")]
    TypeMismatch {
        location: Location,
        expected: Shape,
        actual: Shape,
    },

    /// Mapping key that is not a plain scalar
    #[error("unsupported mapping key {key}: only scalar keys are addressable")]
    UnsupportedKey { key: String },

    /// Tag applied directly to another tagged value
    #[error("unsupported nested tag {tag}")]
    UnsupportedTag { tag: String },

    /// Field appended to a mapping that already has it
    #[error("field '{field}' already exists at {location}")]
    DuplicateField { location: Location, field: String },

    /// Malformed YAML text
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
