//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid attribute path: {0}")]
    InvalidPath(String),
}

impl TfplugError {
    /// True when the error means the attribute is absent or null rather than malformed
    pub fn is_missing(&self) -> bool {
        matches!(self, TfplugError::AttributeNotFound(_))
            || matches!(self, TfplugError::TypeMismatch { actual, .. } if actual == "null")
    }
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;
