//! Error handling for field transformation.
//!
//! A single error enum covers the whole crate: configuration problems surface
//! as [`TransformError::UnknownTransformer`] at first use, transformer
//! failures propagate unmodified as [`TransformError::Execution`], and host
//! boundary failures as [`TransformError::FieldAccess`].

use crate::transformer::Direction;
use thiserror::Error;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Error type for field transformation operations.
#[derive(Debug, Error, Clone)]
pub enum TransformError {
    /// A configured field references a transformer name that was never
    /// registered. Raised lazily on first lookup, not at configuration load.
    #[error("unknown transformer: {name}")]
    UnknownTransformer { name: String },

    /// A transformer's forward or reverse operation failed. The coordinator
    /// performs no retry and substitutes no fallback value.
    #[error("transformer '{transformer}' failed ({direction}): {message}")]
    Execution {
        transformer: String,
        direction: Direction,
        message: String,
    },

    /// The host session could not get or set a field value.
    #[error("field access failed for '{field}': {message}")]
    FieldAccess { field: String, message: String },
}

impl TransformError {
    /// Creates an unknown-transformer error.
    pub fn unknown_transformer(name: impl Into<String>) -> Self {
        Self::UnknownTransformer { name: name.into() }
    }

    /// Creates an execution error for a failed transformer call.
    pub fn execution(
        transformer: impl Into<String>,
        direction: Direction,
        message: impl Into<String>,
    ) -> Self {
        Self::Execution {
            transformer: transformer.into(),
            direction,
            message: message.into(),
        }
    }

    /// Creates a field-access error.
    pub fn field_access(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldAccess {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::unknown_transformer("aes");
        assert_eq!(err.to_string(), "unknown transformer: aes");

        let err = TransformError::execution("base64", Direction::Reverse, "invalid padding");
        assert_eq!(
            err.to_string(),
            "transformer 'base64' failed (reverse): invalid padding"
        );

        let err = TransformError::field_access("secret", "no such object");
        assert_eq!(
            err.to_string(),
            "field access failed for 'secret': no such object"
        );
    }
}
