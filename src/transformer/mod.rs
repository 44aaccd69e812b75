//! # Transformer System
//!
//! A transformer is a named, stateless, bidirectional conversion between the
//! "plain" in-memory representation of a field value and the "transformed"
//! representation that reaches storage.
//!
//! ## Components
//!
//! * [`Transformer`] - the two-way conversion contract
//! * [`Direction`] - tagged selector for the two operations
//! * [`TransformerRegistry`] - name-to-instance lookup table
//! * `codecs` - sample codec implementations (base64, JSON string, AES-GCM)
//!
//! ## Contract
//!
//! Every transformer must be a pure function of its single input: for any
//! value `v`, `reverse_transform(transform(v)) == v`, and repeated calls with
//! the same input produce the same output. The coordinator's cache logic is
//! only sound under this contract.

pub mod codecs;
pub mod registry;

use crate::error::TransformResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub use codecs::{AesGcmCodec, Base64Codec, JsonStringCodec};
pub use registry::TransformerRegistry;

/// Direction of a transform operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Plain to transformed, applied before a write is flushed.
    Forward,
    /// Transformed to plain, applied after a load or a committed write.
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// Bidirectional conversion between plain and transformed field values.
pub trait Transformer: Send + Sync {
    /// Converts a plain in-memory value into its storage representation.
    fn transform(&self, plain: &Value) -> TransformResult<Value>;

    /// Converts a storage representation back into the plain value.
    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value>;

    /// Dispatches to [`transform`](Self::transform) or
    /// [`reverse_transform`](Self::reverse_transform) by direction tag.
    fn apply(&self, direction: Direction, value: &Value) -> TransformResult<Value> {
        match direction {
            Direction::Forward => self.transform(value),
            Direction::Reverse => self.reverse_transform(value),
        }
    }
}

impl fmt::Debug for dyn Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transformer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Forward.to_string(), "forward");
        assert_eq!(Direction::Reverse.to_string(), "reverse");
    }

    #[test]
    fn test_apply_dispatches_by_direction() {
        let codec = Base64Codec;
        let plain = Value::String("hello".to_string());

        let transformed = codec.apply(Direction::Forward, &plain).unwrap();
        assert_ne!(transformed, plain);
        assert_eq!(codec.apply(Direction::Reverse, &transformed).unwrap(), plain);
    }
}
