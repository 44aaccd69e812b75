//! Boundary contract with the host persistence engine.
//!
//! The coordinator is a pure in-process hook: everything it knows about
//! pending changes, object types, and field values flows through
//! [`PersistenceSession`], implemented by the host. The crate defines the
//! trait; it never implements the persistence side itself (the in-memory
//! session in `testing_utils` exists only for tests).

use crate::error::TransformResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Stable per-object identity issued by the persistence session.
///
/// Opaque surrogate, never derived from field values; field values are
/// exactly what the transform cache compares. Valid for as long as the
/// session tracks the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wraps a session-issued surrogate key.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw surrogate key.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-side persistence session the coordinator operates against.
///
/// Field access must bypass any validation or encapsulation the object's own
/// type would normally apply; the coordinator writes transformed values that
/// would not pass application-level checks.
pub trait PersistenceSession {
    /// Objects scheduled for insertion in the upcoming flush.
    fn pending_inserts(&self) -> Vec<ObjectId>;

    /// Objects scheduled for update in the upcoming flush.
    fn pending_updates(&self) -> Vec<ObjectId>;

    /// Entity type name of a tracked object, `None` when the object is not
    /// tracked by this session.
    fn entity_type(&self, object: ObjectId) -> Option<&str>;

    /// Reads a named field's current value.
    fn get_field(&self, object: ObjectId, field: &str) -> TransformResult<Value>;

    /// Writes a named field's value.
    fn set_field(&mut self, object: ObjectId, field: &str, value: Value) -> TransformResult<()>;

    /// Recomputes the object's pending change-set. Required after the
    /// coordinator mutates fields out-of-band from normal change tracking.
    fn recompute_change_set(&mut self, object: ObjectId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display_and_accessors() {
        let id = ObjectId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(id, ObjectId::new(42));
        assert_ne!(id, ObjectId::new(43));
    }
}
