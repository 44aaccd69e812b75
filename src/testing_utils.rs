//! Test utilities shared by the crate's own tests and, behind the
//! `test-utils` feature, by host test suites.
//!
//! Provides an in-memory [`PersistenceSession`] so the coordinator can be
//! exercised without a real persistence engine, plus transformer helpers for
//! asserting on call counts and envelope shapes.

use crate::error::{TransformError, TransformResult};
use crate::session::{ObjectId, PersistenceSession};
use crate::transformer::{Direction, Transformer};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct StoredObject {
    entity_type: String,
    fields: HashMap<String, Value>,
}

/// In-memory persistence session tracking objects, pending changes, and
/// change-set recomputation signals.
#[derive(Default)]
pub struct MemorySession {
    objects: HashMap<ObjectId, StoredObject>,
    pending_inserts: Vec<ObjectId>,
    pending_updates: Vec<ObjectId>,
    recompute_log: Vec<ObjectId>,
    next_id: u64,
}

impl MemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tracked object and returns its session-issued identity.
    pub fn add_object(&mut self, entity_type: &str, fields: Vec<(&str, Value)>) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            StoredObject {
                entity_type: entity_type.to_string(),
                fields: fields
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
            },
        );
        id
    }

    /// Schedules an object for insertion in the next flush.
    pub fn schedule_insert(&mut self, object: ObjectId) {
        self.pending_inserts.push(object);
    }

    /// Schedules an object for update in the next flush.
    pub fn schedule_update(&mut self, object: ObjectId) {
        self.pending_updates.push(object);
    }

    /// Clears the pending insert and update lists, as a flush commit would.
    pub fn clear_pending(&mut self) {
        self.pending_inserts.clear();
        self.pending_updates.clear();
    }

    /// Current value of a field.
    ///
    /// # Panics
    ///
    /// Panics when the object or field does not exist; test convenience only.
    pub fn field(&self, object: ObjectId, name: &str) -> Value {
        self.objects[&object].fields[name].clone()
    }

    /// Objects for which change-set recomputation was signalled, in order.
    pub fn recompute_log(&self) -> &[ObjectId] {
        &self.recompute_log
    }
}

impl PersistenceSession for MemorySession {
    fn pending_inserts(&self) -> Vec<ObjectId> {
        self.pending_inserts.clone()
    }

    fn pending_updates(&self) -> Vec<ObjectId> {
        self.pending_updates.clone()
    }

    fn entity_type(&self, object: ObjectId) -> Option<&str> {
        self.objects.get(&object).map(|o| o.entity_type.as_str())
    }

    fn get_field(&self, object: ObjectId, field: &str) -> TransformResult<Value> {
        self.objects
            .get(&object)
            .and_then(|o| o.fields.get(field))
            .cloned()
            .ok_or_else(|| {
                TransformError::field_access(field, format!("no such field on object {object}"))
            })
    }

    fn set_field(&mut self, object: ObjectId, field: &str, value: Value) -> TransformResult<()> {
        let stored = self.objects.get_mut(&object).ok_or_else(|| {
            TransformError::field_access(field, format!("object {object} is not tracked"))
        })?;
        stored.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn recompute_change_set(&mut self, object: ObjectId) {
        self.recompute_log.push(object);
    }
}

/// Reversible marker codec wrapping strings as `TAG(value)`.
///
/// Reverse transformation fails on values missing the envelope, which makes
/// malformed-ciphertext behavior easy to provoke in tests.
pub struct TagCodec {
    tag: String,
}

impl TagCodec {
    /// Creates a codec using `tag` as the envelope marker.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    fn expect_string<'a>(&self, value: &'a Value, direction: Direction) -> TransformResult<&'a str> {
        value.as_str().ok_or_else(|| {
            TransformError::execution(self.tag.as_str(), direction, "expected string value")
        })
    }
}

impl Transformer for TagCodec {
    fn transform(&self, plain: &Value) -> TransformResult<Value> {
        let text = self.expect_string(plain, Direction::Forward)?;
        Ok(Value::String(format!("{}({})", self.tag, text)))
    }

    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value> {
        let text = self.expect_string(transformed, Direction::Reverse)?;
        text.strip_prefix(&format!("{}(", self.tag))
            .and_then(|rest| rest.strip_suffix(')'))
            .map(|inner| Value::String(inner.to_string()))
            .ok_or_else(|| {
                TransformError::execution(
                    self.tag.as_str(),
                    Direction::Reverse,
                    format!("value lacks the {}(...) envelope", self.tag),
                )
            })
    }
}

/// Delegating transformer that counts forward and reverse invocations.
pub struct CountingCodec {
    inner: Arc<dyn Transformer>,
    forward_calls: AtomicUsize,
    reverse_calls: AtomicUsize,
}

impl CountingCodec {
    /// Wraps an inner transformer.
    pub fn new(inner: Arc<dyn Transformer>) -> Self {
        Self {
            inner,
            forward_calls: AtomicUsize::new(0),
            reverse_calls: AtomicUsize::new(0),
        }
    }

    /// Number of forward invocations so far.
    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    /// Number of reverse invocations so far.
    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }
}

impl Transformer for CountingCodec {
    fn transform(&self, plain: &Value) -> TransformResult<Value> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.transform(plain)
    }

    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.reverse_transform(transformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_codec_round_trip_and_envelope_check() {
        let codec = TagCodec::new("ENC");
        let transformed = codec.transform(&json!("xyz")).unwrap();
        assert_eq!(transformed, json!("ENC(xyz)"));
        assert_eq!(codec.reverse_transform(&transformed).unwrap(), json!("xyz"));

        assert!(codec.reverse_transform(&json!("plain")).is_err());
        assert!(codec.transform(&json!(1)).is_err());
    }

    #[test]
    fn test_counting_codec_counts_per_direction() {
        let codec = CountingCodec::new(Arc::new(TagCodec::new("ENC")));
        codec.transform(&json!("a")).unwrap();
        codec.transform(&json!("b")).unwrap();
        codec.reverse_transform(&json!("ENC(a)")).unwrap();

        assert_eq!(codec.forward_calls(), 2);
        assert_eq!(codec.reverse_calls(), 1);
    }

    #[test]
    fn test_memory_session_field_access_errors() {
        let mut session = MemorySession::new();
        let id = session.add_object("Account", vec![("secret", json!("s"))]);

        assert!(session.get_field(id, "missing").is_err());
        assert!(session.get_field(ObjectId::new(99), "secret").is_err());
        assert!(session
            .set_field(ObjectId::new(99), "secret", json!("v"))
            .is_err());

        session.set_field(id, "extra", json!("new-column")).unwrap();
        assert_eq!(session.field(id, "extra"), json!("new-column"));
    }
}
