//! The field-value cache.
//!
//! One entry per (object, field) holds the last-observed transformed and
//! plain representations as a matched pair. Entries are written only by the
//! reverse-transform path and read by every forward-transform attempt; the
//! pairing is what lets the coordinator tell "user changed the plain value"
//! apart from "value was reverse-transformed this cycle and left alone".

use crate::session::ObjectId;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Matched pair of representations for one field of one object.
///
/// Both values come from the same reverse-transform call; they are never
/// updated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Storage representation, as read before reverse transformation.
    pub transformed: Value,
    /// In-memory representation, as produced by the reverse transformation.
    pub plain: Value,
}

/// Cache of [`CacheEntry`] values keyed by (object identity, field name).
///
/// At most one entry per key; the most recent store wins. Growth is bounded
/// by the host calling [`detach`](Self::detach) when objects leave the
/// session, or [`clear`](Self::clear) when the session ends.
#[derive(Debug, Default)]
pub struct FieldValueCache {
    entries: HashMap<(ObjectId, String), CacheEntry>,
}

impl FieldValueCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the entry for one field of one object.
    pub fn get(&self, object: ObjectId, field: &str) -> Option<&CacheEntry> {
        self.entries.get(&(object, field.to_string()))
    }

    /// Stores the matched pair for one field of one object, replacing any
    /// previous entry for that key.
    pub fn store(&mut self, object: ObjectId, field: impl Into<String>, entry: CacheEntry) {
        self.entries.insert((object, field.into()), entry);
    }

    /// Removes every entry belonging to `object`, returning how many were
    /// evicted.
    pub fn detach(&mut self, object: ObjectId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(id, _), _| *id != object);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("evicted {} cache entries for object {}", evicted, object);
        }
        evicted
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached (object, field) pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(transformed: &str, plain: &str) -> CacheEntry {
        CacheEntry {
            transformed: json!(transformed),
            plain: json!(plain),
        }
    }

    #[test]
    fn test_store_and_get() {
        let mut cache = FieldValueCache::new();
        let id = ObjectId::new(1);
        assert!(cache.get(id, "secret").is_none());

        cache.store(id, "secret", entry("ENC(xyz)", "xyz"));
        let found = cache.get(id, "secret").unwrap();
        assert_eq!(found.transformed, json!("ENC(xyz)"));
        assert_eq!(found.plain, json!("xyz"));
    }

    #[test]
    fn test_most_recent_store_wins() {
        let mut cache = FieldValueCache::new();
        let id = ObjectId::new(1);
        cache.store(id, "secret", entry("ENC(old)", "old"));
        cache.store(id, "secret", entry("ENC(new)", "new"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(id, "secret").unwrap().plain, json!("new"));
    }

    #[test]
    fn test_keys_are_per_object_and_field() {
        let mut cache = FieldValueCache::new();
        cache.store(ObjectId::new(1), "secret", entry("a", "1"));
        cache.store(ObjectId::new(1), "token", entry("b", "2"));
        cache.store(ObjectId::new(2), "secret", entry("c", "3"));

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(ObjectId::new(2), "secret").unwrap().plain, json!("3"));
    }

    #[test]
    fn test_detach_removes_only_that_object() {
        let mut cache = FieldValueCache::new();
        cache.store(ObjectId::new(1), "secret", entry("a", "1"));
        cache.store(ObjectId::new(1), "token", entry("b", "2"));
        cache.store(ObjectId::new(2), "secret", entry("c", "3"));

        assert_eq!(cache.detach(ObjectId::new(1)), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(ObjectId::new(1), "secret").is_none());
        assert!(cache.get(ObjectId::new(2), "secret").is_some());

        assert_eq!(cache.detach(ObjectId::new(1)), 0);
    }

    #[test]
    fn test_clear() {
        let mut cache = FieldValueCache::new();
        cache.store(ObjectId::new(1), "secret", entry("a", "1"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
