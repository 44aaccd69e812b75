//! # Transform Coordinator
//!
//! The coordinator receives lifecycle notifications from the host persistence
//! engine and applies the correct directional transform per configured field:
//!
//! 1. Host fires [`on_before_flush`](TransformCoordinator::on_before_flush) -
//!    changed fields are forward-transformed (plain to transformed), with the
//!    cache short-circuiting fields whose plain value is unchanged since the
//!    last reverse transform.
//! 2. Host writes the transformed representation to storage.
//! 3. Host fires [`on_after_insert`](TransformCoordinator::on_after_insert) /
//!    [`on_after_update`](TransformCoordinator::on_after_update) /
//!    [`on_after_load`](TransformCoordinator::on_after_load) - the field is
//!    reverse-transformed back to its plain value and the cache entry is
//!    refreshed.
//!
//! The equality check against the cached plain value is the crux of
//! correctness: without it a value that was reverse-transformed on load and
//! never touched afterwards would be forward-transformed again on every
//! flush, double-encoding it.
//!
//! One coordinator serves one persistence session on one logical thread;
//! there is no interior locking.

pub mod cache;

use crate::error::TransformResult;
use crate::metadata::{TransformableField, TypeMetadata};
use crate::session::{ObjectId, PersistenceSession};
use crate::transformer::TransformerRegistry;
use log::{debug, info};

pub use cache::{CacheEntry, FieldValueCache};

/// Applies field transformers at persistence lifecycle points and owns the
/// field-value cache.
pub struct TransformCoordinator {
    registry: TransformerRegistry,
    metadata: TypeMetadata,
    cache: FieldValueCache,
}

impl TransformCoordinator {
    /// Creates a coordinator with no configured types.
    pub fn new(registry: TransformerRegistry) -> Self {
        Self {
            registry,
            metadata: TypeMetadata::new(),
            cache: FieldValueCache::new(),
        }
    }

    /// Configuration pass: adds transformable-field lists per entity type.
    ///
    /// May be called more than once; later calls add further types, and the
    /// most recent list wins per type name. Transformer names are resolved
    /// lazily on first field access, not here.
    pub fn load_metadata(&mut self, types: TypeMetadata) {
        info!("loaded transform metadata for {} type(s)", types.len());
        self.metadata.extend(types);
    }

    /// Registered transformers.
    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// Forward-transforms every configured field of every object pending
    /// insertion or update, then signals change-set recomputation per object.
    ///
    /// Takes `&self`: the forward path never writes cache entries.
    ///
    /// # Errors
    ///
    /// The first transformer or field-access failure aborts the pass and
    /// propagates. Fields already processed keep their transformed values;
    /// there is no cross-field atomicity.
    pub fn on_before_flush(&self, session: &mut dyn PersistenceSession) -> TransformResult<()> {
        for object in session.pending_inserts() {
            self.forward_object(session, object)?;
        }
        for object in session.pending_updates() {
            self.forward_object(session, object)?;
        }
        Ok(())
    }

    /// Reverse-transforms one object's configured fields after it was loaded
    /// from storage, refreshing the cache entries.
    pub fn on_after_load(
        &mut self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
    ) -> TransformResult<()> {
        self.reverse_object(session, object)
    }

    /// Reverse-transforms one object's configured fields after its insert
    /// committed, restoring the plain in-memory values.
    pub fn on_after_insert(
        &mut self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
    ) -> TransformResult<()> {
        self.reverse_object(session, object)
    }

    /// Reverse-transforms one object's configured fields after its update
    /// committed, restoring the plain in-memory values.
    pub fn on_after_update(
        &mut self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
    ) -> TransformResult<()> {
        self.reverse_object(session, object)
    }

    /// Evicts all cache entries for an object. Hosts call this when an object
    /// is detached from the session; nothing evicts implicitly.
    pub fn detach(&mut self, object: ObjectId) {
        self.cache.detach(object);
    }

    /// Drops every cache entry, e.g. when the session is cleared.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Read-only view of the cache entry for one field of one object.
    pub fn cached(&self, object: ObjectId, field: &str) -> Option<&CacheEntry> {
        self.cache.get(object, field)
    }

    /// Number of live cache entries.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    fn fields_for(
        &self,
        session: &dyn PersistenceSession,
        object: ObjectId,
    ) -> Option<&[TransformableField]> {
        let entity_type = session.entity_type(object)?;
        self.metadata.get(entity_type).map(Vec::as_slice)
    }

    fn forward_object(
        &self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
    ) -> TransformResult<()> {
        let fields = match self.fields_for(session, object) {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Ok(()),
        };
        for field in fields {
            self.forward_field(session, object, field)?;
        }
        // Fields were mutated out-of-band, the pending change-set is stale.
        session.recompute_change_set(object);
        Ok(())
    }

    fn forward_field(
        &self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
        field: &TransformableField,
    ) -> TransformResult<()> {
        let current = session.get_field(object, &field.source_field)?;

        if let Some(entry) = self.cache.get(object, &field.source_field) {
            if entry.plain == current {
                debug!(
                    "{}.{} unchanged since reverse transform, reusing cached value",
                    object, field.source_field
                );
                session.set_field(object, &field.storage_field, entry.transformed.clone())?;
                return Ok(());
            }
        }

        let transformer = self.registry.get(&field.transformer)?;
        let transformed = transformer.transform(&current)?;
        debug!(
            "forward transformed {}.{} via '{}'",
            object, field.source_field, field.transformer
        );
        session.set_field(object, &field.storage_field, transformed)?;
        Ok(())
    }

    fn reverse_object(
        &mut self,
        session: &mut dyn PersistenceSession,
        object: ObjectId,
    ) -> TransformResult<()> {
        let entity_type = match session.entity_type(object) {
            Some(name) => name.to_string(),
            None => return Ok(()),
        };
        let fields = match self.metadata.get(&entity_type) {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Ok(()),
        };

        for field in fields {
            let raw = session.get_field(object, &field.storage_field)?;
            let transformer = self.registry.get(&field.transformer)?;
            let plain = transformer.reverse_transform(&raw)?;
            session.set_field(object, &field.source_field, plain.clone())?;
            debug!(
                "reverse transformed {}.{} via '{}'",
                object, field.source_field, field.transformer
            );
            self.cache.store(
                object,
                field.source_field.clone(),
                CacheEntry {
                    transformed: raw,
                    plain,
                },
            );
        }
        session.recompute_change_set(object);
        Ok(())
    }
}
