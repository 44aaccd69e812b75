//! Per-type transformation configuration.
//!
//! A [`TransformableField`] names one field of one entity type that goes
//! through a transformer on its way to and from storage. The list of
//! transformable fields per type is loaded once (the metadata registry itself
//! lives in the host) and handed to the coordinator via
//! [`TransformCoordinator::load_metadata`](crate::coordinator::TransformCoordinator::load_metadata);
//! the coordinator only ever reads it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transformable-field lists keyed by entity type name.
pub type TypeMetadata = HashMap<String, Vec<TransformableField>>;

/// Configuration for one transformable field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformableField {
    /// Field holding the plain in-memory value.
    pub source_field: String,
    /// Field the transformed value is written to. Usually the same as
    /// `source_field`; differs when the storage schema keeps the raw
    /// representation in a separate column.
    pub storage_field: String,
    /// Name of the transformer to apply, resolved against the registry on
    /// first use.
    pub transformer: String,
}

impl TransformableField {
    /// Creates a field configuration that transforms in place
    /// (`storage_field == source_field`).
    pub fn new(source_field: impl Into<String>, transformer: impl Into<String>) -> Self {
        let source_field = source_field.into();
        Self {
            storage_field: source_field.clone(),
            source_field,
            transformer: transformer.into(),
        }
    }

    /// Redirects the transformed value to a different storage field.
    pub fn with_storage_field(mut self, storage_field: impl Into<String>) -> Self {
        self.storage_field = storage_field.into();
        self
    }
}
