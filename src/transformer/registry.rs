//! Name-to-transformer lookup.
//!
//! The registry is populated during startup and read-mostly afterwards, so a
//! plain `HashMap` owned by the registry suffices; one registry serves one
//! coordinator and its persistence session.

use super::codecs::{Base64Codec, JsonStringCodec};
use super::Transformer;
use crate::error::{TransformError, TransformResult};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Codecs available without any explicit registration.
static BUILTIN_CODECS: Lazy<Vec<(&'static str, Arc<dyn Transformer>)>> = Lazy::new(|| {
    vec![
        ("base64", Arc::new(Base64Codec) as Arc<dyn Transformer>),
        ("json", Arc::new(JsonStringCodec) as Arc<dyn Transformer>),
    ]
});

/// Maps transformer names to transformer instances.
#[derive(Default)]
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the built-in sample codecs
    /// (`base64` and `json`).
    pub fn with_codecs() -> Self {
        let mut registry = Self::new();
        for (name, codec) in BUILTIN_CODECS.iter() {
            registry.register(*name, Arc::clone(codec));
        }
        registry
    }

    /// Registers a transformer under `name`. Re-registering a name replaces
    /// the previous instance; the most recent registration wins.
    pub fn register(&mut self, name: impl Into<String>, transformer: Arc<dyn Transformer>) {
        let name = name.into();
        debug!("registered transformer '{}'", name);
        self.transformers.insert(name, transformer);
    }

    /// Looks up a transformer by name.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnknownTransformer`] when no transformer was
    /// registered under `name`.
    pub fn get(&self, name: &str) -> TransformResult<Arc<dyn Transformer>> {
        self.transformers
            .get(name)
            .cloned()
            .ok_or_else(|| TransformError::unknown_transformer(name))
    }

    /// Returns whether a transformer is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Returns the registered transformer names, in no particular order.
    pub fn names(&self) -> Vec<&str> {
        self.transformers.keys().map(String::as_str).collect()
    }
}
