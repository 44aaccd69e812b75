//! # fieldcodec
//!
//! Bidirectional, field-level value transformation for persisted objects,
//! hooked into the host persistence engine's lifecycle: callers keep a plain
//! in-memory representation of a field while a transformed representation
//! (encrypted ciphertext, a serialized string) is what reaches storage, and
//! vice versa on load, without invoking encode/decode at every call site.
//!
//! ## Key Components
//!
//! * [`TransformCoordinator`] - applies the correct directional transform at
//!   each lifecycle point and owns the field-value cache
//! * [`TransformerRegistry`] - name-to-transformer lookup
//! * [`Transformer`] - the pure, bidirectional conversion contract
//! * [`PersistenceSession`] - boundary trait implemented by the host engine
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fieldcodec::{
//!     TransformCoordinator, TransformableField, TransformerRegistry, TypeMetadata,
//! };
//!
//! let registry = TransformerRegistry::with_codecs();
//! let mut coordinator = TransformCoordinator::new(registry);
//! coordinator.load_metadata(TypeMetadata::from([(
//!     "Account".to_string(),
//!     vec![TransformableField::new("profile", "json")],
//! )]));
//!
//! // The host persistence engine then calls coordinator.on_before_flush(...)
//! // before writing and coordinator.on_after_load(...) after reading.
//! ```

pub mod coordinator;
pub mod error;
pub mod metadata;
pub mod session;
pub mod transformer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing_utils;

pub use coordinator::{CacheEntry, FieldValueCache, TransformCoordinator};
pub use error::{TransformError, TransformResult};
pub use metadata::{TransformableField, TypeMetadata};
pub use session::{ObjectId, PersistenceSession};
pub use transformer::{
    AesGcmCodec, Base64Codec, Direction, JsonStringCodec, Transformer, TransformerRegistry,
};
