//! Remote schema store access.
//!
//! This module provides:
//! - `SchemaStore` - the three calls the engine makes against a store
//! - `WeaviateStore` - blocking HTTP adapter for the Weaviate REST schema API
//! - `InMemoryStore` - a store that lives in memory and records every call

#[cfg(feature = "http")]
mod http;
mod memory;

#[cfg(feature = "http")]
pub use http::{StoreConfig, WeaviateStore, DEFAULT_TIMEOUT};
pub use memory::{InMemoryStore, StoreCall};

use crate::errors::StoreError;
use crate::schema::{ClassDefinition, PropertyDefinition, Schema};

/// A store that owns a live schema.
///
/// Each method is a single remote call. Implementations report failures as
/// [`StoreError`]; the engine surfaces them without retrying.
pub trait SchemaStore {
    /// Fetch the current schema.
    fn get_schema(&self) -> Result<Schema, StoreError>;

    /// Create a class (and any properties carried in its definition).
    fn create_class(&self, class: &ClassDefinition) -> Result<(), StoreError>;

    /// Add a property to an existing class.
    fn create_property(&self, class_name: &str, property: &PropertyDefinition) -> Result<(), StoreError>;
}

impl<T: SchemaStore + ?Sized> SchemaStore for &T {
    fn get_schema(&self) -> Result<Schema, StoreError> {
        (**self).get_schema()
    }

    fn create_class(&self, class: &ClassDefinition) -> Result<(), StoreError> {
        (**self).create_class(class)
    }

    fn create_property(&self, class_name: &str, property: &PropertyDefinition) -> Result<(), StoreError> {
        (**self).create_property(class_name, property)
    }
}

impl<T: SchemaStore + ?Sized> SchemaStore for Box<T> {
    fn get_schema(&self) -> Result<Schema, StoreError> {
        (**self).get_schema()
    }

    fn create_class(&self, class: &ClassDefinition) -> Result<(), StoreError> {
        (**self).create_class(class)
    }

    fn create_property(&self, class_name: &str, property: &PropertyDefinition) -> Result<(), StoreError> {
        (**self).create_property(class_name, property)
    }
}
