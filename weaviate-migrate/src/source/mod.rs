//! Providers of the target schema a migration is generated against.

mod catalog;
mod field_types;
mod file;

pub use catalog::{CatalogConfig, CatalogField, CatalogModel, CrossReference, ModelCatalog};
pub use field_types::{relation_cardinality, store_type_for_field, FALLBACK_TYPE};
pub use file::SchemaFile;

use crate::errors::MigrateResult;
use crate::schema::Schema;

/// Something that can describe the schema the store should end up with.
pub trait SchemaSource {
    /// Target schema restricted to classes whose name starts with `prefix`.
    /// An empty prefix selects every class.
    fn provide_target_schema(&self, prefix: &str) -> MigrateResult<Schema>;
}
