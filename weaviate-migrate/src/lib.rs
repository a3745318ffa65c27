//! Schema migrations for Weaviate-style class stores.
//!
//! The crate compares a declared target schema with the live schema of a
//! store, records the difference as a numbered migration file, and later
//! replays those files so that every missing class and property gets created.
//!
//! ```no_run
//! use std::path::Path;
//! use weaviate_migrate::{generate_migration, InMemoryStore, MigrationApplier, SchemaFile, SchemaSource};
//!
//! # fn main() -> weaviate_migrate::MigrateResult<()> {
//! let store = InMemoryStore::new();
//! let target = SchemaFile::new("schema.json").provide_target_schema("")?;
//!
//! generate_migration(&store, Path::new("migrations"), &target)?;
//! let reports = MigrationApplier::new(&store).migrate_all(Path::new("migrations"))?;
//! # let _ = reports;
//! # Ok(())
//! # }
//! ```

pub mod applier;
pub mod differ;
pub mod errors;
pub mod generator;
pub mod ledger;
pub mod schema;
pub mod source;
pub mod store;

pub use applier::{ActionOutcome, ActionTarget, ApplyAction, ApplyReport, MigrationApplier, PropertyScope, SkipReason};
pub use differ::{diff_schemas, ChangeType, DeltaEntry, MigrationDelta};
pub use errors::{MigrateError, MigrateResult, StoreError};
pub use generator::{generate_migration, preview, GeneratedMigration};
pub use ledger::{migration_filename, LedgerEntry, MigrationLedger, MigrationRecord};
pub use schema::{Cardinality, ClassDefinition, PropertyDefinition, Schema, CROSS_REFERENCE_TYPE};
pub use source::{CatalogConfig, ModelCatalog, SchemaFile, SchemaSource};
#[cfg(feature = "http")]
pub use store::{StoreConfig, WeaviateStore};
pub use store::{InMemoryStore, SchemaStore, StoreCall};
