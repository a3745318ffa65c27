//! Diff detection between a live schema and a target schema.
//!
//! This module provides functionality to:
//! - Compare class sets by name
//! - Detect added, removed, and shared properties per class
//! - Flatten a delta into display entries

mod changes;

pub use changes::{diff_schemas, ChangeType, DeltaEntry, MigrationDelta};
