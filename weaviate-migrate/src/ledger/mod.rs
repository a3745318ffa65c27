//! Versioned on-disk migration ledger.
//!
//! A ledger is a folder of `NNNN_migration.json` files. Each file holds either
//! a [`MigrationDelta`](crate::differ::MigrationDelta) or a full schema
//! snapshot, and files replay in sequence order.

mod folder;
mod record;

pub use folder::{migration_filename, parse_sequence, LedgerEntry, MigrationLedger};
pub use record::MigrationRecord;
