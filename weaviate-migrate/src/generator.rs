//! Generation of new ledger entries from a target schema.

use std::path::Path;

use log::{error, info};

use crate::differ::{diff_schemas, MigrationDelta};
use crate::errors::{MigrateError, MigrateResult};
use crate::ledger::{LedgerEntry, MigrationLedger, MigrationRecord};
use crate::schema::Schema;
use crate::store::SchemaStore;

/// Result of a successful [`generate_migration`] call.
#[derive(Debug, Clone)]
pub struct GeneratedMigration {
    pub entry: LedgerEntry,
    pub delta: MigrationDelta,
}

/// Diff `target` against the store's live schema and record the delta as the
/// next ledger entry in `folder`.
///
/// Checks run before any side effect, in this order: the folder must exist,
/// the target must be non-empty and structurally valid, and the live schema
/// must be readable. If any of them fails nothing is written. The store is
/// only read.
pub fn generate_migration<S>(store: &S, folder: &Path, target: &Schema) -> MigrateResult<GeneratedMigration>
where
    S: SchemaStore + ?Sized,
{
    info!("generating schema migration in {}", folder.display());

    let ledger = MigrationLedger::open(folder)?;
    let delta = preview(store, target)?;

    let entry = ledger.write(&MigrationRecord::Delta(delta.clone()))?;
    info!(
        "recorded {} change(s) in {}",
        delta.change_count(),
        entry.file_name
    );

    Ok(GeneratedMigration { entry, delta })
}

/// The delta [`generate_migration`] would record, without touching any ledger.
pub fn preview<S>(store: &S, target: &Schema) -> MigrateResult<MigrationDelta>
where
    S: SchemaStore + ?Sized,
{
    validate_target(target)?;
    let current = fetch_live_schema(store)?;
    Ok(diff_schemas(Some(&current), Some(target)))
}

fn validate_target(target: &Schema) -> MigrateResult<()> {
    if target.is_empty() {
        return Err(MigrateError::validation("target schema has no classes"));
    }

    let issues = target.validate();
    if !issues.is_empty() {
        return Err(MigrateError::Validation { issues });
    }

    Ok(())
}

pub(crate) fn fetch_live_schema<S>(store: &S) -> MigrateResult<Schema>
where
    S: SchemaStore + ?Sized,
{
    store.get_schema().map_err(|err| {
        error!("could not get existing schema: {err}");
        MigrateError::RemoteStore(err)
    })
}
