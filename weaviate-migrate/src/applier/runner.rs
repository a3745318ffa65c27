//! Idempotent replay of migration records.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};

use super::report::{ActionOutcome, ActionTarget, ApplyReport, SkipReason};
use crate::differ::MigrationDelta;
use crate::errors::{MigrateResult, StoreError};
use crate::generator::fetch_live_schema;
use crate::ledger::{MigrationLedger, MigrationRecord};
use crate::schema::{ClassDefinition, Schema};
use crate::store::SchemaStore;

/// How the applier decides that a property already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyScope {
    /// A property with the same name on any live class counts.
    ///
    /// Classes created by the same record are exempt: they are created bare,
    /// so every one of their properties is created.
    #[default]
    SchemaWide,
    /// Only a property with the same name on the same class counts.
    PerClass,
}

/// Applies migration records to a store.
///
/// Each record is applied against a fresh read of the live schema, so a record
/// the store already reflects creates nothing.
pub struct MigrationApplier<S> {
    store: S,
    dry_run: bool,
    property_scope: PropertyScope,
}

impl<S: SchemaStore> MigrationApplier<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            dry_run: false,
            property_scope: PropertyScope::default(),
        }
    }

    /// Report creates as planned instead of issuing them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_property_scope(mut self, scope: PropertyScope) -> Self {
        self.property_scope = scope;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one record.
    pub fn apply(&self, record: &MigrationRecord) -> MigrateResult<ApplyReport> {
        let started = Instant::now();
        let mut report = ApplyReport::new(Utc::now(), self.dry_run);

        let live = fetch_live_schema(&self.store)?;

        match record {
            MigrationRecord::Snapshot(schema) => self.apply_snapshot(&live, schema, &mut report)?,
            MigrationRecord::Delta(delta) => self.apply_delta(&live, delta, &mut report)?,
        }

        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(report)
    }

    /// Apply every ledger entry in `folder`, in sequence order.
    ///
    /// A missing folder yields an empty result without contacting the store.
    /// The first entry that fails to load or apply stops the run; entries
    /// applied before it stay applied.
    pub fn migrate_all(&self, folder: &Path) -> MigrateResult<Vec<ApplyReport>> {
        self.migrate_all_with(folder, |_| {})
    }

    /// Like [`migrate_all`](Self::migrate_all), calling `on_applied` after each entry.
    pub fn migrate_all_with(
        &self,
        folder: &Path,
        mut on_applied: impl FnMut(&ApplyReport),
    ) -> MigrateResult<Vec<ApplyReport>> {
        if !folder.is_dir() {
            info!("migration folder {} does not exist, nothing to apply", folder.display());
            return Ok(Vec::new());
        }

        let ledger = MigrationLedger::open(folder)?;
        let entries = ledger.entries()?;
        debug!("found {} ledger entries in {}", entries.len(), folder.display());

        let mut reports = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = MigrationLedger::read(&entry.path)?;
            let mut report = self.apply(&record)?;
            report.migration = Some(entry.file_name);

            info!(
                "applied migration {} ({} created, {} planned, {} skipped)",
                report.label(),
                report.created_count(),
                report.planned_count(),
                report.skipped_count()
            );
            on_applied(&report);
            reports.push(report);
        }

        Ok(reports)
    }

    fn apply_snapshot(&self, live: &Schema, schema: &Schema, report: &mut ApplyReport) -> MigrateResult<()> {
        for class in &schema.classes {
            let created_now = !live.contains_class(&class.name);

            if created_now {
                // Properties go through create_property below, so the class is created bare.
                let bare = ClassDefinition {
                    properties: Vec::new(),
                    ..class.clone()
                };
                let outcome = self.create(|store| store.create_class(&bare))?;
                debug!("class {}: {outcome}", class.name);
                report.record(ActionTarget::class(&class.name), outcome);
            } else {
                report.record(
                    ActionTarget::class(&class.name),
                    ActionOutcome::Skipped(SkipReason::ClassExists),
                );
            }

            for property in &class.properties {
                let target = ActionTarget::property(&class.name, &property.name);
                if !created_now && self.property_exists(live, &class.name, &property.name) {
                    report.record(target, ActionOutcome::Skipped(SkipReason::PropertyExists));
                    continue;
                }

                let outcome = self.create(|store| store.create_property(&class.name, property))?;
                debug!("{target}: {outcome}");
                report.record(target, outcome);
            }
        }

        Ok(())
    }

    fn apply_delta(&self, live: &Schema, delta: &MigrationDelta, report: &mut ApplyReport) -> MigrateResult<()> {
        for class_name in &delta.classes_to_add {
            let target = ActionTarget::class(class_name);
            if live.contains_class(class_name) {
                report.record(target, ActionOutcome::Skipped(SkipReason::ClassExists));
                continue;
            }
            let outcome = self.create(|store| store.create_class(&ClassDefinition::new(class_name)))?;
            report.record(target, outcome);
        }

        for (class_name, properties) in &delta.properties_to_add {
            for property in properties {
                let reason = if self.property_exists(live, class_name, property) {
                    SkipReason::PropertyExists
                } else {
                    warn!("cannot create {class_name}.{property}: the delta carries no property definition");
                    SkipReason::NoDefinition
                };
                report.record(
                    ActionTarget::property(class_name, property),
                    ActionOutcome::Skipped(reason),
                );
            }
        }

        for class_name in &delta.classes_to_remove {
            warn!("class {class_name} is marked for removal; removals are not applied");
            report.record(
                ActionTarget::class(class_name),
                ActionOutcome::Skipped(SkipReason::RemovalNotSupported),
            );
        }

        for (class_name, properties) in &delta.properties_to_remove {
            for property in properties {
                warn!("property {class_name}.{property} is marked for removal; removals are not applied");
                report.record(
                    ActionTarget::property(class_name, property),
                    ActionOutcome::Skipped(SkipReason::RemovalNotSupported),
                );
            }
        }

        for (class_name, properties) in &delta.properties_to_change {
            for property in properties {
                report.record(
                    ActionTarget::property(class_name, property),
                    ActionOutcome::Skipped(SkipReason::ChangeNotApplied),
                );
            }
        }

        Ok(())
    }

    fn property_exists(&self, live: &Schema, class_name: &str, property: &str) -> bool {
        match self.property_scope {
            PropertyScope::SchemaWide => live.has_property_anywhere(property),
            PropertyScope::PerClass => live.class_has_property(class_name, property),
        }
    }

    fn create(
        &self,
        call: impl FnOnce(&S) -> Result<(), StoreError>,
    ) -> MigrateResult<ActionOutcome> {
        if self.dry_run {
            return Ok(ActionOutcome::Planned);
        }
        call(&self.store)?;
        Ok(ActionOutcome::Created)
    }
}
