use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use serde::Serialize;
use std::path::PathBuf;

use weaviate_migrate::{
    generate_migration, ApplyReport, ChangeType, MigrationApplier, MigrationDelta, MigrationLedger,
    MigrationRecord,
};

use super::{connect_store, load_target, TargetArgs};
use crate::context::{ProjectContext, StoreArgs};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Generate Migrations",
        commands: &[
            "weaviate-migrate migrate create --target-schema-file schema.json",
            "weaviate-migrate migrate create --catalog models.toml --model-prefix Test",
        ],
    },
    ExampleGroup {
        title: "Deploy Migrations",
        commands: &[
            "weaviate-migrate migrate deploy                        # Apply every ledger entry",
            "weaviate-migrate migrate deploy --dry-run              # Show what would be created",
            "weaviate-migrate migrate deploy --per-class-properties # Match properties per class",
        ],
    },
    ExampleGroup {
        title: "Inspect the Ledger",
        commands: &["weaviate-migrate migrate list --output json"],
    },
];

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Record the difference between the target and the live schema as a new migration
    #[command(name = "create")]
    Create(CreateArgs),

    /// Apply every migration in the folder, in order
    #[command(name = "deploy")]
    Deploy(DeployArgs),

    /// List migrations in the folder
    #[command(name = "list")]
    List {
        /// Migration folder (defaults to the configured folder)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    target: TargetArgs,

    /// Migration folder (defaults to the configured folder)
    #[arg(long)]
    folder: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Migration folder (defaults to the configured folder)
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Report what would be created without changing the store
    #[arg(long)]
    dry_run: bool,

    /// Treat a property as existing only when the same class has it
    #[arg(long)]
    per_class_properties: bool,
}

pub fn handle_migrate_commands(command: MigrateCommands, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    output.verbose(&ctx.describe());

    match command {
        MigrateCommands::Create(args) => handle_create(&ctx, &args, output),
        MigrateCommands::Deploy(args) => handle_deploy(&ctx, &args, output),
        MigrateCommands::List { folder } => handle_list(&ctx, folder, output),
    }
}

#[derive(Serialize)]
struct CreatedMigration<'a> {
    sequence: u32,
    file_name: &'a str,
    path: &'a std::path::Path,
    changes: usize,
    delta: &'a MigrationDelta,
}

fn handle_create(ctx: &ProjectContext, args: &CreateArgs, output: &OutputManager) -> Result<()> {
    output.heading("Generate Migration");

    let folder = ctx.migrations_dir(args.folder.as_deref());
    output.key_value("Folder", &folder.display().to_string());
    let target = load_target(ctx, &args.target, output)?;
    let store = connect_store(ctx, &args.store, output)?;

    output.progress("Reading live schema");
    let generated = generate_migration(&store, &folder, &target);
    output.clear_line();
    let generated = generated?;

    if output.is_json() {
        let created = CreatedMigration {
            sequence: generated.entry.sequence,
            file_name: &generated.entry.file_name,
            path: &generated.entry.path,
            changes: generated.delta.change_count(),
            delta: &generated.delta,
        };
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    output.success(&format!(
        "Created {} {}",
        ICONS.file,
        generated.entry.path.display()
    ));

    if generated.delta.is_empty() {
        output.info("No additions or removals; the live schema already matches the target");
    } else {
        output.heading("Changes");
        let entries = generated.delta.entries();
        for entry in entries.iter().filter(|e| e.change_type != ChangeType::Modified) {
            output.change(entry);
        }
        let modified = entries.iter().filter(|e| e.change_type == ChangeType::Modified).count();
        if modified > 0 {
            output.bullet(&format!("{modified} property change(s) recorded but never applied"));
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DeploySummary<'a> {
    dry_run: bool,
    migrations: &'a [ApplyReport],
}

impl TableDisplay for DeploySummary<'_> {
    fn to_table(&self, output: &OutputManager) -> comfy_table::Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Migration", "Created", "Planned", "Skipped", "Time"]);
        for report in self.migrations {
            table.add_row(vec![
                Cell::new(report.label()),
                Cell::new(report.created_count()),
                Cell::new(report.planned_count()),
                Cell::new(report.skipped_count()),
                Cell::new(format!("{}ms", report.elapsed_ms)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let created: usize = self.migrations.iter().map(ApplyReport::created_count).sum();
        let planned: usize = self.migrations.iter().map(ApplyReport::planned_count).sum();
        format!(
            "migrations={} created={created} planned={planned}",
            self.migrations.len()
        )
    }
}

fn handle_deploy(ctx: &ProjectContext, args: &DeployArgs, output: &OutputManager) -> Result<()> {
    output.heading("Deploy Migrations");

    let folder = ctx.migrations_dir(args.folder.as_deref());
    if !folder.is_dir() {
        output.warning(&format!("Migration folder {} does not exist", folder.display()));
        return Ok(());
    }

    output.key_value("Folder", &folder.display().to_string());
    let store = connect_store(ctx, &args.store, output)?;
    let applier = MigrationApplier::new(&store)
        .with_dry_run(args.dry_run)
        .with_property_scope(ctx.property_scope(args.per_class_properties));

    if args.dry_run {
        output.warning("DRY RUN MODE - No changes will be made");
    }

    let reports = applier.migrate_all_with(&folder, |report| {
        output.heading(&format!("Applying: {}", report.label()));
        for action in &report.actions {
            output.action(action);
        }
    })?;

    if reports.is_empty() {
        output.warning("No migrations found");
        return Ok(());
    }

    let summary = DeploySummary {
        dry_run: args.dry_run,
        migrations: &reports,
    };
    if !output.is_json() {
        output.heading("Summary");
    }
    output.display(&summary)?;

    let created: usize = reports.iter().map(ApplyReport::created_count).sum();
    if args.dry_run {
        let planned: usize = reports.iter().map(ApplyReport::planned_count).sum();
        output.info(&format!("{planned} create(s) planned across {} migration(s)", reports.len()));
    } else if created == 0 {
        output.success("Store already up to date");
    } else {
        output.success(&format!("Applied {} migration(s), {created} create(s)", reports.len()));
    }

    Ok(())
}

#[derive(Serialize)]
struct LedgerListing {
    folder: PathBuf,
    entries: Vec<ListedEntry>,
}

#[derive(Serialize)]
struct ListedEntry {
    sequence: u32,
    file_name: String,
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<usize>,
}

impl TableDisplay for LedgerListing {
    fn to_table(&self, output: &OutputManager) -> comfy_table::Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["#", "File", "Shape", "Changes"]);
        for entry in &self.entries {
            table.add_row(vec![
                Cell::new(entry.sequence),
                Cell::new(&entry.file_name),
                Cell::new(&entry.kind),
                Cell::new(entry.changes.map_or_else(|| "-".to_string(), |c| c.to_string())),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}:{}", e.file_name, e.kind))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn handle_list(ctx: &ProjectContext, folder: Option<PathBuf>, output: &OutputManager) -> Result<()> {
    let folder = ctx.migrations_dir(folder.as_deref());
    let ledger = MigrationLedger::open(&folder)?;

    let entries = ledger
        .entries()?
        .into_iter()
        .map(|entry| {
            let (kind, changes) = match MigrationLedger::read(&entry.path) {
                Ok(MigrationRecord::Delta(delta)) => ("delta".to_string(), Some(delta.change_count())),
                Ok(record @ MigrationRecord::Snapshot(_)) => (record.kind().to_string(), None),
                Err(err) => {
                    output.verbose(&err.to_string());
                    ("unreadable".to_string(), None)
                }
            };
            ListedEntry {
                sequence: entry.sequence,
                file_name: entry.file_name,
                kind,
                changes,
            }
        })
        .collect::<Vec<_>>();

    if entries.is_empty() && !output.is_json() {
        output.info(&format!("No migrations in {}", folder.display()));
        return Ok(());
    }

    output.display(&LedgerListing { folder, entries })
}
