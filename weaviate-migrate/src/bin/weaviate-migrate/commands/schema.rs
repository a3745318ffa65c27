use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Table};
use serde::Serialize;

use weaviate_migrate::{preview, ChangeType, MigrateError, MigrationDelta, Schema, SchemaStore};

use super::{connect_store, load_target, TargetArgs};
use crate::context::{ProjectContext, StoreArgs};
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Live Schema",
        commands: &[
            "weaviate-migrate schema show                  # Every class in the store",
            "weaviate-migrate schema show --class Article  # One class with its properties",
            "weaviate-migrate schema show --output json    # Raw schema document",
        ],
    },
    ExampleGroup {
        title: "Pending Changes",
        commands: &[
            "weaviate-migrate schema diff --target-schema-file schema.json",
            "weaviate-migrate schema diff --catalog models.toml --model-prefix Test",
        ],
    },
];

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the live schema of the store
    #[command(name = "show")]
    Show {
        #[command(flatten)]
        store: StoreArgs,

        /// Only show this class
        #[arg(long)]
        class: Option<String>,
    },

    /// Show the changes the next `migrate create` would record
    #[command(name = "diff")]
    Diff {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        target: TargetArgs,

        /// Also list properties present on both sides
        #[arg(long)]
        all: bool,
    },
}

pub fn handle_schema_commands(command: SchemaCommands, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    output.verbose(&ctx.describe());

    match command {
        SchemaCommands::Show { store, class } => handle_show(&ctx, &store, class.as_deref(), output),
        SchemaCommands::Diff { store, target, all } => handle_diff(&ctx, &store, &target, all, output),
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct SchemaView(Schema);

impl TableDisplay for SchemaView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Class", "Property", "Type", "Reference"]);

        for class in &self.0.classes {
            if class.properties.is_empty() {
                table.add_row(vec![Cell::new(&class.name), Cell::new("-"), Cell::new(""), Cell::new("")]);
                continue;
            }
            for (index, property) in class.properties.iter().enumerate() {
                let class_cell = if index == 0 { class.name.as_str() } else { "" };
                let reference = match (&property.ref_class, property.cardinality) {
                    (Some(target), Some(cardinality)) => format!("{target} ({cardinality})"),
                    (Some(target), None) => target.clone(),
                    _ => String::new(),
                };
                table.add_row(vec![
                    Cell::new(class_cell),
                    Cell::new(&property.name),
                    Cell::new(property.type_label()),
                    Cell::new(reference),
                ]);
            }
        }

        table
    }

    fn to_compact(&self) -> String {
        self.0
            .classes
            .iter()
            .map(|c| format!("{}({})", c.name, c.properties.len()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn handle_show(ctx: &ProjectContext, args: &StoreArgs, class: Option<&str>, output: &OutputManager) -> Result<()> {
    output.heading("Live Schema");

    let store = connect_store(ctx, args, output)?;
    output.progress("Reading live schema");
    let schema = store.get_schema().map_err(MigrateError::from);
    output.clear_line();
    let mut schema = schema?;

    if let Some(name) = class {
        schema.classes.retain(|c| c.name == name);
        if schema.is_empty() {
            return Err(MigrateError::configuration(format!("class '{name}' not found in the live schema")).into());
        }
    }

    if schema.is_empty() && !output.is_json() {
        output.info("The store has no classes");
        return Ok(());
    }

    output.display(&SchemaView(schema))
}

#[derive(Serialize)]
struct DiffView {
    #[serde(flatten)]
    delta: MigrationDelta,
    #[serde(skip)]
    include_unchanged: bool,
}

impl TableDisplay for DiffView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Change", "Class", "Property"]);

        for entry in self.delta.entries() {
            if entry.change_type == ChangeType::Modified && !self.include_unchanged {
                continue;
            }
            let label = match entry.change_type {
                ChangeType::Added => "add",
                ChangeType::Removed => "remove",
                ChangeType::Modified => "shared",
            };
            table.add_row(vec![
                Cell::new(format!("{} {label}", entry.change_type)),
                Cell::new(&entry.class),
                Cell::new(entry.property.as_deref().unwrap_or("")),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        self.delta
            .entries()
            .iter()
            .filter(|e| self.include_unchanged || e.change_type != ChangeType::Modified)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn handle_diff(
    ctx: &ProjectContext,
    store_args: &StoreArgs,
    target_args: &TargetArgs,
    all: bool,
    output: &OutputManager,
) -> Result<()> {
    output.heading("Pending Changes");

    let target = load_target(ctx, target_args, output)?;
    let store = connect_store(ctx, store_args, output)?;

    output.progress("Comparing with live schema");
    let delta = preview(&store, &target);
    output.clear_line();
    let delta = delta?;

    if delta.is_empty() && !all && !output.is_json() {
        output.success("No pending changes; the live schema matches the target");
        return Ok(());
    }

    output.info(&format!("{} change(s) would be recorded", delta.change_count()));
    output.display(&DiffView {
        delta,
        include_unchanged: all,
    })
}
