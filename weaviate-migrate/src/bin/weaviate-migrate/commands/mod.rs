pub mod init;
pub mod migrate;
pub mod schema;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use weaviate_migrate::{
    CatalogConfig, MigrateError, ModelCatalog, Schema, SchemaFile, SchemaSource, WeaviateStore,
};

use crate::context::{ProjectContext, StoreArgs};
use crate::output::OutputManager;

/// Where the target schema comes from
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// JSON file holding the target schema (`{"classes": [...]}`)
    #[arg(long, conflicts_with = "catalog")]
    pub target_schema_file: Option<PathBuf>,

    /// Model catalog (.toml or .json) to build the target schema from
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only include classes whose name starts with this prefix
    #[arg(long)]
    pub model_prefix: Option<String>,
}

/// Resolve the target schema: flags first, then the `[source]` config section.
pub fn load_target(ctx: &ProjectContext, args: &TargetArgs, output: &OutputManager) -> Result<Schema> {
    let settings = ctx.source_settings();
    let prefix = args.model_prefix.clone().unwrap_or(settings.model_prefix.clone());

    let source: Box<dyn SchemaSource> = if let Some(path) = &args.target_schema_file {
        Box::new(SchemaFile::new(path))
    } else if let Some(path) = &args.catalog {
        Box::new(ModelCatalog::load(&CatalogConfig::new(path))?)
    } else if let Some(path) = ctx.source_path(settings.target_schema_file.as_ref()) {
        Box::new(SchemaFile::new(path))
    } else if let Some(path) = ctx.source_path(settings.catalog.as_ref()) {
        Box::new(ModelCatalog::load(&CatalogConfig::new(path))?)
    } else {
        return Err(MigrateError::configuration(
            "no target schema source: pass --target-schema-file or --catalog, or set [source] in the config",
        )
        .into());
    };

    let schema = source
        .provide_target_schema(&prefix)
        .context("Failed to build target schema")?;

    if prefix.is_empty() {
        output.verbose(&format!("Target schema has {} class(es)", schema.classes.len()));
    } else {
        output.verbose(&format!(
            "Target schema has {} class(es) with prefix '{prefix}'",
            schema.classes.len()
        ));
    }
    Ok(schema)
}

pub fn connect_store(ctx: &ProjectContext, args: &StoreArgs, output: &OutputManager) -> Result<WeaviateStore> {
    let config = ctx.store_config(args)?;
    output.verbose(&format!("Using store at {}", config.url));
    Ok(WeaviateStore::connect(config)?)
}
