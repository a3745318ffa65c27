use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use weaviate_migrate::{MigrateError, StoreConfig};

use crate::context::{ProjectConfig, CONFIG_FILE, DEFAULT_STORE_URL};
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Set Up a Project",
    commands: &[
        "weaviate-migrate init                                  # Defaults in the current directory",
        "weaviate-migrate init --folder db/migrations           # Custom migration folder",
        "weaviate-migrate init --url http://weaviate:8080 --force",
    ],
}];

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Migration folder, relative to the project root
    #[arg(long, default_value = "migrations")]
    folder: String,

    /// Store URL to record in the config
    #[arg(long, default_value = DEFAULT_STORE_URL)]
    url: String,

    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    let root = std::env::current_dir().context("Failed to get current directory")?;
    let written = init_project(&root, &args)?;

    output.heading("Initialize weaviate-migrate");
    output.success(&format!("Wrote {}", written.config_path.display()));
    output.success(&format!("Migration folder {}", written.migrations_dir.display()));
    output.info("Next: weaviate-migrate migrate create --target-schema-file <schema.json>");
    Ok(())
}

#[derive(Debug)]
struct InitializedProject {
    config_path: PathBuf,
    migrations_dir: PathBuf,
}

fn init_project(root: &Path, args: &InitArgs) -> Result<InitializedProject> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(MigrateError::configuration(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    // Reject bad URLs now rather than on the first deploy.
    StoreConfig::new(&args.url)?;

    let mut config = ProjectConfig::default();
    config.migrations.folder = args.folder.clone();
    config.store.url = Some(args.url.clone());

    let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let migrations_dir = root.join(&args.folder);
    std::fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create {}", migrations_dir.display()))?;

    Ok(InitializedProject {
        config_path,
        migrations_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ProjectContext;
    use tempfile::TempDir;

    fn args(force: bool) -> InitArgs {
        InitArgs {
            folder: "db/migrations".to_string(),
            url: "http://localhost:8080".to_string(),
            force,
        }
    }

    #[test]
    fn test_init_writes_config_and_folder() {
        let temp_dir = TempDir::new().unwrap();
        let written = init_project(temp_dir.path(), &args(false)).unwrap();

        assert!(written.config_path.is_file());
        assert!(written.migrations_dir.is_dir());

        let ctx = ProjectContext::find_from(temp_dir.path()).unwrap();
        assert!(ctx.is_initialized());
        assert_eq!(ctx.migrations_dir(None), temp_dir.path().join("db/migrations"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        init_project(temp_dir.path(), &args(false)).unwrap();

        let err = init_project(temp_dir.path(), &args(false)).unwrap_err();
        assert!(err.downcast_ref::<MigrateError>().is_some());
        assert!(init_project(temp_dir.path(), &args(true)).is_ok());
    }

    #[test]
    fn test_init_rejects_bad_url() {
        let temp_dir = TempDir::new().unwrap();
        let bad = InitArgs {
            url: "localhost".to_string(),
            ..args(false)
        };
        assert!(init_project(temp_dir.path(), &bad).is_err());
        assert!(!temp_dir.path().join(CONFIG_FILE).exists());
    }
}
