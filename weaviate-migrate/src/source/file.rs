use std::path::{Path, PathBuf};

use log::debug;

use super::SchemaSource;
use crate::errors::{MigrateError, MigrateResult};
use crate::schema::Schema;

/// A target schema kept in a `{"classes": [...]}` JSON file.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    path: PathBuf,
}

impl SchemaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for SchemaFile {
    fn provide_target_schema(&self, prefix: &str) -> MigrateResult<Schema> {
        let content = std::fs::read_to_string(&self.path).map_err(|err| {
            MigrateError::configuration(format!("cannot read target schema {}: {err}", self.path.display()))
        })?;

        let mut schema: Schema = serde_json::from_str(&content).map_err(|err| {
            MigrateError::configuration(format!("invalid target schema {}: {err}", self.path.display()))
        })?;

        schema.retain_prefix(prefix);
        debug!(
            "loaded {} target classes from {}",
            schema.classes.len(),
            self.path.display()
        );
        Ok(schema)
    }
}
