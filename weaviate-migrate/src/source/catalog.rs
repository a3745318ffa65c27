//! Target schema built from a catalog of ORM-style models.
//!
//! A catalog lists models with their fields and an optional list of extra
//! cross-references. It can be written as TOML or JSON:
//!
//! ```toml
//! [[models]]
//! name = "TestArticle"
//! fields = [
//!     { name = "title", kind = "CharField" },
//!     { name = "author", kind = "ForeignKey", target = "TestAuthor" },
//! ]
//!
//! [[cross_references]]
//! field_name = "hasParagraphs"
//! source_class = "TestArticle"
//! target_class = "TestParagraph"
//! cardinality = "many"
//! ```
//!
//! Plain fields become properties typed through
//! [`store_type_for_field`](super::store_type_for_field). Relational fields and
//! explicit cross-references are appended after them as `cref` properties.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::SchemaSource;
use super::field_types::{relation_cardinality, store_type_for_field};
use crate::errors::{MigrateError, MigrateResult};
use crate::schema::{Cardinality, ClassDefinition, PropertyDefinition, Schema};

/// Where to read a catalog from.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

impl CatalogConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogModel {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<CatalogField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogField {
    pub name: String,
    pub kind: String,
    /// Referenced model for relational kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl CatalogField {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            target: None,
        }
    }

    pub fn relation(name: impl Into<String>, kind: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            target: Some(target.into()),
        }
    }
}

/// A cross-reference declared outside any model's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub field_name: String,
    pub source_class: String,
    pub target_class: String,
    pub cardinality: Cardinality,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    models: Vec<CatalogModel>,
    #[serde(default)]
    cross_references: Vec<CrossReference>,
}

/// Schema source backed by a model catalog.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<CatalogModel>,
    cross_references: Vec<CrossReference>,
}

impl ModelCatalog {
    pub fn new(models: Vec<CatalogModel>, cross_references: Vec<CrossReference>) -> Self {
        Self {
            models,
            cross_references,
        }
    }

    /// Read a catalog file. The format follows the extension (`.toml` or `.json`).
    pub fn load(config: &CatalogConfig) -> MigrateResult<Self> {
        let path = &config.path;
        let content = std::fs::read_to_string(path)
            .map_err(|err| MigrateError::configuration(format!("cannot read catalog {}: {err}", path.display())))?;

        let document = parse_document(path, &content)?;
        debug!(
            "loaded catalog {} ({} models, {} cross-references)",
            path.display(),
            document.models.len(),
            document.cross_references.len()
        );

        Ok(Self::new(document.models, document.cross_references))
    }

    pub fn models(&self) -> &[CatalogModel] {
        &self.models
    }

    pub fn cross_references(&self) -> &[CrossReference] {
        &self.cross_references
    }

    fn class_for_model(&self, model: &CatalogModel) -> MigrateResult<ClassDefinition> {
        let mut class = ClassDefinition::new(&model.name);
        let mut relations = Vec::new();

        for field in &model.fields {
            match relation_cardinality(&field.kind) {
                Some(cardinality) => {
                    let target = field.target.as_deref().filter(|t| !t.is_empty()).ok_or_else(|| {
                        MigrateError::configuration(format!(
                            "relational field '{}.{}' ({}) has no target model",
                            model.name, field.name, field.kind
                        ))
                    })?;
                    relations.push(PropertyDefinition::cross_reference(&field.name, target, cardinality));
                }
                None => class
                    .properties
                    .push(PropertyDefinition::new(&field.name, store_type_for_field(&field.kind))),
            }
        }

        class.properties.extend(relations);

        for reference in self.cross_references.iter().filter(|r| r.source_class == model.name) {
            if class.has_property(&reference.field_name) {
                warn!(
                    "cross-reference {}.{} duplicates a model field, keeping the field",
                    model.name, reference.field_name
                );
                continue;
            }
            class.properties.push(PropertyDefinition::cross_reference(
                &reference.field_name,
                &reference.target_class,
                reference.cardinality,
            ));
        }

        Ok(class)
    }
}

fn parse_document(path: &Path, content: &str) -> MigrateResult<CatalogDocument> {
    let invalid = |err: String| MigrateError::configuration(format!("invalid catalog {}: {err}", path.display()));

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(content).map_err(|err| invalid(err.to_string())),
        Some("json") => serde_json::from_str(content).map_err(|err| invalid(err.to_string())),
        _ => Err(MigrateError::configuration(format!(
            "catalog {} must be a .toml or .json file",
            path.display()
        ))),
    }
}

impl SchemaSource for ModelCatalog {
    fn provide_target_schema(&self, prefix: &str) -> MigrateResult<Schema> {
        let classes = self
            .models
            .iter()
            .filter(|model| model.name.starts_with(prefix))
            .map(|model| self.class_for_model(model))
            .collect::<MigrateResult<Vec<_>>>()?;

        Ok(Schema::new(classes))
    }
}
