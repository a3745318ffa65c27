//! Schema types for classes, properties and cross-references.
//!
//! The types only interpret the keys the migration engine needs. Everything
//! else a store returns (vectorizer settings, `dataType`, descriptions) is kept
//! in `extra` so a definition survives a read/write round trip untouched.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property type used for cross-references between classes.
pub const CROSS_REFERENCE_TYPE: &str = "cref";

/// A full schema snapshot: the set of class definitions a store knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub classes: Vec<ClassDefinition>,
}

impl Schema {
    pub fn new(classes: Vec<ClassDefinition>) -> Self {
        Self { classes }
    }

    /// True when the schema holds no classes.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Look up a class by name.
    pub fn class(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    /// Class names as a sorted set.
    pub fn class_names(&self) -> BTreeSet<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }

    /// Whether any class in the schema has a property with this name.
    pub fn has_property_anywhere(&self, property: &str) -> bool {
        self.classes.iter().any(|c| c.has_property(property))
    }

    /// Whether `class` exists and has a property with this name.
    pub fn class_has_property(&self, class: &str, property: &str) -> bool {
        self.class(class).is_some_and(|c| c.has_property(property))
    }

    /// Keep only classes whose name starts with `prefix`. An empty prefix keeps all.
    pub fn retain_prefix(&mut self, prefix: &str) {
        if !prefix.is_empty() {
            self.classes.retain(|c| c.name.starts_with(prefix));
        }
    }

    /// Structural problems that make this schema unusable as a migration target.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen_classes = HashSet::new();

        for class in &self.classes {
            if class.name.trim().is_empty() {
                issues.push("class with an empty name".to_string());
                continue;
            }
            if !seen_classes.insert(class.name.as_str()) {
                issues.push(format!("class '{}' is defined more than once", class.name));
            }

            let mut seen_props = HashSet::new();
            for property in &class.properties {
                if property.name.trim().is_empty() {
                    issues.push(format!("class '{}' has a property with an empty name", class.name));
                    continue;
                }
                if !seen_props.insert(property.name.as_str()) {
                    issues.push(format!(
                        "property '{}' is defined more than once on class '{}'",
                        property.name, class.name
                    ));
                }
                if property.is_cross_reference() && property.ref_class.is_none() {
                    issues.push(format!(
                        "cross-reference '{}.{}' has no refClass",
                        class.name, property.name
                    ));
                }
            }
        }

        issues
    }
}

/// A named class and its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    #[serde(rename = "class")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Vec<PropertyDefinition>,

    /// Store-specific keys the engine passes through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stores report a class without properties as `"properties": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PropertyDefinition>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<PropertyDefinition>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn property_names(&self) -> BTreeSet<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Whether a cross-reference points at one object or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "toOne")]
    ToOne,
    #[serde(rename = "many")]
    Many,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::ToOne => write!(f, "toOne"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// A single property on a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,

    /// Property type (`string`, `int`, `cref`, ...). Store-native definitions
    /// may omit it and carry `dataType` in `extra` instead.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,

    #[serde(rename = "refClass", default, skip_serializing_if = "Option::is_none")]
    pub ref_class: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: Some(property_type.into()),
            cardinality: None,
            ref_class: None,
            extra: Map::new(),
        }
    }

    /// A `cref` property pointing at `ref_class`.
    pub fn cross_reference(name: impl Into<String>, ref_class: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            property_type: Some(CROSS_REFERENCE_TYPE.to_string()),
            cardinality: Some(cardinality),
            ref_class: Some(ref_class.into()),
            extra: Map::new(),
        }
    }

    pub fn is_cross_reference(&self) -> bool {
        self.property_type.as_deref() == Some(CROSS_REFERENCE_TYPE)
    }

    /// Human readable type: `type`, else the first `dataType` entry.
    pub fn type_label(&self) -> String {
        if let Some(ty) = &self.property_type {
            return ty.clone();
        }
        self.extra
            .get("dataType")
            .and_then(|v| v.as_array())
            .and_then(|types| types.first())
            .and_then(|t| t.as_str())
            .unwrap_or("?")
            .to_string()
    }
}
