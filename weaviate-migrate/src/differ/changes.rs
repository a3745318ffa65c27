//! Delta computation between a live schema and a target schema.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// Structural delta between two schema snapshots.
///
/// This is the persisted ledger format. Lists have set semantics; they are
/// written sorted so the same inputs always produce the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationDelta {
    pub classes_to_add: Vec<String>,
    #[serde(default)]
    pub classes_to_remove: Vec<String>,
    #[serde(default)]
    pub properties_to_add: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub properties_to_remove: BTreeMap<String, Vec<String>>,
    /// Properties present on both sides. Informational only; nothing alters them.
    #[serde(default)]
    pub properties_to_change: BTreeMap<String, Vec<String>>,
}

impl MigrationDelta {
    /// True when there is nothing to add or remove.
    ///
    /// `properties_to_change` is ignored: it lists every shared property and
    /// says nothing about whether it actually differs.
    pub fn is_empty(&self) -> bool {
        self.classes_to_add.is_empty()
            && self.classes_to_remove.is_empty()
            && self.properties_to_add.values().all(Vec::is_empty)
            && self.properties_to_remove.values().all(Vec::is_empty)
    }

    /// Number of class and property additions/removals.
    pub fn change_count(&self) -> usize {
        self.classes_to_add.len()
            + self.classes_to_remove.len()
            + self.properties_to_add.values().map(Vec::len).sum::<usize>()
            + self.properties_to_remove.values().map(Vec::len).sum::<usize>()
    }

    /// Flattened view for display: class changes first, then property changes per class.
    pub fn entries(&self) -> Vec<DeltaEntry> {
        let mut entries = Vec::new();

        for class in &self.classes_to_add {
            entries.push(DeltaEntry::class(ChangeType::Added, class));
        }
        for class in &self.classes_to_remove {
            entries.push(DeltaEntry::class(ChangeType::Removed, class));
        }

        let sections = [
            (ChangeType::Added, &self.properties_to_add),
            (ChangeType::Removed, &self.properties_to_remove),
            (ChangeType::Modified, &self.properties_to_change),
        ];
        for (change_type, per_class) in sections {
            for (class, properties) in per_class {
                for property in properties {
                    entries.push(DeltaEntry::property(change_type, class, property));
                }
            }
        }

        entries
    }
}

/// One line of a delta, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaEntry {
    pub change_type: ChangeType,
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl DeltaEntry {
    fn class(change_type: ChangeType, class: &str) -> Self {
        Self {
            change_type,
            class: class.to_string(),
            property: None,
        }
    }

    fn property(change_type: ChangeType, class: &str, property: &str) -> Self {
        Self {
            change_type,
            class: class.to_string(),
            property: Some(property.to_string()),
        }
    }
}

impl std::fmt::Display for DeltaEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{} {}.{}", self.change_type, self.class, property),
            None => write!(f, "{} class {}", self.change_type, self.class),
        }
    }
}

/// Type of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Added => write!(f, "+"),
            ChangeType::Removed => write!(f, "-"),
            ChangeType::Modified => write!(f, "~"),
        }
    }
}

/// Compare the live schema against the target and produce a delta.
///
/// `None` means "no schema at all" on that side:
/// - no current schema: every target class is added, nothing else is reported
/// - no target schema: every current class is removed, nothing else is reported
///
/// Otherwise classes are compared by name and property deltas are computed for
/// classes present on both sides. When the current schema exists but holds no
/// classes (a live store that is still empty), each added class also lists its
/// properties under `properties_to_add`.
pub fn diff_schemas(current: Option<&Schema>, target: Option<&Schema>) -> MigrationDelta {
    let mut delta = MigrationDelta::default();

    let (current, target) = match (current, target) {
        (None, None) => return delta,
        (None, Some(target)) => {
            delta.classes_to_add = sorted(target.class_names());
            return delta;
        }
        (Some(current), None) => {
            delta.classes_to_remove = sorted(current.class_names());
            return delta;
        }
        (Some(current), Some(target)) => (current, target),
    };

    let current_classes = current.class_names();
    let target_classes = target.class_names();

    delta.classes_to_add = sorted(target_classes.difference(&current_classes).copied());
    delta.classes_to_remove = sorted(current_classes.difference(&target_classes).copied());

    if current.is_empty() {
        for class in &target.classes {
            delta
                .properties_to_add
                .insert(class.name.clone(), sorted(class.property_names()));
        }
        return delta;
    }

    for class_name in current_classes.intersection(&target_classes) {
        let (Some(current_class), Some(target_class)) = (current.class(class_name), target.class(class_name))
        else {
            continue;
        };
        let current_props = current_class.property_names();
        let target_props = target_class.property_names();

        let key = class_name.to_string();
        delta
            .properties_to_add
            .insert(key.clone(), sorted(target_props.difference(&current_props).copied()));
        delta
            .properties_to_remove
            .insert(key.clone(), sorted(current_props.difference(&target_props).copied()));
        delta
            .properties_to_change
            .insert(key, sorted(target_props.intersection(&current_props).copied()));
    }

    delta
}

fn sorted<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ClassDefinition, PropertyDefinition};
    use serde_json::json;

    fn make_class(name: &str, props: &[&str]) -> ClassDefinition {
        props.iter().fold(ClassDefinition::new(name), |class, prop| {
            class.with_property(PropertyDefinition::new(*prop, "string"))
        })
    }

    fn make_schema(classes: Vec<ClassDefinition>) -> Schema {
        Schema::new(classes)
    }

    fn as_set(names: &[String]) -> BTreeSet<&str> {
        names.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_no_current_schema_adds_every_class() {
        let target = make_schema(vec![make_class("A", &["x"]), make_class("B", &[])]);
        let delta = diff_schemas(None, Some(&target));

        assert_eq!(as_set(&delta.classes_to_add), BTreeSet::from(["A", "B"]));
        assert!(delta.classes_to_remove.is_empty());
        assert!(delta.properties_to_add.is_empty());
        assert!(delta.properties_to_remove.is_empty());
        assert!(delta.properties_to_change.is_empty());
    }

    #[test]
    fn test_no_target_schema_removes_every_class() {
        let current = make_schema(vec![make_class("A", &["x"]), make_class("B", &[])]);
        let delta = diff_schemas(Some(&current), None);

        assert_eq!(as_set(&delta.classes_to_remove), BTreeSet::from(["A", "B"]));
        assert!(delta.classes_to_add.is_empty());
        assert!(delta.properties_to_add.is_empty());
        assert!(delta.properties_to_remove.is_empty());
        assert!(delta.properties_to_change.is_empty());
    }

    #[test]
    fn test_both_absent_is_empty() {
        assert_eq!(diff_schemas(None, None), MigrationDelta::default());
    }

    #[test]
    fn test_empty_live_store_seeds_properties() {
        let current = Schema::default();
        let target = make_schema(vec![make_class("SampleClass", &["sampleProperty"])]);

        let delta = diff_schemas(Some(&current), Some(&target));
        let value = serde_json::to_value(&delta).unwrap();

        assert_eq!(
            value,
            json!({
                "classes_to_add": ["SampleClass"],
                "classes_to_remove": [],
                "properties_to_add": {"SampleClass": ["sampleProperty"]},
                "properties_to_remove": {},
                "properties_to_change": {},
            })
        );
    }

    #[test]
    fn test_class_set_difference() {
        let current = make_schema(vec![make_class("Keep", &[]), make_class("Old", &[])]);
        let target = make_schema(vec![make_class("Keep", &[]), make_class("New", &["p"])]);

        let delta = diff_schemas(Some(&current), Some(&target));
        assert_eq!(delta.classes_to_add, vec!["New"]);
        assert_eq!(delta.classes_to_remove, vec!["Old"]);
        // New classes get no property entries once the store already has classes.
        assert!(!delta.properties_to_add.contains_key("New"));
        assert!(delta.properties_to_add.contains_key("Keep"));
    }

    #[test]
    fn test_property_deltas_for_shared_classes() {
        let current = make_schema(vec![make_class("Article", &["title", "legacy"])]);
        let target = make_schema(vec![make_class("Article", &["title", "body", "summary"])]);

        let delta = diff_schemas(Some(&current), Some(&target));
        assert_eq!(
            as_set(&delta.properties_to_add["Article"]),
            BTreeSet::from(["body", "summary"])
        );
        assert_eq!(delta.properties_to_remove["Article"], vec!["legacy"]);
        assert_eq!(delta.properties_to_change["Article"], vec!["title"]);
    }

    #[test]
    fn test_change_is_shallow_membership_only() {
        let current = make_schema(vec![
            ClassDefinition::new("A").with_property(PropertyDefinition::new("count", "string")),
        ]);
        let target = make_schema(vec![
            ClassDefinition::new("A").with_property(PropertyDefinition::new("count", "int")),
        ]);

        let delta = diff_schemas(Some(&current), Some(&target));
        assert_eq!(delta.properties_to_change["A"], vec!["count"]);

        let same = diff_schemas(Some(&current), Some(&current));
        assert_eq!(same.properties_to_change["A"], vec!["count"]);
        assert!(same.is_empty());
    }

    #[test]
    fn test_adding_delta_to_current_gives_target_without_loss() {
        let current = make_schema(vec![make_class("A", &["a1", "a2"]), make_class("B", &["b1"])]);
        let target = make_schema(vec![make_class("A", &["a2", "a3"]), make_class("C", &["c1"])]);

        let delta = diff_schemas(Some(&current), Some(&target));

        let mut classes: BTreeSet<&str> = current.class_names();
        classes.extend(delta.classes_to_add.iter().map(String::as_str));
        for removed in &delta.classes_to_remove {
            classes.remove(removed.as_str());
        }
        assert_eq!(classes, target.class_names());

        let mut a_props: BTreeSet<&str> = current.class("A").unwrap().property_names();
        a_props.extend(delta.properties_to_add["A"].iter().map(String::as_str));
        for removed in &delta.properties_to_remove["A"] {
            a_props.remove(removed.as_str());
        }
        assert_eq!(a_props, target.class("A").unwrap().property_names());
    }

    #[test]
    fn test_duplicate_names_are_reported_once() {
        let target = make_schema(vec![make_class("A", &[]), make_class("A", &[])]);
        let delta = diff_schemas(None, Some(&target));
        assert_eq!(delta.classes_to_add, vec!["A"]);
    }

    #[test]
    fn test_entries_and_counts() {
        let current = make_schema(vec![make_class("A", &["x", "old"])]);
        let target = make_schema(vec![make_class("A", &["x", "y"]), make_class("B", &[])]);
        let delta = diff_schemas(Some(&current), Some(&target));

        assert_eq!(delta.change_count(), 3);
        let rendered: Vec<String> = delta.entries().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["+ class B", "+ A.y", "- A.old", "~ A.x"]);
    }

    #[test]
    fn test_delta_reads_with_missing_optional_keys() {
        let delta: MigrationDelta = serde_json::from_value(json!({
            "classes_to_add": ["SampleClass"],
            "properties_to_add": {"SampleClass": ["sampleProperty"]}
        }))
        .unwrap();
        assert_eq!(delta.classes_to_add, vec!["SampleClass"]);
        assert!(delta.classes_to_remove.is_empty());
    }
}
