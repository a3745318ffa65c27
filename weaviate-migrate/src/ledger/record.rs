//! The two record shapes a ledger file may hold.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::differ::MigrationDelta;
use crate::schema::Schema;

/// Contents of one ledger file.
///
/// Deltas are what `migrate create` writes today. Full schema snapshots are the
/// older bootstrap shape and are still accepted on replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MigrationRecord {
    Delta(MigrationDelta),
    Snapshot(Schema),
}

impl MigrationRecord {
    /// Decide the shape structurally: `classes_to_add` means delta, `classes` means snapshot.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(map) = &value else {
            return Err(format!("expected a JSON object, found {}", json_kind(&value)));
        };

        if map.contains_key("classes_to_add") {
            serde_json::from_value(value)
                .map(MigrationRecord::Delta)
                .map_err(|err| format!("invalid migration delta: {err}"))
        } else if map.contains_key("classes") {
            serde_json::from_value(value)
                .map(MigrationRecord::Snapshot)
                .map_err(|err| format!("invalid schema snapshot: {err}"))
        } else {
            Err("expected a schema snapshot (`classes`) or a migration delta (`classes_to_add`)".to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MigrationRecord::Delta(_) => "delta",
            MigrationRecord::Snapshot(_) => "snapshot",
        }
    }
}

impl From<MigrationDelta> for MigrationRecord {
    fn from(delta: MigrationDelta) -> Self {
        MigrationRecord::Delta(delta)
    }
}

impl From<Schema> for MigrationRecord {
    fn from(schema: Schema) -> Self {
        MigrationRecord::Snapshot(schema)
    }
}

impl<'de> Deserialize<'de> for MigrationRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delta_shape_is_detected() {
        let record: MigrationRecord = serde_json::from_value(json!({
            "classes_to_add": ["A"],
            "classes_to_remove": [],
            "properties_to_add": {},
            "properties_to_remove": {},
            "properties_to_change": {}
        }))
        .unwrap();
        assert_eq!(record.kind(), "delta");
    }

    #[test]
    fn test_snapshot_shape_is_detected() {
        let record: MigrationRecord = serde_json::from_value(json!({"classes": []})).unwrap();
        assert_eq!(record, MigrationRecord::Snapshot(Schema::default()));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let err = MigrationRecord::from_value(json!({"tables": []})).unwrap_err();
        assert!(err.contains("classes_to_add"));

        let err = MigrationRecord::from_value(json!([1, 2])).unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_serializes_without_a_tag() {
        let record = MigrationRecord::Snapshot(Schema::default());
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"classes": []}));
    }
}
