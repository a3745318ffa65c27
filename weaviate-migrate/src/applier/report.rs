//! What happened while applying one migration record.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The class or property an action was about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActionTarget {
    Class { class: String },
    Property { class: String, property: String },
}

impl ActionTarget {
    pub fn class(class: &str) -> Self {
        ActionTarget::Class {
            class: class.to_string(),
        }
    }

    pub fn property(class: &str, property: &str) -> Self {
        ActionTarget::Property {
            class: class.to_string(),
            property: property.to_string(),
        }
    }
}

impl std::fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionTarget::Class { class } => write!(f, "class {class}"),
            ActionTarget::Property { class, property } => write!(f, "property {class}.{property}"),
        }
    }
}

/// Why no create call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ClassExists,
    PropertyExists,
    /// A delta names the property but carries no definition to create it from.
    NoDefinition,
    RemovalNotSupported,
    ChangeNotApplied,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::ClassExists => "class exists",
            SkipReason::PropertyExists => "property exists",
            SkipReason::NoDefinition => "no definition",
            SkipReason::RemovalNotSupported => "removal not supported",
            SkipReason::ChangeNotApplied => "change not applied",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum ActionOutcome {
    Created,
    /// Would have been created; dry run.
    Planned,
    Skipped(SkipReason),
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOutcome::Created => write!(f, "created"),
            ActionOutcome::Planned => write!(f, "planned"),
            ActionOutcome::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyAction {
    pub target: ActionTarget,
    pub outcome: ActionOutcome,
}

/// Report for one applied record.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Ledger file name; `None` when a record was applied directly.
    pub migration: Option<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub dry_run: bool,
    pub actions: Vec<ApplyAction>,
}

impl ApplyReport {
    pub(crate) fn new(started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            migration: None,
            started_at,
            elapsed_ms: 0,
            dry_run,
            actions: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, target: ActionTarget, outcome: ActionOutcome) {
        self.actions.push(ApplyAction { target, outcome });
    }

    pub fn created_count(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Created))
    }

    pub fn planned_count(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Planned))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ActionOutcome::Skipped(_)))
    }

    /// True when applying the record did not (or would not) change the store.
    pub fn is_noop(&self) -> bool {
        self.created_count() == 0 && self.planned_count() == 0
    }

    /// Label for display: the file name, or `<inline>`.
    pub fn label(&self) -> &str {
        self.migration.as_deref().unwrap_or("<inline>")
    }

    fn count(&self, predicate: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(&a.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts() {
        let mut report = ApplyReport::new(Utc::now(), false);
        report.record(ActionTarget::class("A"), ActionOutcome::Created);
        report.record(ActionTarget::property("A", "x"), ActionOutcome::Created);
        report.record(
            ActionTarget::property("A", "y"),
            ActionOutcome::Skipped(SkipReason::NoDefinition),
        );

        assert_eq!(report.created_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.planned_count(), 0);
        assert!(!report.is_noop());
        assert_eq!(report.label(), "<inline>");
    }

    #[test]
    fn test_action_serialization() {
        let action = ApplyAction {
            target: ActionTarget::property("A", "x"),
            outcome: ActionOutcome::Skipped(SkipReason::PropertyExists),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "target": {"kind": "property", "class": "A", "property": "x"},
                "outcome": {"outcome": "skipped", "reason": "property_exists"}
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ActionTarget::property("A", "x").to_string(), "property A.x");
        assert_eq!(
            ActionOutcome::Skipped(SkipReason::NoDefinition).to_string(),
            "skipped (no definition)"
        );
    }
}
