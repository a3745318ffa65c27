//! A schema store held in memory.

use std::cell::RefCell;

use log::debug;

use super::SchemaStore;
use crate::errors::StoreError;
use crate::schema::{ClassDefinition, PropertyDefinition, Schema};

/// One call made against an [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    GetSchema,
    CreateClass(ClassDefinition),
    CreateProperty {
        class: String,
        property: PropertyDefinition,
    },
}

impl StoreCall {
    pub fn is_create(&self) -> bool {
        !matches!(self, StoreCall::GetSchema)
    }
}

/// Store backed by an in-memory schema.
///
/// Creates mutate the held schema, so repeated runs observe earlier ones.
/// Creating a class that exists fails the way a real store does; creating a
/// property that already exists on its class is accepted and changes nothing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    schema: RefCell<Schema>,
    calls: RefCell<Vec<StoreCall>>,
    get_schema_failure: Option<StoreError>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: RefCell::new(schema),
            ..Self::default()
        }
    }

    /// Make every `get_schema` call fail with `error`.
    pub fn failing_get_schema(mut self, error: StoreError) -> Self {
        self.get_schema_failure = Some(error);
        self
    }

    /// Current state of the held schema.
    pub fn schema(&self) -> Schema {
        self.schema.borrow().clone()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    /// Calls that would mutate a real store.
    pub fn create_calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().iter().filter(|c| c.is_create()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl SchemaStore for InMemoryStore {
    fn get_schema(&self) -> Result<Schema, StoreError> {
        self.calls.borrow_mut().push(StoreCall::GetSchema);
        if let Some(error) = &self.get_schema_failure {
            return Err(error.clone());
        }
        Ok(self.schema.borrow().clone())
    }

    fn create_class(&self, class: &ClassDefinition) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(StoreCall::CreateClass(class.clone()));

        let mut schema = self.schema.borrow_mut();
        if schema.contains_class(&class.name) {
            return Err(StoreError::Status {
                operation: "create_class",
                status: 422,
                body: format!("class name '{}' already exists", class.name),
            });
        }
        debug!("in-memory store: created class {}", class.name);
        schema.classes.push(class.clone());
        Ok(())
    }

    fn create_property(&self, class_name: &str, property: &PropertyDefinition) -> Result<(), StoreError> {
        self.calls.borrow_mut().push(StoreCall::CreateProperty {
            class: class_name.to_string(),
            property: property.clone(),
        });

        let mut schema = self.schema.borrow_mut();
        let Some(class) = schema.classes.iter_mut().find(|c| c.name == class_name) else {
            return Err(StoreError::Status {
                operation: "create_property",
                status: 422,
                body: format!("class '{class_name}' not found"),
            });
        };
        if !class.has_property(&property.name) {
            debug!("in-memory store: created property {class_name}.{}", property.name);
            class.properties.push(property.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let store = InMemoryStore::new();
        store.get_schema().unwrap();
        store
            .create_class(&ClassDefinition::new("A").with_property(PropertyDefinition::new("p", "string")))
            .unwrap();
        store.create_property("A", &PropertyDefinition::new("q", "int")).unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], StoreCall::GetSchema);
        assert!(matches!(&calls[1], StoreCall::CreateClass(c) if c.name == "A"));
        assert_eq!(store.create_calls().len(), 2);
        assert_eq!(store.schema().class("A").unwrap().property_names().len(), 2);
    }

    #[test]
    fn test_duplicate_class_is_rejected() {
        let store = InMemoryStore::with_schema(Schema::new(vec![ClassDefinition::new("A")]));
        let err = store.create_class(&ClassDefinition::new("A")).unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 422, .. }));
    }

    #[test]
    fn test_property_on_missing_class_is_rejected() {
        let store = InMemoryStore::new();
        assert!(store.create_property("Nope", &PropertyDefinition::new("p", "string")).is_err());
    }

    #[test]
    fn test_existing_property_is_left_alone() {
        let store = InMemoryStore::with_schema(Schema::new(vec![
            ClassDefinition::new("A").with_property(PropertyDefinition::new("p", "string")),
        ]));
        store.create_property("A", &PropertyDefinition::new("p", "int")).unwrap();
        assert_eq!(store.schema().class("A").unwrap().properties[0].type_label(), "string");
    }

    #[test]
    fn test_failing_get_schema() {
        let store = InMemoryStore::new().failing_get_schema(StoreError::other("offline"));
        assert_eq!(store.get_schema().unwrap_err(), StoreError::other("offline"));
        assert_eq!(store.calls(), vec![StoreCall::GetSchema]);
    }
}
