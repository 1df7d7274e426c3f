use super::{ElementId, ElementKind, GraphElement, PropertyValue};
use crate::storage::{ElementStream, GraphQuery, GraphStorage, StorageError};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    id: ElementId,
    label: Arc<str>,
    properties: BTreeMap<String, PropertyValue>,
}

impl Vertex {
    pub fn new(id: impl Into<ElementId>, label: impl Into<Arc<str>>) -> Self {
        Self { id: id.into(), label: label.into(), properties: BTreeMap::new() }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl GraphElement for Vertex {
    const KIND: ElementKind = ElementKind::Vertex;

    fn id(&self) -> ElementId {
        self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    fn fetch(
        storage: &dyn GraphStorage,
        query: &GraphQuery,
    ) -> Result<ElementStream<Self>, StorageError> {
        storage.vertices(query)
    }
}
