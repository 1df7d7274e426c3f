use super::{ElementId, ElementKind, GraphElement, PropertyValue};
use crate::storage::{ElementStream, GraphQuery, GraphStorage, StorageError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Directed edge between two vertices, referenced by id.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    id: ElementId,
    label: Arc<str>,
    out_vertex: ElementId,
    in_vertex: ElementId,
    properties: BTreeMap<String, PropertyValue>,
}

impl Edge {
    pub fn new(
        id: impl Into<ElementId>,
        label: impl Into<Arc<str>>,
        out_vertex: impl Into<ElementId>,
        in_vertex: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            out_vertex: out_vertex.into(),
            in_vertex: in_vertex.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn out_vertex(&self) -> ElementId {
        self.out_vertex
    }

    pub fn in_vertex(&self) -> ElementId {
        self.in_vertex
    }
}

impl GraphElement for Edge {
    const KIND: ElementKind = ElementKind::Edge;

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
        storage.edges(query)
    }
}
