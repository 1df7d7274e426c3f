use crate::element::{ElementId, GraphElement, PropertyValue};
use smallvec::SmallVec;

/// Storage-level fetch criteria.
///
/// A default query is unconstrained. [`GraphQuery::ids`] restricts the fetch to an
/// explicit identifier list; an empty list matches nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphQuery {
    ids: Option<SmallVec<[ElementId; 4]>>,
    has: Vec<(String, PropertyValue)>,
    limit: Option<usize>,
}

impl GraphQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn has(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.has.push((key.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn id_filter(&self) -> Option<&[ElementId]> {
        self.ids.as_deref()
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_unconstrained(&self) -> bool {
        self.ids.is_none() && self.has.is_empty() && self.limit.is_none()
    }

    /// Checks id and property criteria; the limit is left to the backend.
    pub fn matches<G: GraphElement>(&self, element: &G) -> bool {
        if let Some(ids) = &self.ids
            && !ids.contains(&element.id())
        {
            return false;
        }
        self.has.iter().all(|(key, value)| element.property(key) == Some(value))
    }
}
