mod edge;
mod id;
mod value;
mod vertex;

pub use edge::Edge;
pub use id::ElementId;
pub use value::PropertyValue;
pub use vertex::Vertex;

use crate::storage::{ElementStream, GraphQuery, GraphStorage, StorageError};
use std::collections::BTreeMap;
use std::fmt;

/// Distinguishes the two element families a storage backend serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Vertex => f.write_str("vertex"),
            ElementKind::Edge => f.write_str("edge"),
        }
    }
}

/// Common surface of vertices and edges.
///
/// `fetch` routes a query to the storage method serving this element family, which
/// lets a source stage be generic over the element type it streams.
pub trait GraphElement: Clone + fmt::Debug + 'static {
    const KIND: ElementKind;

    fn id(&self) -> ElementId;

    fn label(&self) -> &str;

    fn properties(&self) -> &BTreeMap<String, PropertyValue>;

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties().get(key)
    }

    fn fetch(
        storage: &dyn GraphStorage,
        query: &GraphQuery,
    ) -> Result<ElementStream<Self>, StorageError>;
}
