use super::{GraphQuery, StorageError};
use crate::element::{Edge, Vertex};

/// Owned, lazily evaluated stream of elements returned by a storage fetch.
///
/// Items are pulled one at a time; a backend is free to keep a cursor open until the
/// stream is dropped.
pub type ElementStream<T> = Box<dyn Iterator<Item = Result<T, StorageError>>>;

/// Graph data source queried by storage-backed source stages.
///
/// Implementations must return elements in a stable native order and must not read
/// ahead further than the consumer pulls. Fetching by id returns matches in native
/// order, not in the order the ids were given.
pub trait GraphStorage {
    fn name(&self) -> &str;

    fn vertices(&self, query: &GraphQuery) -> Result<ElementStream<Vertex>, StorageError>;

    fn edges(&self, query: &GraphQuery) -> Result<ElementStream<Edge>, StorageError>;
}
