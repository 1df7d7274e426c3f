mod error;
mod graph_storage;
mod query;

pub use error::{StorageError, StorageErrorKind};
pub use graph_storage::{ElementStream, GraphStorage};
pub use query::GraphQuery;
