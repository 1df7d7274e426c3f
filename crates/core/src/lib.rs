//! Element model and storage contract shared by the graphpipe crates.
//!
//! The pipeline kernel only ever talks to a graph through [`storage::GraphStorage`];
//! everything in this crate describes that boundary.

pub mod element;
pub mod storage;

pub use element::{Edge, ElementId, ElementKind, GraphElement, PropertyValue, Vertex};
pub use storage::{ElementStream, GraphQuery, GraphStorage, StorageError, StorageErrorKind};
