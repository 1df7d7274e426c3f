//! Deterministic in-memory graph storage for testing the pipeline kernel.
//!
//! [`MockGraph`] serves a fixed element set (by default the six-vertex "modern" toy
//! graph embedded in `assets/modern.xml`) and records how many elements each fetch
//! actually handed out, so tests can assert that consumers stream instead of draining.
//! [`SyntheticGraph`] fabricates vertices on demand for graphs far larger than memory.

mod fixture;
mod graph;
mod synthetic;

pub use fixture::MockGraphLoadError;
pub use graph::{FetchStats, MockGraph};
pub use synthetic::SyntheticGraph;

#[cfg(test)]
mod tests;
