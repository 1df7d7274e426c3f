use crate::graph::FetchStats;
use graphpipe_core::{Edge, ElementStream, GraphQuery, GraphStorage, StorageError, Vertex};
use std::sync::Arc;

/// A path graph `1 -> 2 -> ... -> n` whose elements are fabricated while being pulled.
///
/// Nothing is stored, so `n` may be far larger than memory; the shared [`FetchStats`]
/// tell how much of it a consumer actually touched.
#[derive(Clone, Debug)]
pub struct SyntheticGraph {
    size: u64,
    stats: Arc<FetchStats>,
}

impl SyntheticGraph {
    pub fn new(size: u64) -> Self {
        Self { size, stats: Arc::new(FetchStats::default()) }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    fn vertex(index: u64) -> Vertex {
        #[allow(clippy::cast_possible_wrap)]
        Vertex::new(index, "node").with_property("index", index as i64)
    }

    fn edge(index: u64) -> Edge {
        Edge::new(index, "next", index, index + 1)
    }

    /// Indices in `1..=last` a fetch has to fabricate, in ascending order.
    ///
    /// An id filter is answered from the ids themselves so it never scans the graph.
    fn indices(query: &GraphQuery, last: u64) -> Box<dyn Iterator<Item = u64>> {
        match query.id_filter() {
            Some(ids) => {
                let mut wanted: Vec<u64> = ids
                    .iter()
                    .map(|id| id.as_u64())
                    .filter(|index| (1..=last).contains(index))
                    .collect();
                wanted.sort_unstable();
                wanted.dedup();
                Box::new(wanted.into_iter())
            }
            None => Box::new(1..=last),
        }
    }
}

impl GraphStorage for SyntheticGraph {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn vertices(&self, query: &GraphQuery) -> Result<ElementStream<Vertex>, StorageError> {
        self.stats.record_fetch();
        tracing::debug!(size = self.size, "synthetic vertex fetch");
        let query = query.clone();
        let stats = Arc::clone(&self.stats);
        let limit = query.max_results().unwrap_or(usize::MAX);
        Ok(Box::new(
            Self::indices(&query, self.size)
                .map(Self::vertex)
                .filter(move |vertex| query.matches(vertex))
                .take(limit)
                .inspect(move |_| stats.record_pull())
                .map(Ok),
        ))
    }

    fn edges(&self, query: &GraphQuery) -> Result<ElementStream<Edge>, StorageError> {
        self.stats.record_fetch();
        tracing::debug!(size = self.size, "synthetic edge fetch");
        let query = query.clone();
        let stats = Arc::clone(&self.stats);
        let limit = query.max_results().unwrap_or(usize::MAX);
        Ok(Box::new(
            Self::indices(&query, self.size.saturating_sub(1))
                .map(Self::edge)
                .filter(move |edge| query.matches(edge))
                .take(limit)
                .inspect(move |_| stats.record_pull())
                .map(Ok),
        ))
    }
}
