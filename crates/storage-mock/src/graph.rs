use graphpipe_core::{
    Edge, ElementStream, GraphElement, GraphQuery, GraphStorage, StorageError, StorageErrorKind,
    Vertex,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared between a mock storage and the streams it hands out.
#[derive(Debug, Default)]
pub struct FetchStats {
    fetches: AtomicUsize,
    pulled: AtomicUsize,
}

impl FetchStats {
    /// Number of `vertices`/`edges` calls served.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Number of stream items handed to consumers, errors included.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::Relaxed)
    }

    pub(crate) fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_pull(&self) {
        self.pulled.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Clone, Debug)]
pub struct MockGraph {
    name: Arc<str>,
    vertices: Arc<[Vertex]>,
    edges: Arc<[Edge]>,
    fail_after: Option<usize>,
    stats: Arc<FetchStats>,
}

impl MockGraph {
    pub fn new(vertices: Vec<Vertex>, edges: Vec<Edge>) -> Self {
        Self {
            name: Arc::from("mock"),
            vertices: vertices.into(),
            edges: edges.into(),
            fail_after: None,
            stats: Arc::new(FetchStats::default()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Makes every stream yield a `CommunicationFailure` after `count` elements.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn vertex_list(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge_list(&self) -> &[Edge] {
        &self.edges
    }

    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    fn stream<T: GraphElement>(&self, items: &Arc<[T]>, query: &GraphQuery) -> ElementStream<T> {
        self.stats.record_fetch();
        tracing::debug!(
            storage = %self.name,
            kind = %T::KIND,
            unconstrained = query.is_unconstrained(),
            "mock fetch"
        );
        Box::new(ElementCursor {
            items: Arc::clone(items),
            position: 0,
            emitted: 0,
            query: query.clone(),
            fail_after: self.fail_after,
            failed: false,
            stats: Arc::clone(&self.stats),
        })
    }
}

impl GraphStorage for MockGraph {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertices(&self, query: &GraphQuery) -> Result<ElementStream<Vertex>, StorageError> {
        Ok(self.stream(&self.vertices, query))
    }

    fn edges(&self, query: &GraphQuery) -> Result<ElementStream<Edge>, StorageError> {
        Ok(self.stream(&self.edges, query))
    }
}

// Scans the shared element slice lazily; nothing is copied until it is pulled.
struct ElementCursor<T> {
    items: Arc<[T]>,
    position: usize,
    emitted: usize,
    query: GraphQuery,
    fail_after: Option<usize>,
    failed: bool,
    stats: Arc<FetchStats>,
}

impl<T: GraphElement> Iterator for ElementCursor<T> {
    type Item = Result<T, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.query.max_results().is_some_and(|limit| self.emitted >= limit) {
            return None;
        }
        if self.fail_after.is_some_and(|limit| self.emitted >= limit) {
            self.failed = true;
            self.stats.record_pull();
            return Some(Err(StorageError::new(
                StorageErrorKind::CommunicationFailure,
                format!("mock storage failed after {} elements", self.emitted),
            )));
        }
        while let Some(candidate) = self.items.get(self.position) {
            self.position += 1;
            if self.query.matches(candidate) {
                self.emitted += 1;
                self.stats.record_pull();
                return Some(Ok(candidate.clone()));
            }
        }
        None
    }
}
