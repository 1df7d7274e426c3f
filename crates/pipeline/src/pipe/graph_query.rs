use super::Pipe;
use crate::error::PipelineError;
use crate::holder::{Holder, StageLabel};
use crate::starts::{HolderIter, HolderIterator, Starts};
use graphpipe_core::{GraphElement, GraphQuery, GraphStorage};
use std::sync::Arc;

/// Source stage streaming vertices or edges from graph storage.
///
/// The fetch is issued on the first pull, never while the pipeline is being built.
/// Upstream input is accepted but not read: a source restarts the stream.
pub struct GraphQueryPipe<S, G> {
    storage: Arc<dyn GraphStorage>,
    query: GraphQuery,
    track_history: bool,
    results: Option<HolderIterator<G>>,
    starts: Starts<S>,
}

impl<S: 'static, G: GraphElement> GraphQueryPipe<S, G> {
    pub fn new(storage: Arc<dyn GraphStorage>, query: GraphQuery) -> Self {
        Self { storage, query, track_history: false, results: None, starts: Starts::empty() }
    }

    #[must_use]
    pub fn tracking(mut self, on: bool) -> Self {
        self.track_history = on;
        self
    }

    pub fn query(&self) -> &GraphQuery {
        &self.query
    }
}

impl<S: 'static, G: GraphElement> Pipe<S, G> for GraphQueryPipe<S, G> {
    const NAME: &'static str = "GraphQueryPipe";

    fn add_starts(&mut self, starts: Starts<S>) {
        self.starts = starts;
    }

    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<G>, PipelineError>> {
        if self.results.is_none() {
            tracing::trace!(kind = %G::KIND, storage = self.storage.name(), "opening storage stream");
            match G::fetch(self.storage.as_ref(), &self.query) {
                Ok(stream) => {
                    self.results = Some(HolderIterator::new(label.clone(), stream, self.track_history));
                }
                Err(err) => {
                    self.results = Some(HolderIterator::from_values(label.clone(), None, false));
                    return Some(Err(err.into()));
                }
            }
        }
        self.results.as_mut()?.pull()
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<S>> {
        Some(&mut self.starts)
    }

    fn set_track_history(&mut self, on: bool) {
        self.track_history = on;
        if let Some(results) = &mut self.results {
            results.track_history(on);
        }
    }
}
