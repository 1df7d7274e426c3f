mod options;
mod variables;

pub use options::PipelineOptions;
pub use variables::Variables;

use crate::error::PipelineError;
use crate::holder::{Holder, Path};
use crate::optimizer::{HolderOptimizer, IdentityOptimizer, Optimizer, PipeChain, StageHandle, Trigger};
use crate::pipe::{
    FilterPipe, FlatMapPipe, GraphQueryPipe, IdentityPipe, MapPipe, PathPipe, Pipe, SideEffectPipe, Stage,
    StageCell,
};
use crate::starts::{HolderIter, Starts};
use graphpipe_core::{Edge, ElementId, GraphElement, GraphQuery, GraphStorage, Vertex};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latch {
    Pending,
    Done,
    Poisoned,
}

/// An ordered chain of lazy stages producing values of type `E`.
///
/// Building a pipeline never touches its input: every appended stage is wired onto the
/// previous tail and nothing is pulled until [`has_next`](Self::has_next) or
/// [`next`](Self::next) is called on the pipeline. Each pull on the tail recursively
/// pulls upstream, one element at a time, so taking `k` results reads roughly `k`
/// elements from the source no matter how large it is.
///
/// # Optimizers
///
/// Registered [`Optimizer`]s rewrite the stage chain. `PerAppend` optimizers run after
/// every [`append`](Self::append); `PreIteration` optimizers run exactly once, right
/// before the first element is requested. [`Pipeline::bound`] registers
/// [`IdentityOptimizer`] and [`HolderOptimizer`].
///
/// # Example
///
/// ```
/// use graphpipe::Pipeline;
///
/// let doubled: Vec<u32> = Pipeline::of(1..=3_u32)
///     .map(|value| value * 2)?
///     .to_list()?;
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # Ok::<(), graphpipe::PipelineError>(())
/// ```
pub struct Pipeline<E = ()> {
    chain: PipeChain,
    tail: Option<Starts<E>>,
    optimizers: Vec<Box<dyn Optimizer>>,
    latch: Latch,
    variables: Variables,
    storage: Option<Arc<dyn GraphStorage>>,
    options: PipelineOptions,
}

impl Pipeline<()> {
    /// A pipeline without storage and without optimizers.
    pub fn unbound() -> Self {
        Self::build(None, PipelineOptions::default().with_default_optimizers(false))
    }

    pub fn unbound_with_options(options: PipelineOptions) -> Self {
        Self::build(None, options)
    }

    /// A pipeline reading from `storage`, with the default optimizers registered.
    pub fn bound(storage: Arc<dyn GraphStorage>) -> Self {
        Self::build(Some(storage), PipelineOptions::default())
    }

    pub fn bound_with_options(storage: Arc<dyn GraphStorage>, options: PipelineOptions) -> Self {
        Self::build(Some(storage), options)
    }

    fn build(storage: Option<Arc<dyn GraphStorage>>, options: PipelineOptions) -> Self {
        let mut optimizers: Vec<Box<dyn Optimizer>> = Vec::new();
        if options.default_optimizers() {
            optimizers.push(Box::new(IdentityOptimizer));
            optimizers.push(Box::new(HolderOptimizer));
        }
        Self {
            chain: PipeChain::default(),
            tail: None,
            optimizers,
            latch: Latch::Pending,
            variables: Variables::default(),
            storage,
            options,
        }
    }
}

impl<T: Clone + 'static> Pipeline<T> {
    /// Wraps `values` as a single identity stage of an unbound pipeline.
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Pipeline::unbound().push(IdentityPipe::seeded(values, false))
    }
}

impl<E: 'static> Pipeline<E> {
    /// Appends `pipe`, wiring it onto the current tail.
    ///
    /// The `PerAppend` optimizers run on the extended chain before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Optimizer`] if a `PerAppend` optimizer fails. The
    /// pipeline is consumed either way, so a failed append leaves nothing to continue.
    pub fn append<P, E2>(self, mut pipe: P) -> Result<Pipeline<E2>, PipelineError>
    where
        P: Pipe<E, E2>,
        E2: 'static,
    {
        if let Some(tail) = &self.tail {
            pipe.add_starts(tail.clone());
        }
        let mut pipeline = self.push(pipe);
        pipeline.run_optimizers(Trigger::PerAppend)?;
        Ok(pipeline)
    }

    /// Starts a new stream from externally supplied values.
    ///
    /// Storage, variables and optimizers carry over; earlier stages stay in the chain but
    /// are no longer read from.
    ///
    /// # Errors
    ///
    /// Fails like [`append`](Self::append).
    pub fn inject<T, I>(self, values: I) -> Result<Pipeline<T>, PipelineError>
    where
        T: Clone + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let track_history = self.options.track_history();
        let mut pipeline = self.push(IdentityPipe::seeded(values, track_history));
        pipeline.run_optimizers(Trigger::PerAppend)?;
        Ok(pipeline)
    }

    /// Streams every vertex of the bound storage.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PreconditionViolation`] when the pipeline is unbound.
    pub fn vertices(self) -> Result<Pipeline<Vertex>, PipelineError> {
        self.source(GraphQuery::new())
    }

    /// Streams every edge of the bound storage.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PreconditionViolation`] when the pipeline is unbound.
    pub fn edges(self) -> Result<Pipeline<Edge>, PipelineError> {
        self.source(GraphQuery::new())
    }

    /// Streams the vertices with the given ids, in storage order.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PreconditionViolation`] when the pipeline is unbound.
    pub fn vertices_by_id<I>(self, ids: I) -> Result<Pipeline<Vertex>, PipelineError>
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        self.source(GraphQuery::new().ids(ids))
    }

    /// Streams the edges with the given ids, in storage order.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PreconditionViolation`] when the pipeline is unbound.
    pub fn edges_by_id<I>(self, ids: I) -> Result<Pipeline<Edge>, PipelineError>
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        self.source(GraphQuery::new().ids(ids))
    }

    /// Appends a storage source for an arbitrary query.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PreconditionViolation`] when the pipeline is unbound.
    pub fn source<G: GraphElement>(self, query: GraphQuery) -> Result<Pipeline<G>, PipelineError> {
        let Some(storage) = self.storage.clone() else {
            return Err(PipelineError::PreconditionViolation(format!(
                "{} source requires a pipeline bound to graph storage",
                G::KIND
            )));
        };
        let pipe = GraphQueryPipe::new(storage, query).tracking(self.options.track_history());
        self.append(pipe)
    }

    pub fn identity(self) -> Result<Pipeline<E>, PipelineError>
    where
        E: Clone,
    {
        self.append(IdentityPipe::new())
    }

    pub fn map<E2, F>(self, function: F) -> Result<Pipeline<E2>, PipelineError>
    where
        E2: Clone + 'static,
        F: FnMut(&E) -> E2 + 'static,
    {
        self.append(MapPipe::new(function))
    }

    pub fn filter<F>(self, predicate: F) -> Result<Pipeline<E>, PipelineError>
    where
        F: FnMut(&E) -> bool + 'static,
    {
        self.append(FilterPipe::new(predicate))
    }

    pub fn flat_map<E2, I, F>(self, function: F) -> Result<Pipeline<E2>, PipelineError>
    where
        E2: Clone + 'static,
        I: IntoIterator<Item = E2>,
        I::IntoIter: 'static,
        F: FnMut(&E) -> I + 'static,
    {
        self.append(FlatMapPipe::new(function))
    }

    pub fn side_effect<F>(self, action: F) -> Result<Pipeline<E>, PipelineError>
    where
        F: FnMut(&E) + 'static,
    {
        self.append(SideEffectPipe::new(action))
    }

    /// Emits the recorded path of each element. Requires history tracking, which the
    /// holder optimizer switches on.
    pub fn path(self) -> Result<Pipeline<Path>, PipelineError> {
        self.append(PathPipe::new())
    }

    /// Renames the tail stage; path steps can then be looked up under `label`.
    #[must_use]
    pub fn as_label(self, label: &str) -> Self {
        if let Some(stage) = self.chain.tail() {
            stage.set_label(Rc::from(label));
        }
        self
    }

    /// Whether another element is available.
    ///
    /// The first call on a pipeline runs the `PreIteration` optimizers.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Optimizer`] if the pre-iteration pass fails, and
    /// [`PipelineError::Poisoned`] on every later call.
    pub fn has_next(&mut self) -> Result<bool, PipelineError> {
        self.prepare()?;
        Ok(self.tail.as_mut().is_some_and(Starts::has_next))
    }

    /// The next element.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Exhausted`] when nothing is left, errors raised by stages or the
    /// storage, and the pre-iteration failures described for [`has_next`](Self::has_next).
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<E, PipelineError> {
        self.next_holder().map(Holder::into_value)
    }

    /// Like [`next`](Self::next), keeping the holder with its history.
    ///
    /// # Errors
    ///
    /// The same as [`next`](Self::next).
    pub fn next_holder(&mut self) -> Result<Holder<E>, PipelineError> {
        self.prepare()?;
        self.tail.as_mut().ok_or(PipelineError::Exhausted)?.next()
    }

    /// Borrowing iterator over the remaining elements; stops after the first error.
    pub fn iter(&mut self) -> PipelineIter<'_, E> {
        PipelineIter { pipeline: self, failed: false }
    }

    /// Drains the remaining elements.
    ///
    /// # Errors
    ///
    /// The first error encountered while pulling.
    pub fn to_list(mut self) -> Result<Vec<E>, PipelineError> {
        self.iter().collect()
    }

    pub fn register_optimizer(&mut self, optimizer: impl Optimizer + 'static) {
        self.optimizers.push(Box::new(optimizer));
    }

    pub fn set_variable<T: Any>(&mut self, name: impl Into<String>, value: T) {
        self.variables.set(name, value);
    }

    pub fn variable<T: Any>(&self, name: &str) -> Option<&T> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn pipes(&self) -> &PipeChain {
        &self.chain
    }

    pub fn storage(&self) -> Option<&Arc<dyn GraphStorage>> {
        self.storage.as_ref()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Makes `pipe` the new tail without wiring it.
    fn push<S, P, E2>(self, pipe: P) -> Pipeline<E2>
    where
        P: Pipe<S, E2>,
        S: 'static,
        E2: 'static,
    {
        let Pipeline { mut chain, optimizers, latch, variables, storage, options, .. } = self;
        let cell = Rc::new(RefCell::new(StageCell::new(pipe)));
        let typed: Rc<RefCell<dyn HolderIter<E2>>> = cell.clone();
        let untyped: Rc<RefCell<dyn Stage>> = cell;
        chain.push(StageHandle::new(untyped));
        tracing::trace!(stage = P::NAME, position = chain.len() - 1, "appended stage");
        Pipeline {
            chain,
            tail: Some(Starts::from_shared(typed)),
            optimizers,
            latch,
            variables,
            storage,
            options,
        }
    }

    fn run_optimizers(&mut self, trigger: Trigger) -> Result<(), PipelineError> {
        for optimizer in self.optimizers.iter_mut().filter(|optimizer| optimizer.trigger() == trigger) {
            tracing::trace!(optimizer = optimizer.name(), %trigger, stages = self.chain.len(), "running optimizer");
            optimizer.optimize(&mut self.chain).map_err(|source| PipelineError::Optimizer {
                optimizer: optimizer.name().to_owned(),
                trigger,
                source,
            })?;
        }
        Ok(())
    }

    fn prepare(&mut self) -> Result<(), PipelineError> {
        match self.latch {
            Latch::Done => Ok(()),
            Latch::Poisoned => Err(PipelineError::Poisoned),
            Latch::Pending => {
                self.latch = Latch::Done;
                tracing::debug!(stages = self.chain.len(), pipeline = %self.chain, "pre-iteration pass");
                if let Err(err) = self.run_optimizers(Trigger::PreIteration) {
                    self.latch = Latch::Poisoned;
                    return Err(err);
                }
                Ok(())
            }
        }
    }
}

impl<E> fmt::Display for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.chain, f)
    }
}

impl<E> fmt::Debug for Pipeline<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.chain.labels())
            .field("optimizers", &self.optimizers.iter().map(|optimizer| optimizer.name()).collect::<Vec<_>>())
            .field("latch", &self.latch)
            .field("variables", &self.variables)
            .field("storage", &self.storage.as_ref().map(|storage| storage.name()))
            .finish()
    }
}

/// Iterator returned by [`Pipeline::iter`].
pub struct PipelineIter<'a, E> {
    pipeline: &'a mut Pipeline<E>,
    failed: bool,
}

impl<E: 'static> Iterator for PipelineIter<'_, E> {
    type Item = Result<E, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        pull(self.pipeline, &mut self.failed)
    }
}

/// Owning iterator over a pipeline's elements; stops after the first error.
pub struct PipelineIntoIter<E> {
    pipeline: Pipeline<E>,
    failed: bool,
}

impl<E: 'static> Iterator for PipelineIntoIter<E> {
    type Item = Result<E, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        pull(&mut self.pipeline, &mut self.failed)
    }
}

impl<E: 'static> IntoIterator for Pipeline<E> {
    type Item = Result<E, PipelineError>;
    type IntoIter = PipelineIntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        PipelineIntoIter { pipeline: self, failed: false }
    }
}

fn pull<E: 'static>(pipeline: &mut Pipeline<E>, failed: &mut bool) -> Option<Result<E, PipelineError>> {
    if *failed {
        return None;
    }
    let item = match pipeline.has_next() {
        Ok(false) => return None,
        Ok(true) => pipeline.next(),
        Err(err) => Err(err),
    };
    *failed = item.is_err();
    Some(item)
}
