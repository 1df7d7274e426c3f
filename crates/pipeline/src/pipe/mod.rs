//! Stage contract and the operator set.

mod graph_query;
mod identity;
mod map;
mod path;

pub use graph_query::GraphQueryPipe;
pub use identity::IdentityPipe;
pub use map::{FilterPipe, FlatMapPipe, MapPipe, SideEffectPipe};
pub use path::PathPipe;

use crate::error::PipelineError;
use crate::holder::{Holder, StageLabel};
use crate::starts::{HolderIter, Starts};
use std::marker::PhantomData;
use std::rc::Rc;

/// One lazy transformation step from holders of `S` to holders of `E`.
///
/// Implementations only describe how to produce the next holder; lookahead caching and
/// the `has_next`/`next` protocol are provided by [`StageCell`].
pub trait Pipe<S: 'static, E>: 'static {
    /// Kind name, used as the default stage label.
    const NAME: &'static str;

    /// Installs or replaces the upstream sequence.
    fn add_starts(&mut self, starts: Starts<S>);

    /// Makes one attempt to produce a holder, pulling upstream as needed.
    ///
    /// `None` means the stage is exhausted; it must keep returning `None` afterwards.
    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<E>, PipelineError>>;

    fn starts_mut(&mut self) -> Option<&mut Starts<S>>;

    /// Upstream handle when this stage forwards its input unchanged.
    fn passthrough(&self) -> Option<Starts<E>> {
        None
    }

    fn requires_history(&self) -> bool {
        false
    }

    fn set_track_history(&mut self, on: bool) {
        if let Some(starts) = self.starts_mut() {
            starts.track_history(on);
        }
    }
}

/// Untyped view of a stage, as seen by optimizers.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn label(&self) -> &str;
    fn set_label(&mut self, label: StageLabel);
    /// True when the stage could be removed without changing the stream.
    fn is_passthrough(&self) -> bool;
    fn requires_history(&self) -> bool;
    fn set_track_history(&mut self, on: bool);
    /// Whether this stage's input is the stage allocated at `upstream`.
    fn reads_from(&mut self, upstream: *const ()) -> bool;
    /// Rewires this stage past a pass-through upstream.
    fn splice_upstream(&mut self) -> bool;
}

/// Wraps a [`Pipe`] with its label and a single cached lookahead element.
pub struct StageCell<P, S, E> {
    pipe: P,
    label: StageLabel,
    pending: Option<Result<Holder<E>, PipelineError>>,
    _input: PhantomData<fn(S)>,
}

impl<P, S, E> StageCell<P, S, E>
where
    P: Pipe<S, E>,
    S: 'static,
    E: 'static,
{
    pub fn new(pipe: P) -> Self {
        Self { pipe, label: Rc::from(P::NAME), pending: None, _input: PhantomData }
    }

    pub fn add_starts(&mut self, starts: Starts<S>) {
        self.pipe.add_starts(starts);
    }

    /// Turns the stage into a sequence another stage can read from.
    pub fn into_starts(self) -> Starts<E> {
        Starts::new(self)
    }
}

impl<P, S, E> HolderIter<E> for StageCell<P, S, E>
where
    P: Pipe<S, E>,
    S: 'static,
    E: 'static,
{
    fn has_next(&mut self) -> bool {
        if self.pending.is_none() {
            self.pending = self.pipe.process_next(&self.label);
        }
        self.pending.is_some()
    }

    fn next(&mut self) -> Result<Holder<E>, PipelineError> {
        match self.pending.take() {
            Some(result) => result,
            None => self.pipe.process_next(&self.label).unwrap_or(Err(PipelineError::Exhausted)),
        }
    }

    fn passthrough(&self) -> Option<Starts<E>> {
        if self.pending.is_some() { None } else { self.pipe.passthrough() }
    }

    fn track_history(&mut self, on: bool) {
        self.pipe.set_track_history(on);
    }
}

impl<P, S, E> Stage for StageCell<P, S, E>
where
    P: Pipe<S, E>,
    S: 'static,
    E: 'static,
{
    fn name(&self) -> &'static str {
        P::NAME
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: StageLabel) {
        self.label = label;
    }

    fn is_passthrough(&self) -> bool {
        HolderIter::passthrough(self).is_some()
    }

    fn requires_history(&self) -> bool {
        self.pipe.requires_history()
    }

    fn set_track_history(&mut self, on: bool) {
        self.pipe.set_track_history(on);
    }

    fn reads_from(&mut self, upstream: *const ()) -> bool {
        self.pipe.starts_mut().is_some_and(|starts| starts.points_to(upstream))
    }

    fn splice_upstream(&mut self) -> bool {
        self.pipe.starts_mut().is_some_and(Starts::splice)
    }
}
