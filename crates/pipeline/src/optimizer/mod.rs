//! Rewrite passes over the stage chain.

mod holder;
mod identity;

pub use holder::HolderOptimizer;
pub use identity::IdentityOptimizer;

use crate::error::{OptimizerError, RewriteError};
use crate::pipe::Stage;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// When an optimizer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// After every successful append, in registration order.
    PerAppend,
    /// Once, on the first `has_next`/`next` of the pipeline.
    PreIteration,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::PerAppend => f.write_str("per-append"),
            Trigger::PreIteration => f.write_str("pre-iteration"),
        }
    }
}

pub trait Optimizer {
    fn name(&self) -> &str;

    fn trigger(&self) -> Trigger;

    fn optimize(&mut self, chain: &mut PipeChain) -> Result<(), OptimizerError>;
}

/// Untyped handle to one stage of a pipeline.
#[derive(Clone)]
pub struct StageHandle {
    stage: Rc<RefCell<dyn Stage>>,
}

impl StageHandle {
    pub(crate) fn new(stage: Rc<RefCell<dyn Stage>>) -> Self {
        Self { stage }
    }

    pub fn name(&self) -> &'static str {
        self.stage.borrow().name()
    }

    pub fn label(&self) -> String {
        self.stage.borrow().label().to_owned()
    }

    pub fn is_passthrough(&self) -> bool {
        self.stage.borrow().is_passthrough()
    }

    pub fn requires_history(&self) -> bool {
        self.stage.borrow().requires_history()
    }

    pub fn set_track_history(&self, on: bool) {
        self.stage.borrow_mut().set_track_history(on);
    }

    pub(crate) fn set_label(&self, label: Rc<str>) {
        self.stage.borrow_mut().set_label(label);
    }

    fn reads_from(&self, upstream: &StageHandle) -> bool {
        self.stage.borrow_mut().reads_from(Rc::as_ptr(&upstream.stage).cast::<()>())
    }

    fn splice_upstream(&self) -> bool {
        self.stage.borrow_mut().splice_upstream()
    }
}

impl fmt::Debug for StageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage.borrow();
        f.debug_struct("StageHandle").field("name", &stage.name()).field("label", &stage.label()).finish()
    }
}

impl fmt::Display for StageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stage.borrow().label())
    }
}

/// Ordered stage list of a pipeline, as handed to optimizers.
#[derive(Clone, Debug, Default)]
pub struct PipeChain {
    stages: Vec<StageHandle>,
}

impl PipeChain {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StageHandle> {
        self.stages.iter()
    }

    pub fn get(&self, index: usize) -> Option<&StageHandle> {
        self.stages.get(index)
    }

    pub fn tail(&self) -> Option<&StageHandle> {
        self.stages.last()
    }

    pub fn labels(&self) -> Vec<String> {
        self.stages.iter().map(StageHandle::label).collect()
    }

    /// Whether [`splice_out`](Self::splice_out) would succeed for `index`.
    pub fn can_splice_out(&self, index: usize) -> bool {
        match (self.stages.get(index), self.stages.get(index + 1)) {
            (Some(stage), Some(downstream)) => stage.is_passthrough() && downstream.reads_from(stage),
            _ => false,
        }
    }

    /// Removes the pass-through stage at `index`, rewiring its downstream neighbour
    /// onto its upstream.
    pub fn splice_out(&mut self, index: usize) -> Result<(), RewriteError> {
        let len = self.stages.len();
        let stage = self.stages.get(index).ok_or(RewriteError::OutOfBounds { index, len })?;
        let downstream = self
            .stages
            .get(index + 1)
            .ok_or_else(|| RewriteError::TailStage { index, label: stage.label() })?;
        if !stage.is_passthrough() {
            return Err(RewriteError::NotPassthrough { index, label: stage.label() });
        }
        if !downstream.reads_from(stage) || !downstream.splice_upstream() {
            return Err(RewriteError::NotWired { index, label: stage.label() });
        }
        let removed = self.stages.remove(index);
        tracing::debug!(index, stage = %removed, remaining = self.stages.len(), "spliced out stage");
        Ok(())
    }

    pub(crate) fn push(&mut self, stage: StageHandle) {
        self.stages.push(stage);
    }
}

impl<'a> IntoIterator for &'a PipeChain {
    type Item = &'a StageHandle;
    type IntoIter = std::slice::Iter<'a, StageHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

impl fmt::Display for PipeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{stage}")?;
        }
        f.write_str("]")
    }
}
