use crate::optimizer::Trigger;
use graphpipe_core::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
    #[error("no more elements")]
    Exhausted,
    #[error("optimizer `{optimizer}` failed during {trigger} pass: {source}")]
    Optimizer { optimizer: String, trigger: Trigger, source: OptimizerError },
    #[error("pipeline unusable after a failed pre-iteration pass")]
    Poisoned,
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PipelineError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    #[error("{0}")]
    Failed(String),
}

impl OptimizerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Structural rewrite rejected by [`PipeChain`](crate::PipeChain).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("stage index {index} out of bounds for a chain of {len} stages")]
    OutOfBounds { index: usize, len: usize },
    #[error("stage {index} (`{label}`) is the tail and has no downstream neighbour")]
    TailStage { index: usize, label: String },
    #[error("stage {index} (`{label}`) is not pass-through")]
    NotPassthrough { index: usize, label: String },
    #[error("stage {index} (`{label}`) does not feed its downstream neighbour")]
    NotWired { index: usize, label: String },
}
