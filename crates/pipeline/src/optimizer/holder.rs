use super::{Optimizer, PipeChain, Trigger};
use crate::error::OptimizerError;

/// Switches history tracking on when some stage needs element paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct HolderOptimizer;

impl Optimizer for HolderOptimizer {
    fn name(&self) -> &str {
        "HolderOptimizer"
    }

    fn trigger(&self) -> Trigger {
        Trigger::PreIteration
    }

    fn optimize(&mut self, chain: &mut PipeChain) -> Result<(), OptimizerError> {
        if let Some(stage) = chain.iter().find(|stage| stage.requires_history()) {
            tracing::debug!(stage = %stage, "enabling history tracking");
            for stage in chain.iter() {
                stage.set_track_history(true);
            }
        }
        Ok(())
    }
}
