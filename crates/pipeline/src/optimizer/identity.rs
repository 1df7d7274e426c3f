use super::{Optimizer, PipeChain, Trigger};
use crate::error::OptimizerError;

/// Removes identity stages whose downstream neighbour reads from them.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityOptimizer;

impl Optimizer for IdentityOptimizer {
    fn name(&self) -> &str {
        "IdentityOptimizer"
    }

    fn trigger(&self) -> Trigger {
        Trigger::PerAppend
    }

    fn optimize(&mut self, chain: &mut PipeChain) -> Result<(), OptimizerError> {
        let mut index = 0;
        while index + 1 < chain.len() {
            if chain.can_splice_out(index) {
                chain.splice_out(index)?;
            } else {
                index += 1;
            }
        }
        Ok(())
    }
}
