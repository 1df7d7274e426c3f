use super::Pipe;
use crate::error::PipelineError;
use crate::holder::{Holder, Path, StageLabel};
use crate::starts::Starts;

/// Emits the recorded path of every input element.
pub struct PathPipe<T> {
    starts: Starts<T>,
}

impl<T: 'static> PathPipe<T> {
    pub fn new() -> Self {
        Self { starts: Starts::empty() }
    }
}

impl<T: 'static> Default for PathPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Pipe<T, Path> for PathPipe<T> {
    const NAME: &'static str = "PathPipe";

    fn add_starts(&mut self, starts: Starts<T>) {
        self.starts = starts;
    }

    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<Path>, PipelineError>> {
        let result = self.starts.pull()?.map(|holder| holder.derive(label, holder.path()));
        Some(result)
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<T>> {
        Some(&mut self.starts)
    }

    fn requires_history(&self) -> bool {
        true
    }
}
