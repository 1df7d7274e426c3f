use super::Pipe;
use crate::error::PipelineError;
use crate::holder::{Holder, StageLabel};
use crate::starts::{HolderIterator, Starts};

struct Seed<T> {
    values: Box<dyn Iterator<Item = T>>,
    track_history: bool,
}

/// Forwards its input unchanged.
///
/// A seeded identity reads externally supplied values instead of an upstream stage;
/// they are adapted into holders on the first pull, under the stage's label at that time.
pub struct IdentityPipe<T> {
    starts: Starts<T>,
    seed: Option<Seed<T>>,
}

impl<T: 'static> IdentityPipe<T> {
    pub fn new() -> Self {
        Self { starts: Starts::empty(), seed: None }
    }

    pub fn seeded<I>(values: I, track_history: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let seed = Seed { values: Box::new(values.into_iter()), track_history };
        Self { starts: Starts::empty(), seed: Some(seed) }
    }
}

impl<T: 'static> Default for IdentityPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Pipe<T, T> for IdentityPipe<T> {
    const NAME: &'static str = "IdentityPipe";

    fn add_starts(&mut self, starts: Starts<T>) {
        self.seed = None;
        self.starts = starts;
    }

    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<T>, PipelineError>> {
        if let Some(seed) = self.seed.take() {
            let values = HolderIterator::from_values(label.clone(), seed.values, seed.track_history);
            self.starts = Starts::new(values);
        }
        self.starts.pull()
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<T>> {
        Some(&mut self.starts)
    }

    fn passthrough(&self) -> Option<Starts<T>> {
        self.seed.is_none().then(|| self.starts.clone())
    }

    fn set_track_history(&mut self, on: bool) {
        match &mut self.seed {
            Some(seed) => seed.track_history = on,
            None => self.starts.track_history(on),
        }
    }
}
