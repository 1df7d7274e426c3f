use super::Pipe;
use crate::error::PipelineError;
use crate::holder::{Holder, StageLabel};
use crate::starts::{HolderIter, HolderIterator, Starts};
use std::marker::PhantomData;

/// Emits one value per input, computed by `function`.
pub struct MapPipe<S, E, F> {
    starts: Starts<S>,
    function: F,
    _output: PhantomData<fn() -> E>,
}

impl<S, E, F> MapPipe<S, E, F>
where
    S: 'static,
    F: FnMut(&S) -> E,
{
    pub fn new(function: F) -> Self {
        Self { starts: Starts::empty(), function, _output: PhantomData }
    }
}

impl<S, E, F> Pipe<S, E> for MapPipe<S, E, F>
where
    S: 'static,
    E: Clone + 'static,
    F: FnMut(&S) -> E + 'static,
{
    const NAME: &'static str = "MapPipe";

    fn add_starts(&mut self, starts: Starts<S>) {
        self.starts = starts;
    }

    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<E>, PipelineError>> {
        let result = self.starts.pull()?.map(|holder| {
            let value = (self.function)(holder.get());
            holder.derive(label, value)
        });
        Some(result)
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<S>> {
        Some(&mut self.starts)
    }
}

/// Keeps the inputs `predicate` accepts.
pub struct FilterPipe<T, F> {
    starts: Starts<T>,
    predicate: F,
}

impl<T, F> FilterPipe<T, F>
where
    T: 'static,
    F: FnMut(&T) -> bool,
{
    pub fn new(predicate: F) -> Self {
        Self { starts: Starts::empty(), predicate }
    }
}

impl<T, F> Pipe<T, T> for FilterPipe<T, F>
where
    T: 'static,
    F: FnMut(&T) -> bool + 'static,
{
    const NAME: &'static str = "FilterPipe";

    fn add_starts(&mut self, starts: Starts<T>) {
        self.starts = starts;
    }

    fn process_next(&mut self, _label: &StageLabel) -> Option<Result<Holder<T>, PipelineError>> {
        loop {
            match self.starts.pull()? {
                Ok(holder) if !(self.predicate)(holder.get()) => {}
                other => return Some(other),
            }
        }
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<T>> {
        Some(&mut self.starts)
    }
}

/// Expands every input into zero or more outputs.
///
/// Only the expansion of the current input is held; it is drained lazily before the
/// next input is pulled.
pub struct FlatMapPipe<S, E, F> {
    starts: Starts<S>,
    function: F,
    current: Option<HolderIterator<E>>,
}

impl<S, E, I, F> FlatMapPipe<S, E, F>
where
    S: 'static,
    I: IntoIterator<Item = E>,
    F: FnMut(&S) -> I,
{
    pub fn new(function: F) -> Self {
        Self { starts: Starts::empty(), function, current: None }
    }
}

impl<S, E, I, F> Pipe<S, E> for FlatMapPipe<S, E, F>
where
    S: 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = E>,
    I::IntoIter: 'static,
    F: FnMut(&S) -> I + 'static,
{
    const NAME: &'static str = "FlatMapPipe";

    fn add_starts(&mut self, starts: Starts<S>) {
        self.starts = starts;
        self.current = None;
    }

    fn process_next(&mut self, label: &StageLabel) -> Option<Result<Holder<E>, PipelineError>> {
        loop {
            if let Some(item) = self.current.as_mut().and_then(HolderIter::pull) {
                return Some(item);
            }
            let holder = match self.starts.pull()? {
                Ok(holder) => holder,
                Err(err) => return Some(Err(err)),
            };
            let expansion = (self.function)(holder.get());
            self.current = Some(
                HolderIterator::from_values(label.clone(), expansion, false)
                    .with_origin(holder.origin().cloned()),
            );
        }
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<S>> {
        Some(&mut self.starts)
    }
}

/// Calls `action` for every input and forwards it unchanged.
pub struct SideEffectPipe<T, F> {
    starts: Starts<T>,
    action: F,
}

impl<T, F> SideEffectPipe<T, F>
where
    T: 'static,
    F: FnMut(&T),
{
    pub fn new(action: F) -> Self {
        Self { starts: Starts::empty(), action }
    }
}

impl<T, F> Pipe<T, T> for SideEffectPipe<T, F>
where
    T: 'static,
    F: FnMut(&T) + 'static,
{
    const NAME: &'static str = "SideEffectPipe";

    fn add_starts(&mut self, starts: Starts<T>) {
        self.starts = starts;
    }

    fn process_next(&mut self, _label: &StageLabel) -> Option<Result<Holder<T>, PipelineError>> {
        let result = self.starts.pull()?;
        if let Ok(holder) = &result {
            (self.action)(holder.get());
        }
        Some(result)
    }

    fn starts_mut(&mut self) -> Option<&mut Starts<T>> {
        Some(&mut self.starts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::StageCell;
    use rstest::rstest;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn source<T: Clone + 'static>(values: Vec<T>) -> Starts<T> {
        Starts::new(HolderIterator::from_values(Rc::from("seed"), values, false))
    }

    fn drain<T: 'static>(mut iter: impl HolderIter<T>) -> Vec<T> {
        std::iter::from_fn(|| iter.pull()).map(|holder| holder.unwrap().into_value()).collect()
    }

    #[rstest]
    fn map_transforms_each_value() {
        let mut stage = StageCell::new(MapPipe::new(|name: &&str| name.len()));
        stage.add_starts(source(vec!["marko", "josh"]));
        assert_eq!(drain(stage), [5, 4]);
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(vec![1, 3, 5], vec![])]
    #[case(vec![1, 2, 3, 4], vec![2, 4])]
    fn filter_keeps_matching(#[case] input: Vec<i32>, #[case] expected: Vec<i32>) {
        let mut stage = StageCell::new(FilterPipe::new(|value: &i32| value % 2 == 0));
        stage.add_starts(source(input));
        assert_eq!(drain(stage), expected);
    }

    #[rstest]
    fn flat_map_skips_empty_expansions() {
        let mut stage = StageCell::new(FlatMapPipe::new(|count: &usize| vec!['x'; *count]));
        stage.add_starts(source(vec![0, 2, 0, 1, 0]));
        assert_eq!(drain(stage), ['x', 'x', 'x']);
    }

    #[rstest]
    fn flat_map_pulls_upstream_lazily() {
        let pulls = Rc::new(Cell::new(0_usize));
        let counter = Rc::clone(&pulls);
        let upstream = (0_u64..).inspect(move |_| counter.set(counter.get() + 1));
        let mut stage = StageCell::new(FlatMapPipe::new(|value: &u64| [*value, *value]));
        stage.add_starts(Starts::new(HolderIterator::from_values(Rc::from("seed"), upstream, false)));

        let first: Vec<u64> =
            std::iter::from_fn(|| stage.pull()).take(3).map(|holder| holder.unwrap().into_value()).collect();
        assert_eq!(first, [0, 0, 1]);
        assert_eq!(pulls.get(), 2);
    }

    #[rstest]
    fn side_effect_observes_and_forwards() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut stage = StageCell::new(SideEffectPipe::new(move |value: &u8| sink.borrow_mut().push(*value)));
        stage.add_starts(source(vec![4, 5]));
        assert!(stage.has_next());
        assert_eq!(*seen.borrow(), [4]);
        assert_eq!(drain(stage), [4, 5]);
        assert_eq!(*seen.borrow(), [4, 5]);
    }
}
