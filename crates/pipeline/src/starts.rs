//! Holder sequences: the input side of every stage.

use crate::error::PipelineError;
use crate::holder::{History, Holder, StageLabel};
use graphpipe_core::StorageError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A lazily produced sequence of holders with one element of lookahead.
///
/// `has_next` may compute and cache the next element; `next` hands out the cached
/// element before computing a new one. A pending error counts as a next element.
pub trait HolderIter<T> {
    fn has_next(&mut self) -> bool;

    fn next(&mut self) -> Result<Holder<T>, PipelineError>;

    /// Upstream handle a pass-through sequence forwards unchanged, if any.
    fn passthrough(&self) -> Option<Starts<T>> {
        None
    }

    fn track_history(&mut self, _on: bool) {}

    fn pull(&mut self) -> Option<Result<Holder<T>, PipelineError>> {
        if self.has_next() { Some(self.next()) } else { None }
    }
}

/// Shared handle to the sequence a stage reads from.
pub struct Starts<T> {
    inner: Rc<RefCell<dyn HolderIter<T>>>,
}

impl<T: 'static> Starts<T> {
    pub fn empty() -> Self {
        Self::new(NoStarts)
    }

    pub fn new(iter: impl HolderIter<T> + 'static) -> Self {
        Self { inner: Rc::new(RefCell::new(iter)) }
    }

    pub fn from_shared(inner: Rc<RefCell<dyn HolderIter<T>>>) -> Self {
        Self { inner }
    }

    pub fn has_next(&mut self) -> bool {
        self.inner.borrow_mut().has_next()
    }

    pub fn next(&mut self) -> Result<Holder<T>, PipelineError> {
        self.inner.borrow_mut().next()
    }

    pub fn pull(&mut self) -> Option<Result<Holder<T>, PipelineError>> {
        self.inner.borrow_mut().pull()
    }

    pub fn track_history(&mut self, on: bool) {
        self.inner.borrow_mut().track_history(on);
    }

    pub fn passthrough(&self) -> Option<Starts<T>> {
        self.inner.borrow().passthrough()
    }

    /// Whether this handle shares the allocation at `addr`.
    pub fn points_to(&self, addr: *const ()) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner), addr)
    }

    /// Bypasses a pass-through upstream. Returns `false` when the upstream is not one.
    pub fn splice(&mut self) -> bool {
        match self.passthrough() {
            Some(upstream) => {
                *self = upstream;
                true
            }
            None => false,
        }
    }
}

impl<T> Clone for Starts<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: 'static> Default for Starts<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Starts<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Starts").field("handle", &Rc::as_ptr(&self.inner).cast::<()>()).finish()
    }
}

struct NoStarts;

impl<T> HolderIter<T> for NoStarts {
    fn has_next(&mut self) -> bool {
        false
    }

    fn next(&mut self) -> Result<Holder<T>, PipelineError> {
        Err(PipelineError::Exhausted)
    }
}

type RawStream<T> = Box<dyn Iterator<Item = Result<T, StorageError>>>;

/// Adapts a raw element iterator into a holder sequence.
///
/// Produces exactly one holder per raw element, in order, and reads a raw element only
/// when asked whether another one exists. With history tracking on, each holder gets
/// a history step named after `label`, appended to `origin` when one is set.
pub struct HolderIterator<T> {
    label: StageLabel,
    raw: RawStream<T>,
    pending: Option<Result<T, StorageError>>,
    finished: bool,
    track_history: bool,
    origin: Option<History>,
}

impl<T: Clone + 'static> HolderIterator<T> {
    pub fn new(label: StageLabel, raw: RawStream<T>, track_history: bool) -> Self {
        Self { label, raw, pending: None, finished: false, track_history, origin: None }
    }

    pub fn from_values<I>(label: StageLabel, values: I, track_history: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Self::new(label, Box::new(values.into_iter().map(Ok)), track_history)
    }

    /// Continues the history of `parent` for every produced holder.
    #[must_use]
    pub fn with_origin(mut self, parent: Option<History>) -> Self {
        self.track_history = parent.is_some();
        self.origin = parent;
        self
    }

    fn wrap(&self, value: T) -> Holder<T> {
        if !self.track_history {
            return Holder::new(value);
        }
        let history = match &self.origin {
            Some(parent) => parent.extend(self.label.clone(), value.clone()),
            None => History::start(self.label.clone(), value.clone()),
        };
        Holder::tracked(value, history)
    }
}

impl<T: Clone + 'static> HolderIter<T> for HolderIterator<T> {
    fn has_next(&mut self) -> bool {
        if self.pending.is_none() && !self.finished {
            self.pending = self.raw.next();
            self.finished = self.pending.is_none();
        }
        self.pending.is_some()
    }

    fn next(&mut self) -> Result<Holder<T>, PipelineError> {
        self.has_next();
        let value = self.pending.take().ok_or(PipelineError::Exhausted)??;
        Ok(self.wrap(value))
    }

    fn track_history(&mut self, on: bool) {
        self.track_history = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphpipe_core::StorageErrorKind;
    use rstest::rstest;
    use std::cell::Cell;

    fn counted(limit: u32, pulls: &Rc<Cell<usize>>) -> RawStream<u32> {
        let pulls = Rc::clone(pulls);
        Box::new((0..limit).map(move |value| {
            pulls.set(pulls.get() + 1);
            Ok(value)
        }))
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    fn one_holder_per_element_in_order(#[case] count: u32) {
        let mut iter = HolderIterator::from_values(Rc::from("src"), 0..count, false);
        let mut seen = Vec::new();
        while let Some(holder) = iter.pull() {
            let holder = holder.unwrap();
            assert!(!holder.is_tracked());
            seen.push(holder.into_value());
        }
        assert_eq!(seen, (0..count).collect::<Vec<_>>());
        assert!(matches!(iter.next(), Err(PipelineError::Exhausted)));
    }

    #[rstest]
    fn has_next_reads_at_most_one_raw_element() {
        let pulls = Rc::new(Cell::new(0));
        let mut iter = HolderIterator::new(Rc::from("src"), counted(100, &pulls), false);
        assert_eq!(pulls.get(), 0);
        for _ in 0..4 {
            assert!(iter.has_next());
        }
        assert_eq!(pulls.get(), 1);
        assert_eq!(iter.next().unwrap().into_value(), 0);
        assert_eq!(iter.next().unwrap().into_value(), 1);
        assert_eq!(pulls.get(), 2);
    }

    #[rstest]
    fn tracking_records_source_step() {
        let mut iter = HolderIterator::from_values(Rc::from("src"), ["a"], false);
        iter.track_history(true);
        let holder = iter.next().unwrap();
        let path = holder.path();
        assert_eq!(path.labels().collect::<Vec<_>>(), ["src"]);
        assert_eq!(path.get::<&str>("src"), Some(&"a"));
    }

    #[rstest]
    fn origin_is_extended() {
        let parent = History::start(Rc::from("root"), 10_u32);
        let mut iter =
            HolderIterator::from_values(Rc::from("split"), [11_u32, 12], false).with_origin(Some(parent));
        iter.next().unwrap();
        let second = iter.next().unwrap();
        assert_eq!(second.path().values::<u32>().copied().collect::<Vec<_>>(), [10, 12]);
    }

    #[rstest]
    fn raw_errors_surface_in_order() {
        let raw: RawStream<u32> = Box::new(
            vec![Ok(1), Err(StorageError::simple(StorageErrorKind::CommunicationFailure)), Ok(2)]
                .into_iter(),
        );
        let mut iter = HolderIterator::new(Rc::from("src"), raw, false);
        assert_eq!(iter.next().unwrap().into_value(), 1);
        assert!(iter.has_next());
        assert!(matches!(iter.next(), Err(PipelineError::Storage(err)) if err.kind == StorageErrorKind::CommunicationFailure));
        assert_eq!(iter.next().unwrap().into_value(), 2);
        assert!(!iter.has_next());
    }

    #[rstest]
    fn empty_starts_cannot_be_spliced() {
        let mut plain: Starts<u32> = Starts::empty();
        assert!(!plain.splice());
        assert!(!plain.has_next());
    }
}
