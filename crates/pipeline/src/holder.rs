//! Element wrappers carrying optional provenance.

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Name of a stage as recorded in histories and paths.
pub type StageLabel = Rc<str>;

/// One element flowing between stages, plus the history of how it was produced.
///
/// The history is only present when tracking is switched on for the source that
/// produced the element; stages that derive new values extend it by one step.
#[derive(Clone, Debug)]
pub struct Holder<T> {
    value: T,
    origin: Option<History>,
}

impl<T> Holder<T> {
    pub fn new(value: T) -> Self {
        Self { value, origin: None }
    }

    pub fn tracked(value: T, origin: History) -> Self {
        Self { value, origin: Some(origin) }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn origin(&self) -> Option<&History> {
        self.origin.as_ref()
    }

    pub fn is_tracked(&self) -> bool {
        self.origin.is_some()
    }

    /// Steps recorded for this element, oldest first. Empty when untracked.
    pub fn path(&self) -> Path {
        self.origin.as_ref().map(History::to_path).unwrap_or_default()
    }

    /// Wraps a value computed from this holder by the stage `label`.
    pub fn derive<E: Clone + 'static>(&self, label: &StageLabel, value: E) -> Holder<E> {
        match &self.origin {
            Some(history) => {
                let origin = history.extend(label.clone(), value.clone());
                Holder::tracked(value, origin)
            }
            None => Holder::new(value),
        }
    }
}

struct Step {
    label: StageLabel,
    value: Rc<dyn Any>,
    parent: Option<Rc<Step>>,
    depth: usize,
}

/// Persistent list of produced values; siblings share their common prefix.
#[derive(Clone)]
pub struct History {
    head: Rc<Step>,
}

impl History {
    pub fn start<T: 'static>(label: StageLabel, value: T) -> Self {
        Self { head: Rc::new(Step { label, value: Rc::new(value), parent: None, depth: 1 }) }
    }

    #[must_use]
    pub fn extend<T: 'static>(&self, label: StageLabel, value: T) -> Self {
        let depth = self.head.depth + 1;
        Self {
            head: Rc::new(Step {
                label,
                value: Rc::new(value),
                parent: Some(Rc::clone(&self.head)),
                depth,
            }),
        }
    }

    /// Number of recorded steps, at least one.
    pub fn depth(&self) -> usize {
        self.head.depth
    }

    pub fn to_path(&self) -> Path {
        let mut steps: SmallVec<[PathStep; 8]> = SmallVec::with_capacity(self.depth());
        let mut cursor = Some(&self.head);
        while let Some(step) = cursor {
            steps.push(PathStep { label: step.label.clone(), value: Rc::clone(&step.value) });
            cursor = step.parent.as_ref();
        }
        steps.reverse();
        Path { steps }
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_path().labels()).finish()
    }
}

#[derive(Clone)]
pub struct PathStep {
    label: StageLabel,
    value: Rc<dyn Any>,
}

impl PathStep {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The recorded value, if it has type `T`.
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl fmt::Debug for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathStep").field(&self.label).finish()
    }
}

/// Flattened history of a single element.
#[derive(Clone, Default)]
pub struct Path {
    steps: SmallVec<[PathStep; 8]>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathStep> {
        self.steps.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(PathStep::label)
    }

    /// Value of the most recent step recorded under `label`.
    pub fn get<T: 'static>(&self, label: &str) -> Option<&T> {
        self.steps.iter().rev().find(|step| step.label() == label).and_then(PathStep::value)
    }

    /// All step values of type `T`, oldest first.
    pub fn values<T: 'static>(&self) -> impl Iterator<Item = &T> {
        self.steps.iter().filter_map(PathStep::value)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}
