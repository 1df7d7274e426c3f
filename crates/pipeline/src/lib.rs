//! Execution kernel for graph traversals.
//!
//! A [`Pipeline`] owns an ordered chain of lazy stages ([`Pipe`] implementations).
//! Every appended stage is wired onto the previous tail, and results are pulled from
//! the tail one at a time, so a chain streams over storage of any size while holding
//! at most one pending element per stage. [`Optimizer`]s rewrite the chain either after
//! every append ([`Trigger::PerAppend`]) or exactly once before the first result is
//! pulled ([`Trigger::PreIteration`]).
//!
//! Pipelines are single-threaded: stages are shared through `Rc<RefCell<_>>`, so a
//! pipeline is neither `Send` nor `Sync`.
//!
//! ```
//! use graphpipe::Pipeline;
//!
//! let mut names = Pipeline::of(vec!["marko", "vadas", "lop"])
//!     .filter(|name| name.len() > 3)?
//!     .map(|name| name.to_uppercase())?;
//! assert_eq!(names.next()?, "MARKO");
//! assert_eq!(names.next()?, "VADAS");
//! assert!(!names.has_next()?);
//! # Ok::<(), graphpipe::PipelineError>(())
//! ```

mod error;
pub mod holder;
pub mod optimizer;
pub mod pipe;
mod pipeline;
pub mod starts;

pub use error::{OptimizerError, PipelineError, RewriteError};
pub use holder::{History, Holder, Path, PathStep, StageLabel};
pub use optimizer::{HolderOptimizer, IdentityOptimizer, Optimizer, PipeChain, StageHandle, Trigger};
pub use pipe::{
    FilterPipe, FlatMapPipe, GraphQueryPipe, IdentityPipe, MapPipe, PathPipe, Pipe, SideEffectPipe,
    Stage, StageCell,
};
pub use pipeline::{Pipeline, PipelineIntoIter, PipelineIter, PipelineOptions, Variables};
pub use starts::{HolderIter, HolderIterator, Starts};

pub use graphpipe_core::{Edge, ElementId, GraphElement, GraphQuery, GraphStorage, Vertex};
