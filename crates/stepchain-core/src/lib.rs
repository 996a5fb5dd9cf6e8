//! Outcome type and step helpers for stepchain pipelines.
//!
//! Every step in a pipeline reports an [`Outcome`]: either a success value
//! that flows on to the next step, or a tagged failure that stops the
//! pipeline. Faults that are not expressed as failures are reported as
//! [`StepFault`] and are never recovered here.

mod fault;
mod helpers;
mod outcome;

pub use fault::{BoxError, StepFault};
pub use helpers::{fail, failure, succeed, success};
pub use outcome::{Outcome, is_failure, is_success, to_failure};
