//! Compose a list of steps into one short-circuiting pipeline.
//!
//! Steps run in order. A step returning a failure stops the pipeline and
//! the failure becomes the pipeline's result. Otherwise each step's result
//! is threaded into the next step, which is curried so it may still wait
//! for more arguments. Nullary steps run for their effect alone.

mod composer;
mod list;
mod partial;
mod step;
mod value;

pub use composer::{Composed, call_each, compose};
pub use list::{Entry, StepList, flatten};
pub use partial::Partial;
pub use step::{Arity, IntoStepResult, Step};
pub use stepchain_core::{
    Outcome, StepFault, fail, failure, is_failure, is_success, succeed, success, to_failure,
};
pub use value::{StepOutcome, Value};
