use std::fmt;

use stepchain_core::{Outcome, StepFault};

use crate::step::{Arity, Step};
use crate::value::{StepOutcome, Value};

/// A step together with the arguments collected for it so far.
///
/// Arguments are supplied in one or more [`apply`](Self::apply) calls. Once
/// the step's arity is satisfied it fires; until then each application
/// yields a new `Partial` wrapped in a success.
#[derive(Clone)]
pub struct Partial {
    step: Step,
    args: Vec<Value>,
}

impl Partial {
    /// Wrap `step` with no arguments collected yet.
    #[must_use]
    pub const fn new(step: Step) -> Self {
        Self {
            step,
            args: Vec::new(),
        }
    }

    /// Name of the wrapped step.
    #[must_use]
    pub const fn step_name(&self) -> &'static str {
        self.step.name()
    }

    /// Arguments collected so far.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// How many more arguments the step needs, or `None` for variadic steps.
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        match self.step.arity() {
            Arity::Fixed(arity) => Some(arity.saturating_sub(self.args.len())),
            Arity::Variadic => None,
        }
    }

    /// Supply more arguments, firing the step once it has all it needs.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::Arity`] when more arguments are supplied than
    /// the step still needs, or any fault raised by the step itself.
    pub fn apply(&self, args: Vec<Value>) -> Result<StepOutcome, StepFault> {
        let supplied = args.len();
        let mut collected = self.args.clone();
        collected.extend(args);

        match self.step.arity() {
            Arity::Variadic => self.step.invoke(collected),
            Arity::Fixed(arity) if collected.len() == arity => self.step.invoke(collected),
            Arity::Fixed(arity) if collected.len() < arity => {
                Ok(Outcome::Success(Value::Partial(Self {
                    step: self.step.clone(),
                    args: collected,
                })))
            }
            Arity::Fixed(arity) => Err(StepFault::Arity {
                step: self.step.name().to_string(),
                expected: arity - self.args.len(),
                received: supplied,
            }),
        }
    }
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        self.step.same_body(&other.step) && self.args == other.args
    }
}

impl fmt::Debug for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partial")
            .field("step", &self.step.name())
            .field("args", &self.args)
            .field("remaining", &self.remaining())
            .finish()
    }
}
