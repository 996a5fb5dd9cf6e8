use std::fmt;
use std::rc::Rc;

use stepchain_core::{BoxError, Outcome, StepFault};
use tracing::debug;

use crate::value::{StepOutcome, Value};

/// Number of arguments a step consumes before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments. `Fixed(0)` is a pure side effect that
    /// never sees the value threaded through the pipeline.
    Fixed(usize),
    /// Any number of arguments, fired as soon as it is handed a value.
    Variadic,
}

impl Arity {
    /// Whether the step takes no arguments at all.
    #[must_use]
    pub const fn is_nullary(self) -> bool {
        matches!(self, Self::Fixed(0))
    }

    /// Whether the step can fire with exactly `count` arguments.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Fixed(expected) => expected == count,
            Self::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(count) => write!(f, "{count}"),
            Self::Variadic => f.write_str("variadic"),
        }
    }
}

/// Conversion from whatever a step body returns into a step result.
///
/// Plain values count as success. A `Result` error becomes a
/// [`StepFault::Raised`] that escapes the pipeline.
pub trait IntoStepResult {
    /// Convert into the result of the step called `step`.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::Raised`] when the body returned an error.
    fn into_step_result(self, step: &'static str) -> Result<StepOutcome, StepFault>;
}

impl<T> IntoStepResult for Outcome<T>
where
    T: Into<Value>,
{
    fn into_step_result(self, _step: &'static str) -> Result<StepOutcome, StepFault> {
        Ok(self.map(Into::into))
    }
}

impl IntoStepResult for Value {
    fn into_step_result(self, _step: &'static str) -> Result<StepOutcome, StepFault> {
        Ok(Outcome::Success(self))
    }
}

impl IntoStepResult for serde_json::Value {
    fn into_step_result(self, _step: &'static str) -> Result<StepOutcome, StepFault> {
        Ok(Outcome::Success(Value::Data(self)))
    }
}

impl IntoStepResult for () {
    fn into_step_result(self, _step: &'static str) -> Result<StepOutcome, StepFault> {
        Ok(Outcome::Success(Value::null()))
    }
}

impl<T, E> IntoStepResult for Result<T, E>
where
    T: IntoStepResult,
    E: Into<BoxError>,
{
    fn into_step_result(self, step: &'static str) -> Result<StepOutcome, StepFault> {
        match self {
            Ok(value) => value.into_step_result(step),
            Err(error) => Err(StepFault::Raised {
                step: step.to_string(),
                source: error.into(),
            }),
        }
    }
}

type Body = dyn Fn(Vec<Value>) -> Result<StepOutcome, StepFault>;

/// A named unit of work in a pipeline.
///
/// Steps are cheap to clone; clones share the same body.
#[derive(Clone)]
pub struct Step {
    name: &'static str,
    arity: Arity,
    body: Rc<Body>,
}

impl Step {
    /// A step that takes nothing from the pipeline.
    pub fn nullary<F, R>(name: &'static str, f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoStepResult,
    {
        Self::erased(name, Arity::Fixed(0), move |_| f().into_step_result(name))
    }

    /// A step that consumes the previous step's result.
    pub fn unary<F, R>(name: &'static str, f: F) -> Self
    where
        F: Fn(Value) -> R + 'static,
        R: IntoStepResult,
    {
        Self::erased(name, Arity::Fixed(1), move |args| {
            let [value] = exact::<1>(name, args)?;
            f(value).into_step_result(name)
        })
    }

    /// A step that needs one more argument after the previous result.
    pub fn binary<F, R>(name: &'static str, f: F) -> Self
    where
        F: Fn(Value, Value) -> R + 'static,
        R: IntoStepResult,
    {
        Self::erased(name, Arity::Fixed(2), move |args| {
            let [first, second] = exact::<2>(name, args)?;
            f(first, second).into_step_result(name)
        })
    }

    /// A step taking exactly `arity` arguments as a vector.
    pub fn fixed<F, R>(name: &'static str, arity: usize, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> R + 'static,
        R: IntoStepResult,
    {
        Self::erased(name, Arity::Fixed(arity), move |args| {
            f(args).into_step_result(name)
        })
    }

    /// A step accepting any number of arguments.
    pub fn variadic<F, R>(name: &'static str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> R + 'static,
        R: IntoStepResult,
    {
        Self::erased(name, Arity::Variadic, move |args| {
            f(args).into_step_result(name)
        })
    }

    pub(crate) fn erased<F>(name: &'static str, arity: Arity, body: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<StepOutcome, StepFault> + 'static,
    {
        Self {
            name,
            arity,
            body: Rc::new(body),
        }
    }

    /// Name used in logs and faults.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// How many arguments the step consumes.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.arity
    }

    /// Run the step with exactly the arguments it declares.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::Arity`] when `args` does not fit the step's
    /// arity, or whatever fault the body raises.
    pub fn invoke(&self, args: Vec<Value>) -> Result<StepOutcome, StepFault> {
        if !self.arity.accepts(args.len()) {
            return Err(StepFault::Arity {
                step: self.name.to_string(),
                expected: match self.arity {
                    Arity::Fixed(expected) => expected,
                    Arity::Variadic => args.len(),
                },
                received: args.len(),
            });
        }
        debug!(step = self.name, args = args.len(), "invoking step");
        (self.body)(args)
    }

    pub(crate) fn same_body(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

fn exact<const N: usize>(step: &'static str, args: Vec<Value>) -> Result<[Value; N], StepFault> {
    <[Value; N]>::try_from(args).map_err(|args| StepFault::Arity {
        step: step.to_string(),
        expected: N,
        received: args.len(),
    })
}
