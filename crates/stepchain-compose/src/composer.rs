use std::fmt;
use std::rc::Rc;

use stepchain_core::{Outcome, StepFault};
use tracing::debug;

use crate::list::{Entry, flatten};
use crate::partial::Partial;
use crate::step::{Arity, Step};
use crate::value::{StepOutcome, Value};

type Pipeline = Rc<dyn Fn(Vec<Value>) -> Result<StepOutcome, StepFault>>;

/// A pipeline produced by [`compose`].
///
/// The arguments given to [`call`](Self::call) go to the first step only.
/// Every later step either ignores the pipeline (nullary steps) or is
/// curried with the previous step's result.
#[derive(Clone)]
pub struct Composed {
    names: Vec<&'static str>,
    arity: Arity,
    run: Pipeline,
}

impl Composed {
    /// Run the pipeline, handing `args` to the first step.
    ///
    /// # Errors
    ///
    /// Returns a [`StepFault`] if any step faults or the first step is
    /// called with the wrong number of arguments. Failures are not faults;
    /// they come back as `Ok(Outcome::Failure(..))`.
    pub fn call(&self, args: Vec<Value>) -> Result<StepOutcome, StepFault> {
        (self.run)(args)
    }

    /// Run the pipeline without arguments.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn call0(&self) -> Result<StepOutcome, StepFault> {
        self.call(Vec::new())
    }

    /// Arity of the whole pipeline, taken from its first step.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.arity
    }

    /// Names of the composed steps, in execution order.
    #[must_use]
    pub fn step_names(&self) -> &[&'static str] {
        &self.names
    }

    /// Number of composed steps after flattening.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Wrap the pipeline as a single step so it can be nested in another.
    #[must_use]
    pub fn into_step(self, name: &'static str) -> Step {
        let arity = self.arity;
        Step::erased(name, arity, move |args| self.call(args))
    }
}

impl fmt::Debug for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composed")
            .field("steps", &self.names)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Fold a list of steps into a single pipeline.
///
/// Groups are flattened one level and placeholders dropped. The resulting
/// pipeline stops at the first failure and returns it unchanged. After a
/// success, a nullary step is simply run, while any other step is
/// partially applied with the previous result: it fires once it has all
/// its arguments and otherwise becomes a [`Partial`] value.
///
/// An empty list yields a pipeline that always succeeds with `true`.
pub fn compose<I>(entries: I) -> Composed
where
    I: IntoIterator,
    I::Item: Into<Entry>,
{
    let steps = flatten(entries.into_iter().map(Into::into));
    let names: Vec<&'static str> = steps.iter().map(Step::name).collect();

    let mut steps = steps.into_iter();
    let Some(first) = steps.next() else {
        debug!("composing empty step list");
        return Composed {
            names,
            arity: Arity::Fixed(0),
            run: Rc::new(succeed_with_true),
        };
    };

    let arity = first.arity();
    let seed: Pipeline = Rc::new(move |args| first.invoke(args));
    let run = steps
        .enumerate()
        .fold(seed, |composed, (offset, next)| -> Pipeline {
            let index = offset + 1;
            Rc::new(move |args| {
                let last_return = composed(args)?;
                if last_return.is_failure() {
                    debug!(step = next.name(), index, "skipping step after failure");
                    return Ok(last_return);
                }
                thread(&next, last_return.into_payload())
            })
        });

    debug!(steps = names.len(), "composed step list");
    Composed { names, arity, run }
}

/// Compose `entries` and run the pipeline without arguments.
///
/// # Errors
///
/// Returns any [`StepFault`] raised by a step.
pub fn call_each<I>(entries: I) -> Result<StepOutcome, StepFault>
where
    I: IntoIterator,
    I::Item: Into<Entry>,
{
    compose(entries).call0()
}

fn succeed_with_true(_args: Vec<Value>) -> Result<StepOutcome, StepFault> {
    Ok(Outcome::Success(Value::from(true)))
}

fn thread(step: &Step, last_return: Value) -> Result<StepOutcome, StepFault> {
    if step.arity().is_nullary() {
        step.invoke(Vec::new())
    } else {
        Partial::new(step.clone()).apply(vec![last_return])
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;
    use stepchain_core::failure;

    use super::*;
    use crate::list::StepList;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn logging(log: &Log, name: &'static str, value: &'static str) -> Step {
        let log = Rc::clone(log);
        Step::nullary(name, move || {
            log.borrow_mut().push(name);
            Value::from(value)
        })
    }

    #[test]
    fn runs_steps_in_order_and_returns_the_last_result() -> anyhow::Result<()> {
        let log = Log::default();
        let list = StepList::new()
            .step(logging(&log, "a", "first"))
            .group([
                Some(logging(&log, "b", "group[0]")),
                None,
                Some(logging(&log, "c", "group[1]")),
            ])
            .step(logging(&log, "d", "last"));

        let outcome = compose(list).call0()?;

        assert_eq!(*log.borrow(), ["a", "b", "c", "d"]);
        assert_eq!(outcome, Outcome::Success(Value::from("last")));
        Ok(())
    }

    #[test]
    fn stops_at_the_first_failure() -> anyhow::Result<()> {
        let log = Log::default();
        let failing = {
            let log = Rc::clone(&log);
            Step::nullary("b", move || {
                log.borrow_mut().push("b");
                failure("error")
            })
        };

        let outcome = call_each([
            logging(&log, "a", "first"),
            failing,
            logging(&log, "c", "last"),
        ])?;

        assert_eq!(*log.borrow(), ["a", "b"]);
        assert_eq!(outcome, Outcome::Failure(Value::from("error")));
        Ok(())
    }

    #[test]
    fn empty_list_succeeds_with_true() -> anyhow::Result<()> {
        let composed = compose(vec![
            Entry::Group(Vec::new()),
            Entry::Group(vec![None]),
            Entry::Skip,
        ]);

        assert!(composed.is_empty());
        assert_eq!(composed.arity(), Arity::Fixed(0));
        assert_eq!(composed.call0()?, Outcome::Success(Value::from(true)));
        Ok(())
    }

    #[test]
    fn threads_values_between_steps() -> anyhow::Result<()> {
        let outcome = call_each([
            Step::nullary("seed", || json!(123)),
            Step::unary("double", |n: Value| json!(n.as_i64().unwrap_or_default() * 2)),
            Step::variadic("increment_all", |ns: Vec<Value>| {
                ns.iter()
                    .map(|n| json!(n.as_i64().unwrap_or_default() + 1))
                    .collect::<serde_json::Value>()
            }),
        ])?;

        assert_eq!(outcome.into_payload(), json!([247]));
        Ok(())
    }

    #[test]
    fn curries_steps_needing_more_than_one_argument() -> anyhow::Result<()> {
        let composed = compose([
            Step::unary("double", |n: Value| json!(n.as_i64().unwrap_or_default() * 2)),
            Step::binary("shift", |n: Value, z: Value| {
                json!([
                    n.as_i64().unwrap_or_default() + 1,
                    z.as_i64().unwrap_or_default() - 1
                ])
            }),
        ]);

        let outcome = composed.call(vec![Value::from(111_i64)])?;
        let Some(partial) = outcome.into_payload().into_partial() else {
            anyhow::bail!("expected the pipeline to return a partial application");
        };

        let finished = partial.apply(vec![Value::from(111_i64)])?;
        assert_eq!(finished.into_payload(), json!([223, 110]));
        Ok(())
    }

    #[test]
    fn first_step_is_called_with_the_pipeline_arguments() {
        let composed = compose([Step::nullary("takes_nothing", || ())]);

        let fault = composed
            .call(vec![Value::null()])
            .expect_err("nullary first step rejects arguments");

        assert!(matches!(fault, StepFault::Arity { expected: 0, received: 1, .. }));
    }

    #[test]
    fn nullary_steps_ignore_the_previous_result() -> anyhow::Result<()> {
        let effects = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let effects = Rc::clone(&effects);
            Step::unary("sink", move |n: Value| effects.borrow_mut().push(n.to_string()))
        };
        let email = {
            let effects = Rc::clone(&effects);
            Step::nullary("send_email", move || effects.borrow_mut().push("Sent Email".to_string()))
        };

        let outcome = call_each(vec![
            Entry::from(vec![
                Step::nullary("seed", || json!(123)),
                Step::unary("double", |n: Value| json!(n.as_i64().unwrap_or_default() * 2)),
                sink,
            ]),
            Entry::from(Step::nullary("ignored", || json!("ignored"))),
            Entry::from(email),
            Entry::from(Step::nullary("result", || json!("result"))),
        ])?;

        assert_eq!(outcome.into_payload(), json!("result"));
        assert_eq!(*effects.borrow(), ["246", "Sent Email"]);
        Ok(())
    }

    #[test]
    fn step_faults_propagate_and_stop_the_pipeline() {
        let log = Log::default();
        let raising = Step::nullary("raise", || -> Result<(), std::io::Error> {
            Err(std::io::Error::other("disk"))
        });

        let result = call_each([raising, logging(&log, "after", "never")]);

        assert!(matches!(result, Err(StepFault::Raised { ref step, .. }) if step == "raise"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn composed_pipeline_nests_as_a_step() -> anyhow::Result<()> {
        let inner = compose([
            Step::unary("double", |n: Value| json!(n.as_i64().unwrap_or_default() * 2)),
            Step::unary("add_one", |n: Value| json!(n.as_i64().unwrap_or_default() + 1)),
        ]);
        assert_eq!(inner.step_names(), ["double", "add_one"]);

        let outcome = call_each([
            Step::nullary("seed", || json!(20)),
            inner.into_step("double_then_add_one"),
        ])?;

        assert_eq!(outcome.into_payload(), json!(41));
        Ok(())
    }
}
