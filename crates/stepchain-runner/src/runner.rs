use stepchain_compose::{Entry, Outcome, StepFault, StepOutcome, compose};
use tracing::{debug, debug_span};

use crate::callback::Callback;
use crate::config::RunnerConfig;
use crate::error::RunError;
use crate::transaction::{Decision, TransactionManager};

/// Runs pipelines inside a transactional scope and reports the result
/// through exactly one of two callbacks.
///
/// A success commits the scope and then calls `success`. A failure rolls
/// the scope back and then calls `failure` with the unwrapped payload.
/// Callbacks never run while the scope is still open.
#[derive(Debug)]
pub struct Runner<M> {
    manager: M,
    config: RunnerConfig,
}

impl<M> Runner<M>
where
    M: TransactionManager,
{
    #[must_use]
    pub fn new(manager: M) -> Self {
        Self::with_config(manager, RunnerConfig::default())
    }

    #[must_use]
    pub const fn with_config(manager: M, config: RunnerConfig) -> Self {
        Self { manager, config }
    }

    #[must_use]
    pub const fn manager(&self) -> &M {
        &self.manager
    }

    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run `pipeline` inside a scope and dispatch its result.
    ///
    /// `failure` must take the failure payload; this is checked before the
    /// scope is opened. `success` may take the result or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::FailureCallbackArity`] without running anything
    /// if `failure` takes no argument, [`RunError::Fault`] if the pipeline
    /// faulted (neither callback runs), or [`RunError::Store`] if the store
    /// failed or refused to commit (neither callback runs).
    pub fn call<F>(
        &self,
        pipeline: F,
        failure: Callback,
        success: Callback,
    ) -> Result<(), RunError<M::Error>>
    where
        F: FnOnce() -> Result<StepOutcome, StepFault>,
    {
        let _span = debug_span!("run", label = self.config.label()).entered();

        if failure.arity() != 1 {
            return Err(RunError::FailureCallbackArity {
                arity: failure.arity(),
            });
        }

        let outcome = self.manager.within(|| {
            let outcome = pipeline()?;
            Ok(if outcome.is_failure() {
                Decision::Rollback(outcome)
            } else {
                Decision::Commit(outcome)
            })
        })?;

        match outcome {
            Outcome::Failure(payload) => {
                if self.config.log_payloads() {
                    debug!(%payload, "pipeline failed, scope rolled back");
                } else {
                    debug!("pipeline failed, scope rolled back");
                }
                failure.invoke(payload);
            }
            Outcome::Success(value) => {
                debug!("pipeline succeeded, scope committed");
                success.invoke(value);
            }
        }
        Ok(())
    }

    /// Compose `entries` and [`call`](Self::call) the resulting pipeline.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub fn call_each<I>(
        &self,
        entries: I,
        failure: Callback,
        success: Callback,
    ) -> Result<(), RunError<M::Error>>
    where
        I: IntoIterator,
        I::Item: Into<Entry>,
    {
        let composed = compose(entries);
        debug!(steps = ?composed.step_names(), "running composed pipeline");
        self.call(|| composed.call0(), failure, success)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use stepchain_compose::{Step, Value, failure, success};

    use super::*;
    use crate::memory::MemoryStore;

    type Messages = Rc<RefCell<Vec<String>>>;

    fn recorder(messages: &Messages) -> Callback {
        let messages = Rc::clone(messages);
        Callback::with_value(move |value| messages.borrow_mut().push(value.to_string()))
    }

    #[test]
    fn success_calls_success_with_the_result() -> anyhow::Result<()> {
        let messages = Messages::default();
        let runner = Runner::new(MemoryStore::default());

        runner.call(
            || Ok(success(Value::from("success"))),
            recorder(&messages),
            recorder(&messages),
        )?;

        assert_eq!(*messages.borrow(), [r#""success""#]);
        assert_eq!(runner.manager().commits(), 1);
        Ok(())
    }

    #[test]
    fn no_arg_success_callback_is_supported() -> anyhow::Result<()> {
        let messages = Messages::default();
        let runner = Runner::new(MemoryStore::default());
        let success_no_arg = {
            let messages = Rc::clone(&messages);
            Callback::no_args(move || messages.borrow_mut().push("success_no_arg".to_string()))
        };

        runner.call(
            || Ok(success(Value::from("success"))),
            recorder(&messages),
            success_no_arg,
        )?;

        assert_eq!(*messages.borrow(), ["success_no_arg"]);
        Ok(())
    }

    #[test]
    fn failure_calls_failure_with_the_payload_after_rollback() -> anyhow::Result<()> {
        let messages = Messages::default();
        let store = MemoryStore::default();
        let runner = Runner::new(&store);
        let on_failure = {
            let messages = Rc::clone(&messages);
            let store = store.clone();
            Callback::with_value(move |value| {
                messages
                    .borrow_mut()
                    .push(format!("{value} at depth {}", store.depth()));
            })
        };

        runner.call(
            || Ok(failure(Value::from("failed"))),
            on_failure,
            recorder(&messages),
        )?;

        assert_eq!(*messages.borrow(), [r#""failed" at depth 0"#]);
        assert_eq!(store.rollbacks(), 1);
        Ok(())
    }

    #[test]
    fn nullary_failure_callback_is_rejected_before_running() {
        let ran = Rc::new(RefCell::new(false));
        let runner = Runner::new(MemoryStore::default());
        let pipeline = {
            let ran = Rc::clone(&ran);
            move || {
                *ran.borrow_mut() = true;
                Ok(failure(Value::from("failed")))
            }
        };

        let result = runner.call(pipeline, Callback::no_args(|| {}), Callback::no_args(|| {}));

        assert!(matches!(
            result,
            Err(RunError::FailureCallbackArity { arity: 0 })
        ));
        assert!(!*ran.borrow());
        assert_eq!(runner.manager().depth(), 0);
        assert_eq!(runner.manager().commits() + runner.manager().rollbacks(), 0);
    }

    #[test]
    fn call_each_composes_before_running() -> anyhow::Result<()> {
        let messages = Messages::default();
        let runner = Runner::new(MemoryStore::default());

        runner.call_each(
            [
                Step::nullary("first", || Value::from(1_i64)),
                Step::unary("increment", |n: Value| {
                    Value::from(n.as_i64().unwrap_or_default() + 1)
                }),
            ],
            recorder(&messages),
            recorder(&messages),
        )?;

        assert_eq!(*messages.borrow(), ["2"]);
        Ok(())
    }
}
