use thiserror::Error;

/// Boxed error raised from inside a step body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A fault raised while running a step.
///
/// Faults are distinct from [`Outcome::Failure`](crate::Outcome::Failure):
/// they are never turned into failures and propagate to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepFault {
    /// A step was invoked with the wrong number of arguments.
    #[error("step '{step}' expects {expected} argument(s), received {received}")]
    Arity {
        /// Name of the step.
        step: String,
        /// Number of arguments the step still needed.
        expected: usize,
        /// Number of arguments supplied.
        received: usize,
    },

    /// A step body returned an error.
    #[error("step '{step}' raised an error")]
    Raised {
        /// Name of the step.
        step: String,
        /// The error returned by the step body.
        #[source]
        source: BoxError,
    },
}

impl StepFault {
    /// Name of the step that raised the fault.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::Arity { step, .. } | Self::Raised { step, .. } => step,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn arity_fault_describes_counts() {
        let fault = StepFault::Arity {
            step: "double".to_string(),
            expected: 1,
            received: 3,
        };

        assert_eq!(
            fault.to_string(),
            "step 'double' expects 1 argument(s), received 3"
        );
        assert_eq!(fault.step(), "double");
    }

    #[test]
    fn raised_fault_keeps_source() {
        let fault = StepFault::Raised {
            step: "persist".to_string(),
            source: Box::new(DiskFull),
        };

        assert_eq!(fault.to_string(), "step 'persist' raised an error");
        let source = fault.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk full"));
    }
}
