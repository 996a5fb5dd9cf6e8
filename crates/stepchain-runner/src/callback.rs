use std::fmt;

use stepchain_compose::Value;

/// A callback handed to [`Runner::call`](crate::Runner::call).
///
/// The two shapes are explicit so the runner can check, before any work
/// starts, that the failure callback can receive the failure payload.
pub enum Callback {
    /// Takes no arguments.
    NoArgs(Box<dyn FnOnce()>),
    /// Takes the pipeline's result (or failure payload).
    WithValue(Box<dyn FnOnce(Value)>),
}

impl Callback {
    pub fn no_args<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self::NoArgs(Box::new(f))
    }

    pub fn with_value<F>(f: F) -> Self
    where
        F: FnOnce(Value) + 'static,
    {
        Self::WithValue(Box::new(f))
    }

    /// Number of arguments the callback accepts.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::NoArgs(_) => 0,
            Self::WithValue(_) => 1,
        }
    }

    /// Call with `value`, dropping it if the callback takes no arguments.
    pub(crate) fn invoke(self, value: Value) {
        match self {
            Self::NoArgs(f) => f(),
            Self::WithValue(f) => f(value),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}
