use stepchain_core::StepFault;

use crate::error::ScopeError;

/// How a transactional block wants its scope resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<R> {
    /// Keep every write made inside the scope.
    Commit(R),
    /// Discard every write made inside the scope.
    Rollback(R),
}

impl<R> Decision<R> {
    #[must_use]
    pub const fn is_rollback(&self) -> bool {
        matches!(self, Self::Rollback(_))
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        match self {
            Self::Commit(value) | Self::Rollback(value) => value,
        }
    }
}

/// A store able to run a block inside an atomic scope.
///
/// Implementations must always close the scope they open: a
/// [`Decision::Rollback`] discards the scope's writes without being
/// reported as an error, and a block that faults is rolled back before the
/// fault is returned. Nested calls open a nested scope according to the
/// store's own rules.
pub trait TransactionManager {
    /// Error raised by the store itself.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run `block` inside a new scope and resolve the scope as it decides.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::Fault`] if the block faulted, after rolling the
    /// scope back, or [`ScopeError::Store`] if the store failed.
    fn within<R, F>(&self, block: F) -> Result<R, ScopeError<Self::Error>>
    where
        F: FnOnce() -> Result<Decision<R>, StepFault>;
}

impl<T> TransactionManager for &T
where
    T: TransactionManager + ?Sized,
{
    type Error = T::Error;

    fn within<R, F>(&self, block: F) -> Result<R, ScopeError<Self::Error>>
    where
        F: FnOnce() -> Result<Decision<R>, StepFault>,
    {
        (**self).within(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_exposes_its_value() {
        assert_eq!(Decision::Commit(1).into_inner(), 1);
        assert_eq!(Decision::Rollback("x").into_inner(), "x");
        assert!(Decision::Rollback(()).is_rollback());
        assert!(!Decision::Commit(()).is_rollback());
    }
}
