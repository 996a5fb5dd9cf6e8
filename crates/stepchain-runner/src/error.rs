use std::fmt::Debug;
use std::path::PathBuf;

use stepchain_core::StepFault;
use thiserror::Error;

/// Error from opening, running or closing a transactional scope.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScopeError<E: Debug> {
    /// The block faulted; the scope was rolled back before returning.
    #[error(transparent)]
    Fault(#[from] StepFault),

    /// The transactional store itself failed.
    #[error("transactional store failed")]
    Store(#[source] E),
}

/// Error from [`Runner::call`](crate::Runner::call).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError<E: Debug> {
    /// The failure callback does not take exactly one argument.
    #[error("failure callback must accept exactly one argument, it accepts {arity}")]
    FailureCallbackArity {
        /// Number of arguments the supplied callback accepts.
        arity: usize,
    },

    /// A step faulted instead of returning a failure.
    #[error("pipeline faulted")]
    Fault(#[source] StepFault),

    /// The transactional store failed.
    #[error("transactional store failed")]
    Store(#[source] E),
}

impl<E: Debug> From<ScopeError<E>> for RunError<E> {
    fn from(error: ScopeError<E>) -> Self {
        match error {
            ScopeError::Fault(fault) => Self::Fault(fault),
            ScopeError::Store(error) => Self::Store(error),
        }
    }
}

/// Error from the in-memory store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A write was attempted outside of any transactional scope.
    #[error("cannot write '{key}' outside of a transaction")]
    NoActiveScope {
        /// Key that was being written.
        key: String,
    },

    /// A joined inner scope rolled back, so the enclosing scope cannot commit.
    #[error("transaction was marked rollback-only by a nested scope and was rolled back")]
    RollbackOnly,
}

/// Error loading a [`RunnerConfig`](crate::RunnerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at '{path}'")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML parse error")]
    Parse(#[from] toml::de::Error),
}
