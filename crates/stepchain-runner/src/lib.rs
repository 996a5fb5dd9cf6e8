//! Run composed step pipelines inside a transactional scope.
//!
//! The [`Runner`] opens a scope through a [`TransactionManager`], runs the
//! pipeline, commits or rolls back depending on its [`Outcome`], and only
//! then reports the result through a success or failure [`Callback`].
//!
//! [`Outcome`]: stepchain_compose::Outcome

mod callback;
mod config;
mod error;
mod memory;
mod runner;
mod transaction;

pub use callback::Callback;
pub use config::{NestingMode, RunnerConfig};
pub use error::{ConfigError, RunError, ScopeError, StoreError};
pub use memory::MemoryStore;
pub use runner::Runner;
pub use transaction::{Decision, TransactionManager};
