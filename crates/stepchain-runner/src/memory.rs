use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use stepchain_core::StepFault;
use tracing::{debug, warn};

use crate::config::{NestingMode, RunnerConfig};
use crate::error::{ScopeError, StoreError};
use crate::transaction::{Decision, TransactionManager};

type Table = IndexMap<String, serde_json::Value>;

struct Frame {
    snapshot: Option<Table>,
    rollback_only: bool,
}

#[derive(Default)]
struct State {
    data: Table,
    frames: Vec<Frame>,
    commits: usize,
    rollbacks: usize,
}

/// In-memory transactional key/value store.
///
/// Clones share the same data, so steps can hold a handle and write while
/// a runner drives the scope. Writes are only accepted inside a scope.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<State>>,
    nesting: NestingMode,
}

impl MemoryStore {
    #[must_use]
    pub fn new(nesting: NestingMode) -> Self {
        Self {
            state: Rc::default(),
            nesting,
        }
    }

    /// Build a store nesting scopes the way `config` asks.
    #[must_use]
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.nesting())
    }

    #[must_use]
    pub const fn nesting(&self) -> NestingMode {
        self.nesting
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.state.borrow().data.get(key).cloned()
    }

    /// Write `value` under `key` in the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveScope`] when no scope is open.
    pub fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let key = key.into();
        let mut state = self.state.borrow_mut();
        if state.frames.is_empty() {
            return Err(StoreError::NoActiveScope { key });
        }
        state.data.insert(key, value.into());
        Ok(())
    }

    /// Remove `key` in the innermost open scope, returning its old value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveScope`] when no scope is open.
    pub fn remove(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let mut state = self.state.borrow_mut();
        if state.frames.is_empty() {
            return Err(StoreError::NoActiveScope {
                key: key.to_string(),
            });
        }
        Ok(state.data.shift_remove(key))
    }

    /// Copy of all committed and pending entries, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, serde_json::Value)> {
        self.state
            .borrow()
            .data
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Number of scopes currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.state.borrow().frames.len()
    }

    #[must_use]
    pub fn commits(&self) -> usize {
        self.state.borrow().commits
    }

    #[must_use]
    pub fn rollbacks(&self) -> usize {
        self.state.borrow().rollbacks
    }

    fn begin(&self) -> ScopeGuard<'_> {
        let mut state = self.state.borrow_mut();
        let snapshot = match self.nesting {
            NestingMode::Joined if !state.frames.is_empty() => None,
            NestingMode::Savepoint | NestingMode::Joined => Some(state.data.clone()),
        };
        state.frames.push(Frame {
            snapshot,
            rollback_only: false,
        });
        debug!(depth = state.frames.len(), "opened scope");
        ScopeGuard {
            store: self,
            resolved: false,
        }
    }

    fn commit(&self) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        let Some(frame) = state.frames.pop() else {
            return Ok(());
        };
        if frame.rollback_only {
            warn!("scope was marked rollback-only by a joined inner scope");
            Self::discard(&mut state, frame);
            return Err(StoreError::RollbackOnly);
        }
        state.commits += 1;
        debug!(depth = state.frames.len(), "committed scope");
        Ok(())
    }

    fn rollback(&self) {
        let mut state = self.state.borrow_mut();
        let Some(frame) = state.frames.pop() else {
            return;
        };
        Self::discard(&mut state, frame);
    }

    fn discard(state: &mut State, frame: Frame) {
        match frame.snapshot {
            Some(snapshot) => state.data = snapshot,
            None => {
                if let Some(outer) = state.frames.last_mut() {
                    outer.rollback_only = true;
                }
            }
        }
        state.rollbacks += 1;
        debug!(depth = state.frames.len(), "rolled back scope");
    }
}

impl TransactionManager for MemoryStore {
    type Error = StoreError;

    fn within<R, F>(&self, block: F) -> Result<R, ScopeError<Self::Error>>
    where
        F: FnOnce() -> Result<Decision<R>, StepFault>,
    {
        let scope = self.begin();
        match block() {
            Ok(Decision::Commit(value)) => {
                scope.commit().map_err(ScopeError::Store)?;
                Ok(value)
            }
            Ok(Decision::Rollback(value)) => {
                scope.rollback();
                Ok(value)
            }
            Err(fault) => {
                scope.rollback();
                Err(ScopeError::Fault(fault))
            }
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryStore")
            .field("nesting", &self.nesting)
            .field("entries", &state.data.len())
            .field("depth", &state.frames.len())
            .finish()
    }
}

/// Closes a scope exactly once, rolling back if dropped unresolved.
struct ScopeGuard<'a> {
    store: &'a MemoryStore,
    resolved: bool,
}

impl ScopeGuard<'_> {
    fn commit(mut self) -> Result<(), StoreError> {
        self.resolved = true;
        self.store.commit()
    }

    fn rollback(mut self) {
        self.resolved = true;
        self.store.rollback();
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.store.rollback();
        }
    }
}
