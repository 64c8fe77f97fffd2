//! Stateful mock of the Unisphere REST API for PowerMax arrays.
//!
//! All array state lives in one [`ArrayState`] behind a single mutex. Every
//! handler takes the lock, consults the fault registry, then delegates to the
//! store, so concurrent test requests observe a serial history.

use common::version::ExecutionOption;
use common::{Job, JobStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

pub mod config;
pub mod error;
pub mod faults;
pub mod fixtures;
pub mod handlers;
pub mod iterator;
pub mod jobs;
pub mod server;
pub mod store;

pub use config::MockConfig;
pub use error::{MockError, MockResult};
pub use faults::{FaultKind, FaultRegistry, FaultValue};
pub use server::{build_router, MockServer};

use iterator::IteratorTable;
use jobs::JobEngine;
use store::Store;

/// Everything the single lock protects.
#[derive(Debug)]
pub struct ArrayState {
    pub store: Store,
    pub faults: FaultRegistry,
    pub jobs: JobEngine,
    pub iterators: IteratorTable,
}

/// Result of a mutating request that may have been handed to a job.
#[derive(Debug)]
pub enum Completion<T> {
    Done(T),
    Deferred(Job),
}

impl ArrayState {
    pub fn new(config: &MockConfig) -> Self {
        Self {
            store: Store::new(config),
            faults: FaultRegistry::new(),
            jobs: JobEngine::new(),
            iterators: IteratorTable::new(),
        }
    }

    /// Apply `mutation` directly, or behind a job when `execution` is
    /// asynchronous.
    ///
    /// With `JobFailedError` armed the job ends `FAILED` and the mutation is
    /// never applied.
    pub fn execute<T>(
        &mut self,
        symmetrix_id: &str,
        name: &str,
        resource_link: &str,
        execution: ExecutionOption,
        mutation: impl FnOnce(&mut Store) -> MockResult<T>,
    ) -> MockResult<Completion<T>> {
        if !execution.is_async() {
            return mutation(&mut self.store).map(Completion::Done);
        }

        let terminal = if self.faults.trigger(FaultKind::JobFailedError).is_some() {
            JobStatus::Failed
        } else {
            mutation(&mut self.store)?;
            JobStatus::Succeeded
        };
        let job = self.jobs.create(
            symmetrix_id,
            name,
            resource_link,
            JobStatus::Running,
            terminal,
        );
        Ok(Completion::Deferred(job))
    }
}

/// Shared handle to one mock array. Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct MockArray {
    state: Arc<Mutex<ArrayState>>,
    config: Arc<MockConfig>,
}

impl MockArray {
    pub fn new(config: MockConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ArrayState::new(&config))),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Take the state lock. A handler that panicked mid-request does not
    /// wedge the mock; the state it left behind is used as is.
    pub fn lock(&self) -> MutexGuard<'_, ArrayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Back to the seeded inventory with no faults, jobs or iterators.
    pub fn reset(&self) {
        *self.lock() = ArrayState::new(&self.config);
        info!("mock array state reset");
    }

    pub fn induce(&self, kind: FaultKind) {
        self.lock().faults.induce(kind);
    }

    pub fn clear_fault(&self, kind: FaultKind) {
        self.lock().faults.clear(kind);
    }

    pub fn set_reset_after_first(&self, enabled: bool) {
        self.lock().faults.set_reset_after_first(enabled);
    }
}

impl Default for MockArray {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronous_execution_applies_immediately() {
        let array = MockArray::default();
        let mut state = array.lock();
        let done = state
            .execute("000197900046", "create sg", "", ExecutionOption::Synchronous, |store| {
                store.add_storage_group("sg1", "SRP_1", "Diamond")
            })
            .unwrap();
        assert!(matches!(done, Completion::Done(())));
        assert!(state.store.storage_group("sg1").is_ok());
        assert!(state.jobs.is_empty());
    }

    #[test]
    fn asynchronous_execution_records_a_job() {
        let array = MockArray::default();
        let mut state = array.lock();
        let outcome = state
            .execute("000197900046", "create sg", "sg1", ExecutionOption::Asynchronous, |store| {
                store.add_storage_group("sg1", "SRP_1", "Diamond")
            })
            .unwrap();
        let Completion::Deferred(job) = outcome else {
            panic!("expected a job");
        };
        assert_eq!(job.status, JobStatus::Scheduled);
        assert!(state.store.storage_group("sg1").is_ok());
        assert_eq!(state.jobs.poll(&job.job_id).unwrap().status, JobStatus::Succeeded);
    }

    #[test]
    fn failed_job_skips_the_mutation() {
        let array = MockArray::default();
        array.induce(FaultKind::JobFailedError);
        let mut state = array.lock();
        let outcome = state
            .execute("000197900046", "create sg", "sg1", ExecutionOption::Asynchronous, |store| {
                store.add_storage_group("sg1", "SRP_1", "Diamond")
            })
            .unwrap();
        let Completion::Deferred(job) = outcome else {
            panic!("expected a job");
        };
        assert!(state.store.storage_group("sg1").is_err());
        assert_eq!(state.jobs.poll(&job.job_id).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn reset_restores_seed_and_clears_faults() {
        let array = MockArray::default();
        array.induce(FaultKind::GetVolumeError);
        array
            .lock()
            .store
            .add_storage_group("sg1", "SRP_1", "Diamond")
            .unwrap();

        array.reset();

        let state = array.lock();
        assert!(state.store.storage_group("sg1").is_err());
        assert!(!state.faults.is_armed(FaultKind::GetVolumeError));
    }
}
