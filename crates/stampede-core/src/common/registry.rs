//! Process-wide traffic job registry.
//!
//! The [`TrafficRegistry`] is the only state in the system shared across
//! concurrently running jobs: an append-only job table plus the monotonic ID
//! counter. All access goes through one reader-writer lock so that concurrent
//! registrations and lookups can never race each other.
//!
//! The registry is constructed once at startup and handed to the API layer by
//! reference; it is not a global. Tests get a fresh registry each.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{JobId, JobSpec, TrafficJob};

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    jobs: Vec<Arc<TrafficJob>>,
}

/// Process-wide table of registered traffic jobs.
///
/// Registration assigns IDs in strictly increasing order: the (assign,
/// increment, append) sequence runs as one unit under the write lock, so no
/// two concurrent registrations can observe or produce the same ID, and the
/// table's insertion order always matches ID order.
#[derive(Debug, Default)]
pub struct TrafficRegistry {
    inner: RwLock<RegistryInner>,
}

impl TrafficRegistry {
    /// Creates an empty registry with the ID counter at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job, assigning it the next ID.
    ///
    /// The spec is expected to be validated already; registration itself
    /// cannot fail. Returns the registered job so the caller can read the
    /// assigned [`JobId`].
    pub fn register(&self, spec: JobSpec) -> Arc<TrafficJob> {
        let mut inner = self.inner.write();
        let id = JobId(inner.next_id);
        inner.next_id += 1;
        let job = Arc::new(TrafficJob::from_spec(id, spec));
        inner.jobs.push(Arc::clone(&job));
        job
    }

    /// Looks up a registered job by ID.
    ///
    /// Scans the table in insertion order and returns the first match, or
    /// `None` for an ID that was never assigned.
    pub fn lookup(&self, id: JobId) -> Option<Arc<TrafficJob>> {
        self.inner
            .read()
            .jobs
            .iter()
            .find(|job| job.id == id)
            .cloned()
    }

    /// Number of jobs registered so far.
    pub fn len(&self) -> usize {
        self.inner.read().jobs.len()
    }

    /// Whether no job has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::try_join_all;
    use std::collections::{BTreeMap, HashSet};

    const CONCURRENT_JOBS: usize = 256;

    fn spec() -> JobSpec {
        JobSpec {
            thread_count: 2,
            urls: vec!["http://localhost/ping".into()],
            iterations: 1,
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn assigns_sequential_ids() {
        let registry = TrafficRegistry::new();
        for expected in 0..4u64 {
            let job = registry.register(spec());
            assert_eq!(job.id, JobId(expected));
        }
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn lookup_returns_registered_job() {
        let registry = TrafficRegistry::new();
        let registered = registry.register(spec());
        let found = registry.lookup(registered.id).unwrap();
        assert_eq!(found.thread_count, 2);
        assert_eq!(found.id, registered.id);
    }

    #[test]
    fn lookup_misses_unknown_id() {
        let registry = TrafficRegistry::new();
        registry.register(spec());
        assert!(registry.lookup(JobId(999)).is_none());
    }

    #[test]
    fn jobs_are_immutable_after_registration() {
        let registry = TrafficRegistry::new();
        let job = registry.register(spec());
        registry.register(spec());
        // The first job's record is untouched by later registrations.
        assert_eq!(registry.lookup(job.id).unwrap().as_ref(), job.as_ref());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_registration_yields_unique_dense_ids() {
        let registry = Arc::new(TrafficRegistry::new());

        let handles = (0..CONCURRENT_JOBS).map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.register(spec()).id })
        });
        let ids = try_join_all(handles).await.unwrap();

        let unique: HashSet<JobId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), CONCURRENT_JOBS);
        // Exactly the dense set {0, ..., M-1}: monotonic allocation with no
        // gaps and no duplicates.
        for expected in 0..CONCURRENT_JOBS as u64 {
            assert!(unique.contains(&JobId(expected)));
        }
        assert_eq!(registry.len(), CONCURRENT_JOBS);
    }
}
