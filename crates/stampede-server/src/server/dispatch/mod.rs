//! Traffic job dispatch.
//!
//! One dispatcher task owns one job's lifecycle: it registers the job, hands
//! the assigned ID back to the API handler through a oneshot channel, and
//! then, detached from the caller, feeds the job's iteration-expanded URL
//! stream through a [`LanePool`] and waits for the pool to drain.
//!
//! The ID handoff happens exactly once, before any URL is dispatched. After
//! the handoff the caller has no further view of the job: completion is
//! logged but not retained, and a job whose every request failed completes
//! exactly like one whose every request succeeded.

use std::sync::Arc;
use std::time::Instant;

use stampede_core::{JobId, JobSpec, Result, TrafficJob, TrafficRegistry};
use tokio::sync::oneshot;

use super::pool::{fetch::Fetch, manager::LanePool};
use super::telemetry::{
    decrement_jobs_inflight, increment_jobs_inflight, increment_urls_dispatched,
    record_job_duration,
};

/// Spawns the detached dispatcher task for one traffic job.
///
/// Returns the receiver for the one-shot ID handoff; the job itself keeps
/// running after the receiver resolves. The spec must already be validated;
/// registration itself cannot fail.
pub fn spawn<F: Fetch>(
    registry: Arc<TrafficRegistry>,
    spec: JobSpec,
    fetcher: F,
) -> oneshot::Receiver<JobId> {
    let (id_tx, id_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = run(&registry, spec, fetcher, id_tx).await {
            tracing::warn!(error = %e, "traffic job aborted");
        }
    });
    id_rx
}

/// Registers the job, performs the ID handoff, and executes the batch.
pub(crate) async fn run<F: Fetch>(
    registry: &TrafficRegistry,
    spec: JobSpec,
    fetcher: F,
    id_tx: oneshot::Sender<JobId>,
) -> Result<()> {
    let job = registry.register(spec);

    if id_tx.send(job.id).is_err() {
        // The submitter went away; the job still runs to completion.
        tracing::debug!(job_id = %job.id, "submitter dropped before the id handoff");
    }

    increment_jobs_inflight();
    let start = Instant::now();
    let result = execute(&job, fetcher).await;
    decrement_jobs_inflight();
    record_job_duration(start.elapsed().as_millis() as f64);

    match &result {
        Ok(()) => tracing::info!(
            job_id = %job.id,
            requests = job.urls.len() * job.iterations as usize,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "traffic job complete"
        ),
        Err(e) => tracing::warn!(job_id = %job.id, error = %e, "traffic job failed"),
    }
    result
}

async fn execute<F: Fetch>(job: &TrafficJob, fetcher: F) -> Result<()> {
    let mut pool = LanePool::spawn(job.thread_count, fetcher)?;
    tracing::info!(job_id = %job.id, workers = pool.size(), "dispatcher running");

    for _ in 0..job.iterations {
        for url in &job.urls {
            pool.dispatch(url.clone()).await?;
            increment_urls_dispatched(1);
        }
    }

    pool.drain().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::pool::testing::RecordingFetcher;
    use std::collections::BTreeMap;

    fn spec(thread_count: usize, urls: &[&str], iterations: u32) -> JobSpec {
        JobSpec {
            thread_count,
            urls: urls.iter().map(|u| u.to_string()).collect(),
            iterations,
            headers: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn iteration_expansion_preserves_submission_order() {
        let registry = TrafficRegistry::new();
        let fetcher = RecordingFetcher::default();
        let (id_tx, id_rx) = oneshot::channel();

        run(&registry, spec(1, &["a", "b"], 2), fetcher.clone(), id_tx)
            .await
            .unwrap();

        assert_eq!(id_rx.await.unwrap(), JobId(0));
        // One lane, so the global dispatch order is directly observable.
        assert_eq!(fetcher.seen(), vec!["a", "b", "a", "b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn executes_every_url_across_lanes() {
        let registry = TrafficRegistry::new();
        let fetcher = RecordingFetcher::default();
        let (id_tx, _id_rx) = oneshot::channel();

        run(
            &registry,
            spec(3, &["a", "b", "c", "d", "e"], 2),
            fetcher.clone(),
            id_tx,
        )
        .await
        .unwrap();

        let mut seen = fetcher.seen();
        seen.sort();
        assert_eq!(seen, vec!["a", "a", "b", "b", "c", "c", "d", "d", "e", "e"]);
    }

    #[tokio::test]
    async fn id_is_delivered_before_any_dispatch() {
        let registry = TrafficRegistry::new();
        let fetcher = RecordingFetcher::default();
        let (id_tx, mut id_rx) = oneshot::channel();

        // Empty URL list: the job registers, hands off its ID, and completes
        // without dispatching anything.
        run(&registry, spec(2, &[], 1), fetcher.clone(), id_tx)
            .await
            .unwrap();

        assert_eq!(id_rx.try_recv().unwrap(), JobId(0));
        assert!(fetcher.seen().is_empty());
        assert!(registry.lookup(JobId(0)).is_some());
    }

    #[tokio::test]
    async fn job_runs_even_if_submitter_drops_receiver() {
        let registry = TrafficRegistry::new();
        let fetcher = RecordingFetcher::default();
        let (id_tx, id_rx) = oneshot::channel();
        drop(id_rx);

        run(&registry, spec(1, &["a"], 1), fetcher.clone(), id_tx)
            .await
            .unwrap();

        assert_eq!(fetcher.seen(), vec!["a"]);
    }
}
