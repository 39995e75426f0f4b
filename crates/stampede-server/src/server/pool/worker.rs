use tokio::sync::{mpsc, oneshot};

use super::fetch::Fetch;
use crate::server::telemetry::increment_request_errors;

/// Worker task consuming one lane of a traffic job.
///
/// The worker takes URLs off its lane in FIFO order and issues one GET per
/// URL through the injected [`Fetch`] implementation. Fetch errors are logged
/// and swallowed; execution proceeds to the next URL without retry.
///
/// When the lane is closed and fully drained, the worker acknowledges on its
/// completion channel and terminates. A worker never touches any lane other
/// than its own.
///
/// # Arguments
///
/// - `worker_id`: Lane index within the pool (used for logs).
/// - `lane`: Receiver for the URLs assigned to this lane.
/// - `fetcher`: Transport used to execute each URL.
/// - `done`: Acknowledgement channel signalled exactly once, after drain.
pub async fn worker_loop<F: Fetch>(
    worker_id: usize,
    mut lane: mpsc::Receiver<String>,
    fetcher: F,
    done: oneshot::Sender<()>,
) {
    tracing::trace!(worker_id, "worker started");

    while let Some(url) = lane.recv().await {
        tracing::debug!(worker_id, %url, "requesting");
        match fetcher.fetch(&url).await {
            Ok(()) => tracing::debug!(worker_id, %url, "request finished"),
            Err(e) => {
                increment_request_errors();
                tracing::warn!(worker_id, %url, error = %e, "request failed");
            }
        }
    }

    if done.send(()).is_err() {
        tracing::error!(worker_id, "worker failed to acknowledge drain");
    }

    tracing::trace!(worker_id, "worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::pool::testing::RecordingFetcher;

    /// Fails every fetch.
    #[derive(Clone)]
    struct FailingFetcher;

    impl Fetch for FailingFetcher {
        type Error = String;

        fn fetch(
            &self,
            _url: &str,
        ) -> impl Future<Output = core::result::Result<(), Self::Error>> + Send {
            async { Err("connection refused".to_string()) }
        }
    }

    #[tokio::test]
    async fn consumes_lane_in_order_then_acks() {
        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();
        let fetcher = RecordingFetcher::default();

        let handle = tokio::spawn(worker_loop(0, rx, fetcher.clone(), done_tx));
        for url in ["a", "b", "c"] {
            tx.send(url.to_string()).await.unwrap();
        }
        drop(tx);

        done_rx.await.expect("worker must ack drain");
        handle.await.unwrap();
        assert_eq!(fetcher.seen(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn swallows_fetch_errors_and_still_acks() {
        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        let handle = tokio::spawn(worker_loop(0, rx, FailingFetcher, done_tx));
        tx.send("http://unreachable.invalid".to_string())
            .await
            .unwrap();
        tx.send("http://also-unreachable.invalid".to_string())
            .await
            .unwrap();
        drop(tx);

        // Both failures are swallowed; the drain ack still arrives.
        done_rx.await.expect("worker must ack drain despite errors");
        handle.await.unwrap();
    }
}
