//! Lane-based worker pool for traffic job execution.
//!
//! This module defines the [`LanePool`] struct, which owns a fixed set of
//! worker lanes for a single traffic job. It distributes URLs using strict
//! round-robin scheduling and detects completion through per-lane drain
//! acknowledgements.
//!
//! Each worker listens on its own bounded [`mpsc::Receiver`] and executes
//! fetches independently. Lanes never exchange work: the URL at global
//! position `k` always lands on lane `k mod N`, so the distribution is fully
//! deterministic for a given pool size.

use stampede_core::{Error, Result};
use tokio::sync::{mpsc, oneshot};

use super::{fetch::Fetch, worker::worker_loop};

/// A fixed pool of worker lanes executing one traffic job's URL stream.
///
/// URLs are dispatched round-robin and delivered exactly once; a lane whose
/// worker is momentarily slow exerts backpressure on the dispatcher, so the
/// job's throughput is bounded by its slowest worker's pace on its assigned
/// subset.
#[derive(Debug)]
pub struct LanePool {
    lanes: Vec<mpsc::Sender<String>>,
    acks: Vec<oneshot::Receiver<()>>,
    cursor: usize,
}

impl LanePool {
    /// Spawns `size` workers, each owning one lane and one drain-ack channel.
    ///
    /// Each lane holds at most one URL in flight. The dispatcher feeds lanes
    /// sequentially, so a worker only ever has the URL it is currently
    /// executing plus at most one queued behind it; larger buffers would only
    /// let a slow lane accumulate a backlog the job must wait out at drain
    /// time anyway.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for a zero pool size: with no lanes the
    /// first dispatch would block forever.
    pub fn spawn<F: Fetch>(size: usize, fetcher: F) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_spec("worker pool size must be at least 1"));
        }

        let mut lanes = Vec::with_capacity(size);
        let mut acks = Vec::with_capacity(size);

        for worker_id in 0..size {
            let (lane_tx, lane_rx) = mpsc::channel(1);
            let (done_tx, done_rx) = oneshot::channel();
            lanes.push(lane_tx);
            acks.push(done_rx);

            tokio::spawn(worker_loop(worker_id, lane_rx, fetcher.clone(), done_tx));
        }

        Ok(Self {
            lanes,
            acks,
            cursor: 0,
        })
    }

    /// Number of lanes in the pool.
    pub fn size(&self) -> usize {
        self.lanes.len()
    }

    /// Delivers one URL to the next lane in round-robin order.
    ///
    /// The k-th call overall targets lane `k mod N`. Awaits lane capacity, so
    /// the caller is backpressured by the slowest lane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lane`] if the target lane's worker is gone.
    pub async fn dispatch(&mut self, url: String) -> Result<()> {
        let lane = self.cursor;
        self.cursor = (self.cursor + 1) % self.lanes.len();

        self.lanes[lane].send(url).await.map_err(|_| Error::Lane {
            context: format!("lane {lane} closed before the job finished"),
        })
    }

    /// Closes every lane and waits for each worker to acknowledge drain.
    ///
    /// Lanes are closed one at a time in lane order, and the next lane is
    /// only closed after the previous worker's acknowledgement arrives.
    /// Returns only after all workers have acknowledged, so a successful
    /// drain means every dispatched URL has been executed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lane`] if a worker terminated without acknowledging.
    pub async fn drain(self) -> Result<()> {
        let Self { lanes, acks, .. } = self;
        for (worker_id, (lane, ack)) in lanes.into_iter().zip(acks).enumerate() {
            drop(lane);
            if ack.await.is_err() {
                return Err(Error::Lane {
                    context: format!("worker {worker_id} exited without acknowledging drain"),
                });
            }
            tracing::trace!(worker_id, "lane drained");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::pool::testing::{RecordingFetcher, SlowFetcher};

    #[tokio::test]
    async fn rejects_zero_pool_size() {
        let err = LanePool::spawn(0, RecordingFetcher::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidSpec { .. }));
    }

    #[tokio::test]
    async fn round_robin_is_deterministic_per_lane() {
        // Hand-built pool: keep the receivers so each lane's contents are
        // observable without workers consuming them.
        let (senders, mut receivers): (Vec<_>, Vec<_>) =
            (0..3).map(|_| mpsc::channel::<String>(16)).unzip();
        let mut pool = LanePool {
            lanes: senders,
            acks: Vec::new(),
            cursor: 0,
        };

        for url in ["a", "b", "c", "d", "e", "f"] {
            pool.dispatch(url.to_string()).await.unwrap();
        }
        drop(pool);

        let mut per_lane = Vec::new();
        for rx in &mut receivers {
            let mut lane = Vec::new();
            while let Ok(url) = rx.try_recv() {
                lane.push(url);
            }
            per_lane.push(lane);
        }

        // URL k lands on lane k mod 3, FIFO within the lane.
        assert_eq!(per_lane[0], vec!["a", "d"]);
        assert_eq!(per_lane[1], vec!["b", "e"]);
        assert_eq!(per_lane[2], vec!["c", "f"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn no_url_dropped_or_duplicated() {
        let fetcher = RecordingFetcher::default();
        let urls: Vec<String> = (0..100).map(|i| format!("http://localhost/{i}")).collect();

        for pool_size in [1, 3, 7] {
            let fetcher = fetcher.clone();
            let recorded_before = fetcher.seen().len();
            let mut pool = LanePool::spawn(pool_size, fetcher.clone()).unwrap();
            for url in &urls {
                pool.dispatch(url.clone()).await.unwrap();
            }
            pool.drain().await.unwrap();

            let mut seen: Vec<String> = fetcher.seen().split_off(recorded_before);
            seen.sort();
            let mut expected = urls.clone();
            expected.sort();
            assert_eq!(seen, expected, "pool size {pool_size}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn drain_waits_for_every_lane() {
        let fetcher = SlowFetcher::default();
        let mut pool = LanePool::spawn(3, fetcher.clone()).unwrap();

        // Lane 0 gets the slow URL; the others finish quickly.
        for url in ["http://localhost/slow", "http://localhost/1", "http://localhost/2"] {
            pool.dispatch(url.to_string()).await.unwrap();
        }
        pool.drain().await.unwrap();

        // A drain that returned before lane 0's acknowledgement would miss
        // the slow URL, which is only recorded after its stall.
        let seen = fetcher.seen();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().any(|url| url.contains("slow")));
    }
}
