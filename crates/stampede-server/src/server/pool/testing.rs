//! Test fetchers shared by the pool, dispatch, and API tests.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::fetch::Fetch;

/// Records every fetched URL in arrival order; clones share the record.
#[derive(Clone, Default)]
pub(crate) struct RecordingFetcher {
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingFetcher {
    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Fetch for RecordingFetcher {
    type Error = Infallible;

    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = core::result::Result<(), Self::Error>> + Send {
        self.seen.lock().unwrap().push(url.to_string());
        async { Ok(()) }
    }
}

/// Like [`RecordingFetcher`], but stalls on URLs containing `"slow"` to
/// simulate one sluggish worker holding up its lane.
#[derive(Clone, Default)]
pub(crate) struct SlowFetcher {
    inner: RecordingFetcher,
}

impl SlowFetcher {
    pub(crate) fn seen(&self) -> Vec<String> {
        self.inner.seen()
    }
}

impl Fetch for SlowFetcher {
    type Error = Infallible;

    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = core::result::Result<(), Self::Error>> + Send {
        let slow = url.contains("slow");
        let inner = self.inner.clone();
        let url = url.to_string();
        async move {
            if slow {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            // Record after the stall so a premature drain would miss it.
            inner.seen.lock().unwrap().push(url);
            Ok(())
        }
    }
}
