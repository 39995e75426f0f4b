//! The seam between the worker pool and the HTTP transport.
//!
//! Workers execute URLs through a [`Fetch`] implementation instead of calling
//! the HTTP client directly. Production uses [`HttpFetcher`], a thin wrapper
//! over a per-job [`reqwest::Client`] carrying the job's header set; tests
//! inject recording or failing fetchers to observe the engine's behavior
//! without touching the network.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use stampede_core::{Error, Result};

/// Executes a single URL fetch on behalf of a worker.
///
/// Implementations are cloned once per worker lane, so shared state (a
/// connection pool, a test recorder) must live behind the clone.
pub trait Fetch: Clone + Send + Sync + 'static {
    type Error: core::fmt::Display + Send;

    /// Issues one request against `url`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error for connect failures, timeouts, or
    /// malformed URLs. The worker logs and swallows these; they never abort
    /// the lane.
    fn fetch(&self, url: &str) -> impl Future<Output = core::result::Result<(), Self::Error>> + Send;
}

/// Production fetcher: one `reqwest::Client` per traffic job.
///
/// The job's headers become the client's default headers, so every request
/// the job issues carries the identical set. The client enforces the fixed
/// per-request timeout and follows redirects up to `reqwest`'s default limit.
/// Header state is scoped to this instance, so concurrent jobs can never
/// observe each other's headers.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds the per-job client from the job's header set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] for a header name or value that is not
    /// valid HTTP, and [`Error::Client`] if the client itself cannot be
    /// constructed.
    pub fn for_job(headers: &BTreeMap<String, String>, timeout: Duration) -> Result<Self> {
        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::try_from(name.as_str()).map_err(|e| Error::InvalidSpec {
                reason: format!("invalid header name {name:?}: {e}"),
            })?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|e| Error::InvalidSpec {
                reason: format!("invalid value for header {name}: {e}"),
            })?;
            header_map.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Client {
                context: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    type Error = reqwest::Error;

    fn fetch(&self, url: &str) -> impl Future<Output = core::result::Result<(), Self::Error>> + Send {
        let request = self.client.get(url).send();
        async move {
            let response = request.await?;
            tracing::trace!(status = %response.status(), "response received");
            Ok(())
        }
    }
}
