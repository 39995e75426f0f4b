//! # Traffic Job Types
//!
//! This module defines the shared types describing one submitted traffic job:
//! the target URLs, the number of passes over them, the headers applied to
//! every request, and the size of the worker pool that executes the batch.
//!
//! ## Overview
//!
//! - [`JobId`] - The unique, monotonically assigned job identifier
//! - [`JobSpec`] - A client-submitted, not-yet-registered job description
//! - [`TrafficJob`] - A registered job; immutable once the registry has
//!   assigned its ID
//!
//! A [`JobSpec`] becomes a [`TrafficJob`] exactly once, inside
//! [`TrafficRegistry::register`](crate::TrafficRegistry::register). Validation
//! happens before registration via [`JobSpec::validate`], so an invalid spec
//! never reaches the registry and never allocates an ID.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Unique identifier of a registered traffic job.
///
/// IDs start at 0 and increase monotonically in registration order. They are
/// never reused for the lifetime of the process.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl core::fmt::Display for JobId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client-submitted traffic job description, before registration.
///
/// Field semantics match the wire contract: `thread_count` is the worker-pool
/// size, `urls` is the ordered target list, `iterations` is the number of
/// full passes over `urls`, and `headers` are applied identically to every
/// request the job issues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSpec {
    pub thread_count: usize,
    pub urls: Vec<String>,
    pub iterations: u32,
    pub headers: BTreeMap<String, String>,
}

impl JobSpec {
    /// Validates the spec against the service limits.
    ///
    /// A pool size of zero would leave the fan-out engine with no lanes and
    /// the first dispatch blocked forever, so it is rejected here, before any
    /// ID is allocated. `max_pool_size` is the service-wide cap on per-job
    /// worker pools.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpec`] if `thread_count` is zero or exceeds
    /// `max_pool_size`, or if `iterations` is zero.
    pub fn validate(&self, max_pool_size: usize) -> Result<()> {
        if self.thread_count == 0 {
            return Err(Error::invalid_spec("threadcount must be at least 1"));
        }
        if self.thread_count > max_pool_size {
            return Err(Error::InvalidSpec {
                reason: format!(
                    "threadcount {} exceeds maximum allowed ({})",
                    self.thread_count, max_pool_size
                ),
            });
        }
        if self.iterations == 0 {
            return Err(Error::invalid_spec("iteration must be at least 1"));
        }
        Ok(())
    }

    /// The total number of requests this job will issue: one per URL per
    /// iteration.
    pub fn total_requests(&self) -> usize {
        self.urls.len() * self.iterations as usize
    }
}

/// A registered traffic job.
///
/// Created exclusively by [`TrafficRegistry::register`] and never mutated
/// afterwards; the registry keeps jobs for the lifetime of the process.
///
/// [`TrafficRegistry::register`]: crate::TrafficRegistry::register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrafficJob {
    pub id: JobId,
    pub thread_count: usize,
    pub urls: Vec<String>,
    pub iterations: u32,
    pub headers: BTreeMap<String, String>,
}

impl TrafficJob {
    pub(crate) fn from_spec(id: JobId, spec: JobSpec) -> Self {
        Self {
            id,
            thread_count: spec.thread_count,
            urls: spec.urls,
            iterations: spec.iterations,
            headers: spec.headers,
        }
    }
}
