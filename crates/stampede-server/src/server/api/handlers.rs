//! Request handlers for the traffic and healthcheck endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use stampede_core::{JobId, JobSpec};

use super::AppState;
use super::error::ApiError;
use crate::server::dispatch;
use crate::server::pool::fetch::HttpFetcher;
use crate::server::telemetry::increment_jobs_submitted;

/// Wire form of a traffic job submission.
///
/// Absent fields default to their zero values, matching the original wire
/// contract; validation then rejects unusable zero values with a structured
/// 400 rather than a decode error.
#[derive(Debug, Deserialize)]
pub struct TrafficRequest {
    #[serde(default)]
    pub threadcount: usize,
    #[serde(default)]
    pub url: Vec<String>,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl TrafficRequest {
    fn into_spec(self) -> JobSpec {
        JobSpec {
            thread_count: self.threadcount,
            urls: self.url,
            iterations: self.iteration,
            headers: self.headers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTrafficResponse {
    #[serde(rename = "workerID")]
    pub worker_id: JobId,
}

#[derive(Debug, Serialize)]
pub struct LookupTrafficResponse {
    pub threadcount: usize,
}

/// POST /api/traffic
///
/// Validates the spec, spawns the detached dispatcher, and answers with the
/// registered ID as soon as the dispatcher hands it over, before the request
/// batch has made any progress.
pub async fn create_traffic(
    State(state): State<AppState>,
    body: Result<Json<TrafficRequest>, JsonRejection>,
) -> Result<Json<CreateTrafficResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::MalformedBody {
        errormsg: rejection.body_text(),
    })?;

    let spec = request.into_spec();
    spec.validate(state.config.max_pool_size)?;
    let fetcher = HttpFetcher::for_job(&spec.headers, state.config.request_timeout)?;

    increment_jobs_submitted();
    let id_rx = dispatch::spawn(Arc::clone(&state.registry), spec, fetcher);
    let worker_id = id_rx
        .await
        .map_err(|_| ApiError::internal("dispatcher exited before the id handoff"))?;

    Ok(Json(CreateTrafficResponse { worker_id }))
}

/// GET /api/traffic/{id}
pub async fn lookup_traffic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LookupTrafficResponse>, ApiError> {
    let id: u64 = id.parse().map_err(|_| ApiError::InvalidId)?;
    let job = state
        .registry
        .lookup(JobId(id))
        .ok_or(ApiError::NotFound)?;

    Ok(Json(LookupTrafficResponse {
        threadcount: job.thread_count,
    }))
}

/// HEAD /healthcheck
pub async fn healthcheck(State(state): State<AppState>) -> StatusCode {
    health_status(&state)
}

/// POST /healthcheck/{action}
///
/// `up` and `down` flip the flag; any other action leaves the state
/// unchanged. The response status always reflects the current state.
pub async fn healthcheck_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> StatusCode {
    match action.as_str() {
        "up" => state.healthy.store(true, Ordering::Relaxed),
        "down" => state.healthy.store(false, Ordering::Relaxed),
        _ => {}
    }
    health_status(&state)
}

fn health_status(state: &AppState) -> StatusCode {
    if state.healthy.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
