//! Request/response handlers for `/api/v1/job*`. Grounded on
//! `examples/original_source/api/handlers.go`.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::{http::StatusCode, Json};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use super::AppState;
use crate::error::JobError;
use crate::job::JobInfo;
use crate::types::CrawlerKind;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Body of `POST /api/v1/job`.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub start_page: String,
    pub destination_page: String,
    #[serde(default)]
    pub comment: String,
    pub workers: Option<usize>,
    #[serde(default)]
    pub crawl_method: Option<CrawlerKind>,
    pub timeout: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub id: Uuid,
    pub msg: String,
}

fn parse_timeout(raw: Option<&str>) -> Duration {
    match raw {
        Some(s) if !s.is_empty() => humantime::parse_duration(s).unwrap_or_else(|_| {
            error!(timeout = %s, "unable to parse timeout, using default 1 minute");
            DEFAULT_TIMEOUT
        }),
        _ => DEFAULT_TIMEOUT,
    }
}

pub async fn create_job(
    State(pool): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> impl IntoResponse {
    if req.start_page.is_empty() || req.destination_page.is_empty() {
        return (StatusCode::BAD_REQUEST, "invalid request").into_response();
    }

    let timeout = parse_timeout(req.timeout.as_deref());
    let crawl_method = req.crawl_method.unwrap_or_default();

    let id = match pool.add_job(
        req.start_page,
        req.destination_page,
        req.comment,
        crawl_method,
        timeout,
        req.workers.unwrap_or(0),
    ) {
        Ok(id) => id,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };

    if let Err(err) = pool.start(id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    Json(CreateJobResponse { id, msg: "successfully started a new job".to_string() }).into_response()
}

pub async fn list_jobs(State(pool): State<AppState>) -> Json<Vec<JobInfo>> {
    Json(pool.list())
}

pub async fn get_job(State(pool): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match pool.get(id) {
        Some(job) => Json(job.info()).into_response(),
        None => (StatusCode::BAD_REQUEST, format!("job not found {id}")).into_response(),
    }
}

pub async fn cancel_job(State(pool): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let Some(job) = pool.get(id) else {
        return (StatusCode::BAD_REQUEST, format!("job not found {id}")).into_response();
    };

    match job.stop(crate::types::Status::Cancelled) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(JobError::NotRunning) => (StatusCode::BAD_REQUEST, "job is not running").into_response(),
        Err(err) => {
            error!("error cancelling job {id}: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Streams the job's current duration once per second until the client
/// disconnects or the job ends. Grounded on the original's
/// `jobInfoSSEHandler`, which does the same over a raw chunked response;
/// `axum::response::sse::Sse` provides the disconnect-detection and
/// chunked-transfer plumbing the original hand-rolled with
/// `http.Flusher`/`http.CloseNotifier`.
pub async fn job_sse(
    State(pool): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let job = pool.get(id).ok_or(StatusCode::BAD_REQUEST)?;

    let stream = async_stream::stream! {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            ticker.tick().await;
            let duration = humantime::format_duration(job.duration()).to_string();
            yield Ok(Event::default().data(duration));
            if job.status() != crate::types::Status::Running {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
