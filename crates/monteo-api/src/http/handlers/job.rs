//! Job CRUD and status change handlers.
//!
//! `change_status` and the checklist toggle both return the full
//! post-transition job so the UI can resynchronize without a second round
//! trip.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use monteo_core::process::stage_progress;
use monteo_core::repository::job::JobFilter;
use monteo_types::job::{CreateJobRequest, Job, JobId, JobStatus, UpdateJobRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for listing jobs.
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    /// Only jobs in this exact status.
    #[serde(default)]
    pub status: Option<String>,
    /// Only jobs assigned to this installer.
    #[serde(default)]
    pub installer: Option<String>,
    /// Exclude completed/cancelled jobs.
    #[serde(default)]
    pub open: bool,
}

/// Body for a manual status change.
#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    /// Requested status id; validated by the state machine.
    pub status: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs - Create a new job (starts in `lead`).
pub async fn create_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<CreateJobRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state.job_service.create_job(body).await?;
    let id = job.id;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("self", &format!("/api/v1/jobs/{id}")),
    ))
}

/// GET /api/v1/jobs - List jobs, optionally filtered.
pub async fn list_jobs(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ApiResponse<Vec<Job>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<JobStatus>()
                .map_err(|_| monteo_types::error::EngineError::UnknownStatus(s.to_string()))
        })
        .transpose()?;

    let jobs = state
        .job_service
        .list_jobs(Some(JobFilter {
            status,
            installer: query.installer,
            open_only: query.open,
        }))
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(jobs, request_id, elapsed).with_link("self", "/api/v1/jobs"),
    ))
}

/// GET /api/v1/jobs/:id - Get a job by id.
pub async fn get_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<JobId>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state.job_service.get_job(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(job, request_id, elapsed)
        .with_link("self", &format!("/api/v1/jobs/{id}"))
        .with_link("progress", &format!("/api/v1/jobs/{id}/progress"));
    Ok(Json(resp))
}

/// PUT /api/v1/jobs/:id - Update business attributes.
pub async fn update_job(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<JobId>,
    Json(body): Json<UpdateJobRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state.job_service.update_job(&id, body).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("self", &format!("/api/v1/jobs/{id}")),
    ))
}

/// DELETE /api/v1/jobs/:id - Delete a job (admin only).
pub async fn delete_job(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<JobId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state.job_service.delete_job(auth.role, &id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"deleted": true, "id": id.to_string()}),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/jobs/:id/status - Manual status change.
pub async fn change_status(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<JobId>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state
        .job_service
        .request_status_change(&id, &body.status, auth.role)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("self", &format!("/api/v1/jobs/{id}")),
    ))
}

/// GET /api/v1/jobs/:id/progress - Per-stage checkpoint and gate state.
pub async fn get_progress(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<JobId>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state.job_service.get_job(&id).await?;
    let progress = stage_progress(state.job_service.process(), &job);

    let elapsed = start.elapsed().as_millis() as u64;
    let data = serde_json::json!({
        "job_id": job.id,
        "status": job.status,
        "stages": progress,
    });
    Ok(Json(
        ApiResponse::success(data, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}
