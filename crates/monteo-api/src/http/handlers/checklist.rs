//! Checklist handlers: init, toggle, custom items, attachments.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use monteo_types::job::{Job, JobId};
use monteo_types::process::StageId;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for toggling a checklist item.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub completed: bool,
}

/// Body for adding an ad-hoc checklist item.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub label: String,
    /// Defaults to the job's current stage.
    #[serde(default)]
    pub stage: Option<StageId>,
    #[serde(default)]
    pub allow_attachment: bool,
}

/// Query parameters for an attachment upload.
#[derive(Debug, Deserialize)]
pub struct AttachmentQuery {
    pub filename: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/:id/checklist/init - Instantiate the checklist from
/// the current templates. Idempotent.
pub async fn init_checklist(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<JobId>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state.job_service.init_checklist(&id).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}

/// POST /api/v1/jobs/:id/checklist/:item_id/toggle - Toggle an item.
///
/// Returns the full post-automation job: a caller observing the toggle
/// already sees any status change it caused.
pub async fn toggle_item(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path((id, item_id)): Path<(JobId, Uuid)>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state
        .job_service
        .toggle_checklist_item(&id, &item_id, body.completed)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}

/// POST /api/v1/jobs/:id/checklist/items - Add an ad-hoc item.
pub async fn add_item(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<JobId>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state
        .job_service
        .add_custom_item(&id, &body.label, body.stage, body.allow_attachment)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}

/// DELETE /api/v1/jobs/:id/checklist/:item_id - Remove an item (admin).
pub async fn remove_item(
    State(state): State<AppState>,
    auth: Authenticated,
    Path((id, item_id)): Path<(JobId, Uuid)>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state
        .job_service
        .remove_item(auth.role, &id, &item_id)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}

/// POST /api/v1/jobs/:id/checklist/:item_id/attachment?filename=... -
/// Upload a file for an item that allows attachments. Body is the raw file.
pub async fn upload_attachment(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path((id, item_id)): Path<(JobId, Uuid)>,
    Query(query): Query<AttachmentQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let job = state
        .job_service
        .attach_file(&id, &item_id, &query.filename, &body)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(job, request_id, elapsed)
            .with_link("job", &format!("/api/v1/jobs/{id}")),
    ))
}
