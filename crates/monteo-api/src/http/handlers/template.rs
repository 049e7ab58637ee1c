//! Checklist template admin handlers.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use monteo_types::checklist::ChecklistItemTemplate;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/templates - List the current template set.
pub async fn list_templates(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<ChecklistItemTemplate>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let templates = state.template_service.list_templates().await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(templates, request_id, elapsed)
            .with_link("self", "/api/v1/templates"),
    ))
}

/// PUT /api/v1/templates - Replace the whole template set (admin only).
///
/// Changes apply only to future checklist instantiations; existing jobs
/// keep their items. Deleting a locked template is rejected.
pub async fn upsert_templates(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(body): Json<Vec<ChecklistItemTemplate>>,
) -> Result<Json<ApiResponse<Vec<ChecklistItemTemplate>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let templates = state
        .template_service
        .upsert_templates(auth.role, body)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(templates, request_id, elapsed)
            .with_link("self", "/api/v1/templates"),
    ))
}
