//! Pipeline board handlers: canonical view and optimistic move sessions.
//!
//! A UI client opens a session, then posts drags against it. The move is
//! applied to the session's view immediately (the optimistic step), the
//! authoritative transition runs through the state machine, and the
//! response carries either the confirmed view or the rolled-back canonical
//! one. The session view is exclusively owned by its UI client; canonical
//! job records stay shared.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use monteo_core::board::{BoardSession, BoardView};
use monteo_core::repository::job::JobFilter;
use monteo_types::job::{Job, JobId};
use monteo_types::process::StageId;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for a drag between columns.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub job_id: JobId,
    pub from: StageId,
    pub to: StageId,
}

/// Outcome of an optimistic move after server reconciliation.
#[derive(Debug, Serialize)]
pub struct MoveOutcome {
    /// Whether the authoritative transition was applied.
    pub accepted: bool,
    /// The session's board after confirm or rollback.
    pub board: serde_json::Value,
    /// The post-transition job on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
    /// The rejection reason on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn board_json(view: &BoardView) -> serde_json::Value {
    serde_json::to_value(view).unwrap_or_else(|_| serde_json::json!({}))
}

async fn open_jobs(state: &AppState) -> Result<Vec<Job>, AppError> {
    Ok(state
        .job_service
        .list_jobs(Some(JobFilter {
            open_only: true,
            ..Default::default()
        }))
        .await?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/board - Canonical board (no session).
pub async fn get_board(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let jobs = open_jobs(&state).await?;
    let view = BoardView::partition(state.job_service.process(), &jobs, 1);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(board_json(&view), request_id, elapsed)
            .with_link("self", "/api/v1/board"),
    ))
}

/// POST /api/v1/board/sessions - Open an optimistic board session.
pub async fn create_session(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let jobs = open_jobs(&state).await?;
    let session = BoardSession::new(state.job_service.process(), &jobs);
    let view = session.view();
    let session_id = Uuid::new_v4();
    state.board_sessions.insert(session_id, session);

    let elapsed = start.elapsed().as_millis() as u64;
    let data = serde_json::json!({
        "session_id": session_id,
        "board": board_json(&view),
    });
    Ok(Json(
        ApiResponse::success(data, request_id, elapsed)
            .with_link("self", &format!("/api/v1/board/sessions/{session_id}")),
    ))
}

/// GET /api/v1/board/sessions/:id - Current session view.
pub async fn get_session(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let view = {
        let session = state
            .board_sessions
            .get(&session_id)
            .ok_or_else(|| AppError::Engine(monteo_types::error::EngineError::NotFound(
                format!("board session {session_id}"),
            )))?;
        session.view()
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        board_json(&view),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/board/sessions/:id/refresh - Rebuild from canonical state.
pub async fn refresh_session(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let jobs = open_jobs(&state).await?;
    let view = {
        let mut session = state
            .board_sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::Engine(monteo_types::error::EngineError::NotFound(
                format!("board session {session_id}"),
            )))?;
        session.refresh(state.job_service.process(), &jobs)
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        board_json(&view),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/board/sessions/:id/moves - Drag a card between columns.
///
/// Applies the optimistic move, runs the authoritative transition, then
/// confirms or rejects. A rejection rolls the session back to a fresh
/// partition of canonical state and reports the reason in the outcome
/// rather than as an HTTP error, so the client always receives the board
/// to render.
pub async fn begin_move(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(session_id): Path<Uuid>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<ApiResponse<MoveOutcome>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    // Optimistic step: apply locally, get the pending token.
    let token = {
        let mut session = state
            .board_sessions
            .get_mut(&session_id)
            .ok_or_else(|| AppError::Engine(monteo_types::error::EngineError::NotFound(
                format!("board session {session_id}"),
            )))?;
        session.begin_move(body.job_id, body.from, body.to)?
    };

    // Authoritative step: the state machine decides.
    let result = state
        .job_service
        .request_status_change(&body.job_id, body.to.as_str(), auth.role)
        .await;

    let outcome = match result {
        Ok(job) => {
            let view = {
                let mut session = state
                    .board_sessions
                    .get_mut(&session_id)
                    .ok_or_else(|| AppError::Internal("board session vanished".to_string()))?;
                session.confirm_move(&token);
                session.view()
            };
            MoveOutcome {
                accepted: true,
                board: board_json(&view),
                job: Some(job),
                error: None,
            }
        }
        Err(err) => {
            let canonical = open_jobs(&state).await?;
            let view = {
                let mut session = state
                    .board_sessions
                    .get_mut(&session_id)
                    .ok_or_else(|| AppError::Internal("board session vanished".to_string()))?;
                session.reject_move(&token, state.job_service.process(), &canonical)
            };
            MoveOutcome {
                accepted: false,
                board: board_json(&view),
                job: None,
                error: Some(err.to_string()),
            }
        }
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(outcome, request_id, elapsed)))
}

/// DELETE /api/v1/board/sessions/:id - Close a session.
///
/// Abandoned sessions leak nothing (the board is derivable from canonical
/// state), but tidy clients close them.
pub async fn close_session(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let removed = state.board_sessions.remove(&session_id).is_some();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({"closed": removed}),
        request_id,
        elapsed,
    )))
}
