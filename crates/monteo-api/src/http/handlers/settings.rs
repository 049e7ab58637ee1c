//! Policy flag handlers.
//!
//! Policy flags guard transitions (e.g. requiring an assigned installer
//! before a lead converts). They are read by the engine at evaluation time;
//! toggling one affects future transitions only.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use monteo_core::repository::settings::SettingsRepository;
use monteo_types::error::EngineError;
use monteo_types::process::Actor;
use monteo_types::settings::REQUIRE_INSTALLER_FOR_MEASUREMENT;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// One policy flag with its current value.
#[derive(Debug, Serialize)]
pub struct PolicyState {
    pub key: &'static str,
    pub value: bool,
}

/// Body for setting a policy flag.
#[derive(Debug, Deserialize)]
pub struct PolicyUpdateRequest {
    pub value: bool,
}

/// GET /api/v1/settings - List policy flags.
pub async fn list_settings(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<PolicyState>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let settings = state
        .settings_repo
        .load()
        .await
        .map_err(EngineError::from)?;

    let flags = vec![PolicyState {
        key: REQUIRE_INSTALLER_FOR_MEASUREMENT,
        value: settings.require_installer_for_measurement,
    }];

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(flags, request_id, elapsed).with_link("self", "/api/v1/settings"),
    ))
}

/// PUT /api/v1/settings/:key - Set a policy flag (admin only).
pub async fn update_setting(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(key): Path<String>,
    Json(body): Json<PolicyUpdateRequest>,
) -> Result<Json<ApiResponse<PolicyState>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if auth.role != Actor::Office {
        return Err(AppError::Engine(EngineError::Forbidden(
            "only office staff may change policy flags".to_string(),
        )));
    }

    if key != REQUIRE_INSTALLER_FOR_MEASUREMENT {
        return Err(AppError::Engine(EngineError::NotFound(format!(
            "policy flag {key}"
        ))));
    }

    state
        .settings_repo
        .set_flag(REQUIRE_INSTALLER_FOR_MEASUREMENT, body.value)
        .await
        .map_err(EngineError::from)?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        PolicyState {
            key: REQUIRE_INSTALLER_FOR_MEASUREMENT,
            value: body.value,
        },
        request_id,
        elapsed,
    )))
}
