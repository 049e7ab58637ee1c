//! Automation rule handlers: list rule states, toggle enablement.
//!
//! Rules are the stage automations from the process definition plus one
//! synthesized `auto_advance_<stage>` rule per stage that has at least one
//! checklist template and a next stage. Disabling a rule stops future
//! firings; it never undoes a status already applied.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use monteo_core::repository::settings::SettingsRepository;
use monteo_types::error::EngineError;
use monteo_types::process::{Actor, RuleId};
use monteo_types::settings::EngineSettings;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// One rule with its current enablement state.
#[derive(Debug, Serialize)]
pub struct RuleState {
    pub id: String,
    pub label: String,
    pub description: String,
    pub enabled: bool,
}

/// Body for toggling a rule.
#[derive(Debug, Deserialize)]
pub struct RuleUpdateRequest {
    pub enabled: bool,
}

/// A known rule: id, label, description, default enablement.
type KnownRule = (RuleId, String, String, bool);

async fn known_rules(state: &AppState) -> Result<Vec<KnownRule>, AppError> {
    let process = state.job_service.process();

    let mut rules: Vec<KnownRule> = process
        .automations()
        .map(|(_, automation)| {
            (
                RuleId::Automation(automation.id.to_string()),
                automation.label.to_string(),
                automation.description.to_string(),
                automation.default_enabled,
            )
        })
        .collect();

    for rule in state.template_service.auto_advance_rules(process).await? {
        let RuleId::AutoAdvance(stage) = &rule else {
            continue;
        };
        let label = format!("Auto-advance from {}", process.stage(*stage).label);
        let description =
            "Move the job to the next stage when every checklist item of this stage is completed"
                .to_string();
        rules.push((rule, label, description, true));
    }

    Ok(rules)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/rules - List all rules with their enablement state.
pub async fn list_rules(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<RuleState>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let settings: EngineSettings = state
        .settings_repo
        .load()
        .await
        .map_err(EngineError::from)?;

    let rules = known_rules(&state)
        .await?
        .into_iter()
        .map(|(rule, label, description, default_enabled)| RuleState {
            enabled: settings
                .rule_overrides
                .get(&rule.key())
                .copied()
                .unwrap_or(default_enabled),
            id: rule.key(),
            label,
            description,
        })
        .collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(rules, request_id, elapsed).with_link("self", "/api/v1/rules"),
    ))
}

/// PUT /api/v1/rules/:rule_id - Toggle a rule (admin only).
pub async fn update_rule(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(rule_id): Path<String>,
    Json(body): Json<RuleUpdateRequest>,
) -> Result<Json<ApiResponse<RuleState>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if auth.role != Actor::Office {
        return Err(AppError::Engine(EngineError::Forbidden(
            "only office staff may toggle automation rules".to_string(),
        )));
    }

    let rule: RuleId = rule_id
        .parse()
        .map_err(|e: String| AppError::Engine(EngineError::Validation(e)))?;

    let known = known_rules(&state).await?;
    let Some((_, label, description, _)) = known.into_iter().find(|(r, _, _, _)| *r == rule)
    else {
        return Err(AppError::Engine(EngineError::NotFound(format!(
            "rule {rule_id}"
        ))));
    };

    state
        .settings_repo
        .set_rule_enabled(&rule.key(), body.enabled)
        .await
        .map_err(EngineError::from)?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        RuleState {
            id: rule.key(),
            label,
            description,
            enabled: body.enabled,
        },
        request_id,
        elapsed,
    )))
}
