//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.
//! Checklist attachments are served as static content from
//! `{data_dir}/attachments/`.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Jobs
        .route("/jobs", post(handlers::job::create_job))
        .route("/jobs", get(handlers::job::list_jobs))
        .route("/jobs/{id}", get(handlers::job::get_job))
        .route("/jobs/{id}", put(handlers::job::update_job))
        .route("/jobs/{id}", delete(handlers::job::delete_job))
        .route("/jobs/{id}/status", post(handlers::job::change_status))
        .route("/jobs/{id}/progress", get(handlers::job::get_progress))
        // Checklist
        .route(
            "/jobs/{id}/checklist/init",
            post(handlers::checklist::init_checklist),
        )
        .route(
            "/jobs/{id}/checklist/items",
            post(handlers::checklist::add_item),
        )
        .route(
            "/jobs/{id}/checklist/{item_id}/toggle",
            post(handlers::checklist::toggle_item),
        )
        .route(
            "/jobs/{id}/checklist/{item_id}",
            delete(handlers::checklist::remove_item),
        )
        .route(
            "/jobs/{id}/checklist/{item_id}/attachment",
            post(handlers::checklist::upload_attachment),
        )
        // Board
        .route("/board", get(handlers::board::get_board))
        .route("/board/sessions", post(handlers::board::create_session))
        .route(
            "/board/sessions/{id}",
            get(handlers::board::get_session),
        )
        .route(
            "/board/sessions/{id}",
            delete(handlers::board::close_session),
        )
        .route(
            "/board/sessions/{id}/refresh",
            post(handlers::board::refresh_session),
        )
        .route(
            "/board/sessions/{id}/moves",
            post(handlers::board::begin_move),
        )
        // Templates (admin)
        .route("/templates", get(handlers::template::list_templates))
        .route("/templates", put(handlers::template::upsert_templates))
        // Automation rules
        .route("/rules", get(handlers::rules::list_rules))
        .route("/rules/{rule_id}", put(handlers::rules::update_rule))
        // Policy flags
        .route("/settings", get(handlers::settings::list_settings))
        .route("/settings/{key}", put(handlers::settings::update_setting));

    let attachments_dir = state.data_dir.join("attachments");

    Router::new()
        .nest("/api/v1", api_routes)
        .nest_service("/attachments", ServeDir::new(attachments_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
