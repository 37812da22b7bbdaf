use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use utoipa::OpenApi;

use crate::AppState;
use crate::api::groups::group_router;
use crate::api::roles::role_router;
use crate::api::users::user_router;
use crate::openapi::ApiDoc;

/// The application router
pub fn app_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1/users", user_router())
        .nest("/api/v1/groups", group_router())
        .nest("/api/v1/roles", role_router())
        .route("/api/v1/health", get(health).post(health))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.uptime();

    Json(json!({
        "status": "OK",
        "uptime": uptime.as_secs(),
    }))
}
