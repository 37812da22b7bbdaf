//! `/api/v1` handlers, one module per resource.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use realmgate_core::Outcome;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub(crate) mod groups;
pub(crate) mod roles;
pub(crate) mod users;

/// Body of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    /// Id assigned by the identity provider.
    pub id: String,
}

/// Forwards the provider status with the payload, without a body on `204 No Content`.
fn reply<T: Serialize>(outcome: Outcome<T>) -> Response {
    if outcome.status == StatusCode::NO_CONTENT {
        return StatusCode::NO_CONTENT.into_response();
    }
    (outcome.status, Json(outcome.payload)).into_response()
}

fn created(outcome: Outcome<String>) -> Response {
    reply(outcome.map(|id| CreatedResponse { id }))
}

fn status_only(outcome: &Outcome<()>) -> Response {
    outcome.status.into_response()
}
