use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use realmgate_core::{AdminError, Role, RoleService, RoleUpdate};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{CreatedResponse, created, reply, status_only};
use crate::AppState;
use crate::errors::{ApiError, ApiErrorResponse};
use crate::extractors::Payload;

pub(crate) fn role_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role).head(check_role))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub(crate) struct RoleNameQuery {
    /// Exact role name to look for.
    role_name: Option<String>,
}

/// List the realm roles
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "roles",
    responses(
        (status = 200, description = "Roles in provider order", body = [Role]),
        (status = 503, description = "Identity provider authentication failed", body = ApiErrorResponse),
    )
)]
pub(crate) async fn list_roles(State(roles): State<RoleService>) -> Result<Response, ApiError> {
    Ok(reply(roles.list().await?))
}

/// Create a realm role
///
/// The name is checked against the existing roles first.
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "roles",
    request_body = Role,
    responses(
        (status = 201, description = "Role created", body = CreatedResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 409, description = "Role name already taken", body = ApiErrorResponse),
    )
)]
pub(crate) async fn create_role(
    State(roles): State<RoleService>,
    Payload(role): Payload<Role>,
) -> Result<Response, ApiError> {
    Ok(created(roles.create(&role).await?))
}

/// Check that a role name exists
#[utoipa::path(
    head,
    path = "/api/v1/roles",
    tag = "roles",
    params(RoleNameQuery),
    responses(
        (status = 204, description = "A role has this name"),
        (status = 404, description = "No role has this name"),
    )
)]
pub(crate) async fn check_role(
    State(roles): State<RoleService>,
    Query(RoleNameQuery { role_name }): Query<RoleNameQuery>,
) -> Result<Response, ApiError> {
    let Some(role_name) = role_name.filter(|name| !name.trim().is_empty()) else {
        return Err(ApiError::validation("roleName query parameter is required"));
    };

    match roles.check_name(&role_name).await {
        Ok(()) => Err(AdminError::NotFound {
            kind: "role",
            key: role_name,
        }
        .into()),
        Err(AdminError::Conflict { .. }) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(error) => Err(error.into()),
    }
}

/// Get a realm role
#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "The role", body = Role),
        (status = 404, description = "Unknown role", body = ApiErrorResponse),
    )
)]
pub(crate) async fn get_role(
    State(roles): State<RoleService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(reply(roles.get(&id).await?))
}

/// Update a realm role
#[utoipa::path(
    put,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = String, Path, description = "Role id")),
    request_body = RoleUpdate,
    responses(
        (status = 204, description = "Role updated"),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Unknown role", body = ApiErrorResponse),
    )
)]
pub(crate) async fn update_role(
    State(roles): State<RoleService>,
    Path(id): Path<String>,
    Payload(update): Payload<RoleUpdate>,
) -> Result<Response, ApiError> {
    Ok(reply(roles.update(&id, update).await?))
}

/// Delete a realm role
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Unknown role", body = ApiErrorResponse),
    )
)]
pub(crate) async fn delete_role(
    State(roles): State<RoleService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(status_only(&roles.delete(&id).await?))
}
