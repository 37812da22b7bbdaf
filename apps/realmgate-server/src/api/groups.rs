use axum::Router;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use realmgate_core::{Group, GroupService, GroupUpdate};

use super::{CreatedResponse, created, reply, status_only};
use crate::AppState;
use crate::errors::{ApiError, ApiErrorResponse};
use crate::extractors::Payload;

pub(crate) fn group_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route(
            "/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
}

/// List the top-level groups of the realm
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    responses(
        (status = 200, description = "Groups in provider order", body = [Group]),
        (status = 503, description = "Identity provider authentication failed", body = ApiErrorResponse),
    )
)]
pub(crate) async fn list_groups(State(groups): State<GroupService>) -> Result<Response, ApiError> {
    Ok(reply(groups.list().await?))
}

/// Create a group
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    tag = "groups",
    request_body = Group,
    responses(
        (status = 201, description = "Group created", body = CreatedResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 409, description = "Group name already taken", body = ApiErrorResponse),
    )
)]
pub(crate) async fn create_group(
    State(groups): State<GroupService>,
    Payload(group): Payload<Group>,
) -> Result<Response, ApiError> {
    Ok(created(groups.create(&group).await?))
}

/// Get a group
#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group", body = Group),
        (status = 404, description = "Unknown group", body = ApiErrorResponse),
    )
)]
pub(crate) async fn get_group(
    State(groups): State<GroupService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(reply(groups.get(&id).await?))
}

/// Update a group
#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    request_body = GroupUpdate,
    responses(
        (status = 204, description = "Group updated"),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Unknown group", body = ApiErrorResponse),
    )
)]
pub(crate) async fn update_group(
    State(groups): State<GroupService>,
    Path(id): Path<String>,
    Payload(update): Payload<GroupUpdate>,
) -> Result<Response, ApiError> {
    Ok(reply(groups.update(&id, update).await?))
}

/// Delete a group
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Unknown group", body = ApiErrorResponse),
    )
)]
pub(crate) async fn delete_group(
    State(groups): State<GroupService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(status_only(&groups.delete(&id).await?))
}
