use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use realmgate_core::{AdminError, Group, User, UserService, UserUpdate};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{CreatedResponse, created, reply, status_only};
use crate::AppState;
use crate::errors::{ApiError, ApiErrorResponse};
use crate::extractors::Payload;

pub(crate) fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user).head(check_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/groups", get(list_user_groups))
        .route(
            "/{id}/groups/{group_id}",
            post(join_group).delete(leave_group),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct UsernameQuery {
    /// Exact username to look for.
    username: Option<String>,
}

/// List the users of the realm
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users in provider order", body = [User]),
        (status = 503, description = "Identity provider authentication failed", body = ApiErrorResponse),
    )
)]
pub(crate) async fn list_users(State(users): State<UserService>) -> Result<Response, ApiError> {
    Ok(reply(users.list().await?))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = CreatedResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 409, description = "Username already taken", body = ApiErrorResponse),
    )
)]
pub(crate) async fn create_user(
    State(users): State<UserService>,
    Payload(user): Payload<User>,
) -> Result<Response, ApiError> {
    Ok(created(users.create(&user).await?))
}

/// Check that a username exists
#[utoipa::path(
    head,
    path = "/api/v1/users",
    tag = "users",
    params(UsernameQuery),
    responses(
        (status = 200, description = "A user has this username"),
        (status = 404, description = "No user has this username"),
    )
)]
pub(crate) async fn check_user(
    State(users): State<UserService>,
    Query(UsernameQuery { username }): Query<UsernameQuery>,
) -> Result<Response, ApiError> {
    let Some(username) = username.filter(|name| !name.trim().is_empty()) else {
        return Err(ApiError::validation("username query parameter is required"));
    };

    let found = users.find_by_username(&username).await?;
    if found.payload.is_none() {
        return Err(AdminError::NotFound {
            kind: "user",
            key: username,
        }
        .into());
    }
    Ok(StatusCode::OK.into_response())
}

/// Get a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "Unknown user", body = ApiErrorResponse),
    )
)]
pub(crate) async fn get_user(
    State(users): State<UserService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(reply(users.get(&id).await?))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 404, description = "Unknown user", body = ApiErrorResponse),
    )
)]
pub(crate) async fn update_user(
    State(users): State<UserService>,
    Path(id): Path<String>,
    Payload(update): Payload<UserUpdate>,
) -> Result<Response, ApiError> {
    Ok(reply(users.update(&id, update).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Unknown user", body = ApiErrorResponse),
    )
)]
pub(crate) async fn delete_user(
    State(users): State<UserService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(status_only(&users.delete(&id).await?))
}

/// List the groups of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/groups",
    tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Groups the user belongs to", body = [Group]),
        (status = 404, description = "Unknown user", body = ApiErrorResponse),
    )
)]
pub(crate) async fn list_user_groups(
    State(users): State<UserService>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    Ok(reply(users.list_groups(&id).await?))
}

/// Add a user to a group
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/groups/{group_id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User id"),
        ("group_id" = String, Path, description = "Group id"),
    ),
    responses(
        (status = 204, description = "User joined the group"),
        (status = 404, description = "Unknown user or group", body = ApiErrorResponse),
    )
)]
pub(crate) async fn join_group(
    State(users): State<UserService>,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    Ok(status_only(&users.join_group(&id, &group_id).await?))
}

/// Remove a user from a group
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/groups/{group_id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User id"),
        ("group_id" = String, Path, description = "Group id"),
    ),
    responses(
        (status = 204, description = "User left the group"),
        (status = 404, description = "Unknown user or group", body = ApiErrorResponse),
    )
)]
pub(crate) async fn leave_group(
    State(users): State<UserService>,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    Ok(status_only(&users.leave_group(&id, &group_id).await?))
}
