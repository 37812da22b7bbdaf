use realmgate_core::{Group, GroupUpdate, Role, RoleUpdate, User, UserUpdate};
use utoipa::OpenApi;

use crate::api::{CreatedResponse, groups, roles, users};
use crate::errors::ApiErrorResponse;

/// OpenAPI description of the `/api/v1` surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Realmgate API",
        description = "User, group and role management of a Keycloak realm"
    ),
    paths(
        users::list_users,
        users::create_user,
        users::check_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_user_groups,
        users::join_group,
        users::leave_group,
        groups::list_groups,
        groups::create_group,
        groups::get_group,
        groups::update_group,
        groups::delete_group,
        roles::list_roles,
        roles::create_role,
        roles::check_role,
        roles::get_role,
        roles::update_role,
        roles::delete_role,
    ),
    components(schemas(
        User,
        UserUpdate,
        Group,
        GroupUpdate,
        Role,
        RoleUpdate,
        CreatedResponse,
        ApiErrorResponse
    )),
    tags(
        (name = "users", description = "Users and their group memberships"),
        (name = "groups", description = "Top-level groups"),
        (name = "roles", description = "Realm roles"),
    )
)]
pub struct ApiDoc;
