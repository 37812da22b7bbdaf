//! In-process stand-in for the Keycloak token endpoint and admin API.
#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, LOCATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use realmgate_core::{Group, GroupUpdate, Role, RoleUpdate, User, UserUpdate};
use serde_json::json;
use tracing::{debug, info};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Default)]
struct Realm {
    users: Vec<User>,
    groups: Vec<Group>,
    roles: Vec<Role>,
    memberships: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct FakeKeycloak {
    base: Arc<str>,
    realm: Arc<Mutex<Realm>>,
    token: Arc<Mutex<String>>,
    password_grants: Arc<AtomicUsize>,
    refresh_grants: Arc<AtomicUsize>,
}

impl FakeKeycloak {
    /// Binds an ephemeral port and serves the fake provider in the background.
    pub async fn start() -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let fake = Self {
            base: Arc::from(format!("http://{addr}")),
            realm: Arc::default(),
            token: Arc::default(),
            password_grants: Arc::default(),
            refresh_grants: Arc::default(),
        };

        let app = fake.router();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("fake keycloak running");
        });
        info!(%addr, "fake keycloak listening");

        Ok(fake)
    }

    pub fn url(&self) -> &str {
        &self.base
    }

    pub fn password_grants(&self) -> usize {
        self.password_grants.load(Ordering::SeqCst)
    }

    pub fn refresh_grants(&self) -> usize {
        self.refresh_grants.load(Ordering::SeqCst)
    }

    fn router(&self) -> Router {
        let admin = Router::new()
            .route("/users", get(list_users).post(create_user))
            .route(
                "/users/{id}",
                get(get_user).put(update_user).delete(delete_user),
            )
            .route("/users/{id}/groups", get(list_user_groups))
            .route(
                "/users/{id}/groups/{group_id}",
                put(join_group).delete(leave_group),
            )
            .route("/groups", get(list_groups).post(create_group))
            .route(
                "/groups/{id}",
                get(get_group).put(update_group).delete(delete_group),
            )
            .route("/roles", get(list_roles).post(create_role))
            .route(
                "/roles-by-id/{id}",
                get(get_role).put(update_role).delete(delete_role),
            )
            .layer(middleware::from_fn_with_state(self.clone(), require_bearer));

        Router::new()
            .route("/realms/{realm}/protocol/openid-connect/token", post(token))
            .nest("/admin/realms/{realm}", admin)
            .with_state(self.clone())
    }

    fn issue_token(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        *self.token.lock().expect("token lock") = token.clone();
        token
    }

    fn created(&self, realm: &str, collection: &str, id: &str) -> Response {
        let location = format!("{}/admin/realms/{realm}/{collection}/{id}", self.base);
        (StatusCode::CREATED, [(LOCATION, location)]).into_response()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn conflict(message: String) -> Response {
    (StatusCode::CONFLICT, Json(json!({ "errorMessage": message }))).into_response()
}

async fn token(
    State(fake): State<FakeKeycloak>,
    Path(realm): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let field = |name: &str| form.get(name).map(String::as_str);

    if realm != "master" || field("client_id") != Some("admin-cli") {
        return error(StatusCode::UNAUTHORIZED, "invalid_client");
    }

    match field("grant_type") {
        Some("password")
            if field("username") == Some(ADMIN_USERNAME)
                && field("password") == Some(ADMIN_PASSWORD) =>
        {
            fake.password_grants.fetch_add(1, Ordering::SeqCst);
        }
        Some("refresh_token") if field("refresh_token").is_some() => {
            fake.refresh_grants.fetch_add(1, Ordering::SeqCst);
        }
        _ => return error(StatusCode::UNAUTHORIZED, "invalid_grant"),
    }

    let access_token = fake.issue_token();
    debug!(%access_token, "token issued");
    Json(json!({
        "access_token": access_token,
        "expires_in": 3600,
        "refresh_expires_in": 1800,
        "refresh_token": format!("refresh-{access_token}"),
        "token_type": "Bearer",
        "scope": "profile email"
    }))
    .into_response()
}

async fn require_bearer(State(fake): State<FakeKeycloak>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", fake.token.lock().expect("token lock"));
    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "HTTP 401 Unauthorized");
    }
    next.run(request).await
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// users

async fn list_users(
    State(fake): State<FakeKeycloak>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    let users = realm
        .users
        .iter()
        .filter(|user| {
            query
                .get("username")
                .is_none_or(|username| &user.username == username)
        })
        .cloned()
        .collect::<Vec<_>>();
    Json(users).into_response()
}

async fn create_user(
    State(fake): State<FakeKeycloak>,
    Path(realm_name): Path<String>,
    Json(user): Json<User>,
) -> Response {
    let id = new_id();
    {
        let mut realm = fake.realm.lock().expect("realm lock");
        if realm.users.iter().any(|it| it.username == user.username) {
            return conflict("User exists with same username".to_string());
        }
        realm.users.push(User {
            id: Some(id.clone()),
            ..user
        });
    }
    fake.created(&realm_name, "users", &id)
}

async fn get_user(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    match realm.users.iter().find(|user| user.id.as_deref() == Some(id.as_str())) {
        Some(user) => Json(user).into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn update_user(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
    Json(update): Json<UserUpdate>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    match realm.users.iter_mut().find(|user| user.id.as_deref() == Some(id.as_str())) {
        Some(user) => {
            if let Some(username) = update.username {
                user.username = username;
            }
            user.email = update.email.or(user.email.take());
            user.first_name = update.first_name.or(user.first_name.take());
            user.last_name = update.last_name.or(user.last_name.take());
            user.enabled = update.enabled.or(user.enabled);
            user.email_verified = update.email_verified.or(user.email_verified);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn delete_user(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    let before = realm.users.len();
    realm.users.retain(|user| user.id.as_deref() != Some(id.as_str()));
    if realm.users.len() == before {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    realm.memberships.retain(|(user_id, _)| user_id != &id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_user_groups(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    if !realm.users.iter().any(|user| user.id.as_deref() == Some(id.as_str())) {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    let groups = realm
        .groups
        .iter()
        .filter(|group| {
            realm
                .memberships
                .iter()
                .any(|(user_id, group_id)| user_id == &id && group.id.as_ref() == Some(group_id))
        })
        .cloned()
        .collect::<Vec<_>>();
    Json(groups).into_response()
}

async fn join_group(
    State(fake): State<FakeKeycloak>,
    Path((_, id, group_id)): Path<(String, String, String)>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    if !realm.users.iter().any(|user| user.id.as_deref() == Some(id.as_str())) {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    if !realm.groups.iter().any(|group| group.id.as_deref() == Some(group_id.as_str())) {
        return error(StatusCode::NOT_FOUND, "Group not found");
    }
    let membership = (id, group_id);
    if !realm.memberships.contains(&membership) {
        realm.memberships.push(membership);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn leave_group(
    State(fake): State<FakeKeycloak>,
    Path((_, id, group_id)): Path<(String, String, String)>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    if !realm.users.iter().any(|user| user.id.as_deref() == Some(id.as_str())) {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    realm
        .memberships
        .retain(|(user_id, member_of)| !(user_id == &id && member_of == &group_id));
    StatusCode::NO_CONTENT.into_response()
}

// groups

async fn list_groups(State(fake): State<FakeKeycloak>) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    Json(&realm.groups).into_response()
}

async fn create_group(
    State(fake): State<FakeKeycloak>,
    Path(realm_name): Path<String>,
    Json(group): Json<Group>,
) -> Response {
    let id = new_id();
    {
        let mut realm = fake.realm.lock().expect("realm lock");
        if realm.groups.iter().any(|it| it.name == group.name) {
            return conflict(format!("Top level group named '{}' already exists.", group.name));
        }
        realm.groups.push(Group {
            id: Some(id.clone()),
            path: Some(format!("/{}", group.name)),
            ..group
        });
    }
    fake.created(&realm_name, "groups", &id)
}

async fn get_group(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    match realm.groups.iter().find(|group| group.id.as_deref() == Some(id.as_str())) {
        Some(group) => Json(group).into_response(),
        None => error(StatusCode::NOT_FOUND, "Could not find group by id"),
    }
}

async fn update_group(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
    Json(update): Json<GroupUpdate>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    match realm.groups.iter_mut().find(|group| group.id.as_deref() == Some(id.as_str())) {
        Some(group) => {
            if let Some(name) = update.name {
                group.path = Some(format!("/{name}"));
                group.name = name;
            }
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Could not find group by id"),
    }
}

async fn delete_group(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    let before = realm.groups.len();
    realm.groups.retain(|group| group.id.as_deref() != Some(id.as_str()));
    if realm.groups.len() == before {
        return error(StatusCode::NOT_FOUND, "Could not find group by id");
    }
    realm.memberships.retain(|(_, group_id)| group_id != &id);
    StatusCode::NO_CONTENT.into_response()
}

// roles

async fn list_roles(State(fake): State<FakeKeycloak>) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    Json(&realm.roles).into_response()
}

async fn create_role(
    State(fake): State<FakeKeycloak>,
    Path(realm_name): Path<String>,
    Json(role): Json<Role>,
) -> Response {
    let id = new_id();
    {
        let mut realm = fake.realm.lock().expect("realm lock");
        if realm.roles.iter().any(|it| it.name == role.name) {
            return conflict(format!("Role with name {} already exists", role.name));
        }
        realm.roles.push(Role {
            id: Some(id.clone()),
            composite: Some(false),
            client_role: Some(false),
            container_id: Some(realm_name.clone()),
            ..role
        });
    }
    fake.created(&realm_name, "roles", &id)
}

async fn get_role(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let realm = fake.realm.lock().expect("realm lock");
    match realm.roles.iter().find(|role| role.id.as_deref() == Some(id.as_str())) {
        Some(role) => Json(role).into_response(),
        None => error(StatusCode::NOT_FOUND, "Could not find role"),
    }
}

async fn update_role(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
    Json(update): Json<RoleUpdate>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    match realm.roles.iter_mut().find(|role| role.id.as_deref() == Some(id.as_str())) {
        Some(role) => {
            if let Some(name) = update.name {
                role.name = name;
            }
            role.description = update.description.or(role.description.take());
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Could not find role"),
    }
}

async fn delete_role(
    State(fake): State<FakeKeycloak>,
    Path((_, id)): Path<(String, String)>,
) -> Response {
    let mut realm = fake.realm.lock().expect("realm lock");
    let before = realm.roles.len();
    realm.roles.retain(|role| role.id.as_deref() != Some(id.as_str()));
    if realm.roles.len() == before {
        return error(StatusCode::NOT_FOUND, "Could not find role");
    }
    StatusCode::NO_CONTENT.into_response()
}
