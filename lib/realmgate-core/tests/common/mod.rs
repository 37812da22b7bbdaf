#![allow(dead_code, missing_docs, clippy::expect_used)]

use std::time::Duration;

use serde_json::json;
use tracing::info;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realmgate_core::{AdminCredentials, KeycloakConfig, RefreshPolicy};

pub const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
pub const ACCESS_TOKEN: &str = "admin-access-token";
pub const REFRESHED_TOKEN: &str = "admin-refreshed-token";
pub const ROLE_ID: &str = "a1b2c3d4-e5f6-4711-8899-aabbccddeeff";

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

pub fn config(server: &MockServer) -> KeycloakConfig {
    let url = Url::parse(&server.uri()).expect("mock server url");
    KeycloakConfig::new(url, AdminCredentials::new("admin", "admin"))
        .with_realm("custom")
        .with_timeout(Duration::from_secs(1))
}

pub fn legacy_config(server: &MockServer) -> KeycloakConfig {
    config(server).with_refresh_policy(RefreshPolicy::Legacy)
}

pub fn grant(access_token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "expires_in": expires_in,
        "refresh_expires_in": 1800,
        "refresh_token": format!("{access_token}-refresh"),
        "token_type": "Bearer",
        "not-before-policy": 0,
        "session_state": "0c2f7c1e-3b5a-4c1e-9a65-0c7d41f6d0aa",
        "scope": "profile email"
    }))
}

/// Password grant answering `access_token`, expected `times` times.
pub async fn mount_password_grant(server: &MockServer, access_token: &str, expires_in: u64, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .respond_with(grant(access_token, expires_in))
        .expect(times)
        .mount(server)
        .await;
}

pub fn created(server: &MockServer, collection: &str, id: &str) -> ResponseTemplate {
    let location = format!("{}/admin/realms/custom/{collection}/{id}", server.uri());
    ResponseTemplate::new(201).insert_header("Location", location.as_str())
}
