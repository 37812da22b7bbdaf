//! Realmgate HTTP gateway.
//!
//! Exposes user, group and role management of one Keycloak realm under `/api/v1`,
//! on top of the services of [`realmgate_core`].
use std::net::SocketAddr;

use anyhow::Context;
use realmgate_core::KeycloakConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

mod api;
mod errors;
mod extractors;
mod openapi;
mod routes;
mod state;

pub mod config;

pub use self::api::CreatedResponse;
pub use self::errors::ApiErrorResponse;
pub use self::openapi::ApiDoc;
pub use self::state::AppState;

use self::routes::app_router;

/// Launch the server
///
/// # Errors
///
/// fail if the socket cannot be created (e.g. port already used)
/// fail if the server cannot be launch
pub async fn run(addr: SocketAddr, config: &KeycloakConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("opening {addr}"))?;
    info!("Using address {addr}");

    launch(listener, config).await
}

/// Launch the server on an already bound listener
///
/// # Errors
///
/// fail if the state cannot be built
/// fail if the server cannot be launch
pub async fn launch(listener: tokio::net::TcpListener, config: &KeycloakConfig) -> anyhow::Result<()> {
    let state = AppState::new(config).context("create state")?;
    let app = app_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    axum::serve(listener, app.into_make_service())
        .await
        .context("starting server")?;

    Ok(())
}
