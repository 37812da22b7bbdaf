use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use realmgate_core::{AdminClientFactory, GroupService, KeycloakConfig, RoleService, UserService};
use tracing::info;

/// The application state
#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    #[from_ref(skip)]
    started_at: Instant,
    users: UserService,
    groups: GroupService,
    roles: RoleService,
}

impl AppState {
    /// Create a state, sharing one [`AdminClientFactory`] between the services.
    ///
    /// No call reaches the identity provider before the first request.
    ///
    /// # Errors
    ///
    /// Fail if the admin client factory cannot be built
    pub fn new(config: &KeycloakConfig) -> anyhow::Result<Self> {
        let started_at = Instant::now();
        let admin = Arc::new(
            AdminClientFactory::new(config).context("building admin client factory")?,
        );
        info!(url = %config.url, realm = %config.realm, "identity provider configured");

        Ok(Self {
            started_at,
            users: UserService::new(Arc::clone(&admin), config.realm.clone()),
            groups: GroupService::new(Arc::clone(&admin), config.realm.clone()),
            roles: RoleService::new(admin, config.realm.clone()),
        })
    }
}

impl AppState {
    pub(crate) fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
