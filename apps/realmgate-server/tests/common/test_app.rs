#![allow(dead_code, missing_docs, clippy::expect_used)]
use std::time::Duration;

use anyhow::Context;
use backon::{ExponentialBuilder, Retryable};
use realmgate_core::{AdminCredentials, KeycloakConfig};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use realmgate_server::launch;

use super::fake_keycloak::{ADMIN_PASSWORD, ADMIN_USERNAME, FakeKeycloak};

/// A gateway bound to an ephemeral port, talking to its own [`FakeKeycloak`].
#[derive(Debug, derive_more::Deref)]
pub struct TestApp {
    #[deref]
    client: reqwest::Client,
    base: String,
    keycloak: FakeKeycloak,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(|config| config).await
    }

    /// Starts the gateway with a tweaked provider configuration.
    pub async fn start_with(
        customize: impl FnOnce(KeycloakConfig) -> KeycloakConfig,
    ) -> anyhow::Result<Self> {
        let keycloak = FakeKeycloak::start().await.context("starting fake keycloak")?;
        let config = customize(
            KeycloakConfig::new(
                Url::parse(keycloak.url())?,
                AdminCredentials::new(ADMIN_USERNAME, ADMIN_PASSWORD),
            )
            .with_realm("custom")
            .with_timeout(Duration::from_secs(2)),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding gateway listener")?;
        let addr = listener.local_addr()?;
        info!(?listener, "launching gateway");
        tokio::spawn(async move {
            launch(listener, &config).await.expect("gateway launched");
        });

        let app = Self {
            client: reqwest::Client::new(),
            base: format!("http://{addr}"),
            keycloak,
        };
        app.wait_until_healthy().await?;

        Ok(app)
    }

    async fn wait_until_healthy(&self) -> anyhow::Result<()> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(500))
            .with_max_times(10);

        let health_check = || async move {
            let response = self.client.get(self.url("/api/v1/health")).send().await?;
            response.error_for_status()
        };
        health_check
            .retry(backoff)
            .notify(|error, delay| debug!(%error, ?delay, "gateway not yet healthy"))
            .await
            .context("waiting for gateway health")?;

        Ok(())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub fn keycloak(&self) -> &FakeKeycloak {
        &self.keycloak
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> anyhow::Result<reqwest::Response> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(response)
    }

    pub async fn put_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> anyhow::Result<reqwest::Response> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Ok(response)
    }

    /// Creates a resource and returns the id from the `CreatedResponse`.
    pub async fn create(&self, path: &str, body: &impl Serialize) -> anyhow::Result<String> {
        let response = self.post_json(path, body).await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "expected 201 on {path}, got {}",
            response.status()
        );
        let created = response.json::<realmgate_server::CreatedResponse>().await?;
        Ok(created.id)
    }
}
