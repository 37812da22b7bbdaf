use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::Context;
use realmgate_core::KeycloakConfig;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const ENV_PREFIX: &str = "REALMGATE_KEYCLOAK";

/// Gateway configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listening address.
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity provider connection.
    pub keycloak: KeycloakConfig,
}

/// Listening address of the gateway.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn addr(self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8081
}

impl GatewayConfig {
    /// Reads the YAML file, then applies the `REALMGATE_KEYCLOAK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or if an override is invalid.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        debug!(?config, "configuration loaded");

        Ok(config)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or missing required keys.
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config = serde_saphyr::from_str(contents)?;
        Ok(config)
    }

    /// Overrides the `keycloak` block with the variables found by `lookup`.
    ///
    /// # Errors
    ///
    /// Fails if the URL override is not a valid URL.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}_{suffix}"));
        let keycloak = &mut self.keycloak;

        if let Some(url) = var("URL") {
            keycloak.url = Url::parse(&url).with_context(|| format!("invalid {ENV_PREFIX}_URL {url}"))?;
        }
        if let Some(realm) = var("REALM") {
            keycloak.realm = realm;
        }
        if let Some(realm) = var("ADMIN_REALM") {
            keycloak.admin.realm = realm;
        }
        if let Some(client_id) = var("ADMIN_CLIENT_ID") {
            keycloak.admin.client_id = client_id;
        }
        if let Some(username) = var("ADMIN_USERNAME") {
            keycloak.admin.username = username;
        }
        if let Some(password) = var("ADMIN_PASSWORD") {
            keycloak.admin.password = password.into();
        }

        Ok(())
    }
}
