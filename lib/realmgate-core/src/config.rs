use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::{AdminError, SecretString};

const DEFAULT_ADMIN_REALM: &str = "master";
const DEFAULT_CLIENT_ID: &str = "admin-cli";
const DEFAULT_TARGET_REALM: &str = "custom";
const DEFAULT_REFRESH_WINDOW_SECS: u64 = 5 * 60;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// When the [`TokenSupplier`](crate::TokenSupplier) refreshes a still valid token.
///
/// Whatever the policy, an empty or already expired token triggers a password grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Refresh once the token is inside the refresh window (expires within it).
    #[default]
    NearExpiry,
    /// Refresh while the token is still *outside* the refresh window, keep it once inside.
    ///
    /// Reproduces the historical gateway behavior, kept for compatibility.
    Legacy,
}

/// Credentials of the administrative account used by the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdminCredentials {
    /// Realm the admin account lives in.
    #[serde(default = "default_admin_realm")]
    pub realm: String,
    /// Public client used for the password grant.
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: SecretString,
}

impl AdminCredentials {
    /// Credentials for the `master` realm through the `admin-cli` client.
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            realm: default_admin_realm(),
            client_id: default_client_id(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Sets the realm the admin account lives in.
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Sets the client id used for the grants.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

/// Connection to the Keycloak server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeycloakConfig {
    /// Server URL, e.g. `http://localhost:8080`.
    pub url: Url,
    /// Administrative account.
    pub admin: AdminCredentials,
    /// Realm manipulated by the resource services.
    #[serde(default = "default_target_realm")]
    pub realm: String,
    /// Refresh policy.
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
    /// Width of the refresh window before expiry, in seconds.
    #[serde(default = "default_refresh_window_secs")]
    pub refresh_window_secs: u64,
    /// Timeout for each outbound request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout for outbound requests, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl KeycloakConfig {
    /// Configuration with default realm, policy and timeouts.
    pub fn new(url: Url, admin: AdminCredentials) -> Self {
        Self {
            url,
            admin,
            realm: default_target_realm(),
            refresh_policy: RefreshPolicy::default(),
            refresh_window_secs: DEFAULT_REFRESH_WINDOW_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Sets the realm manipulated by the resource services.
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Sets the refresh policy.
    #[must_use]
    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Sets the refresh window.
    #[must_use]
    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window_secs = window.as_secs();
        self
    }

    /// Sets the outbound request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Refresh window as a [`Duration`].
    pub fn refresh_window(&self) -> Duration {
        Duration::from_secs(self.refresh_window_secs)
    }

    /// Outbound request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `{url}/realms/{admin realm}/protocol/openid-connect/token`
    ///
    /// # Errors
    ///
    /// Fails if the server URL cannot carry a path (e.g. `mailto:`).
    pub fn token_endpoint(&self) -> Result<Url, AdminError> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| AdminError::InvalidUrl {
                url: self.url.to_string(),
            })?
            .pop_if_empty()
            .extend([
                "realms",
                self.admin.realm.as_str(),
                "protocol",
                "openid-connect",
                "token",
            ]);
        Ok(url)
    }
}

fn default_admin_realm() -> String {
    DEFAULT_ADMIN_REALM.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_target_realm() -> String {
    DEFAULT_TARGET_REALM.to_string()
}

fn default_refresh_window_secs() -> u64 {
    DEFAULT_REFRESH_WINDOW_SECS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
