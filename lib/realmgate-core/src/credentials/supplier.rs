//! Password and refresh grants against the token endpoint.

use std::time::{Duration, Instant};

use http::StatusCode;
use http::header::CONTENT_TYPE;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::state::{CredentialState, Freshness, TokenGrant};
use crate::{AdminError, KeycloakConfig, RefreshPolicy, SecretString, TokenError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Keeps the admin [`CredentialState`] valid for immediate use.
///
/// All grants run while holding a single lock: concurrent callers wait for the
/// in-flight exchange instead of starting their own, and never observe a
/// half-updated credential.
#[derive(Debug)]
pub struct TokenSupplier {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
    username: String,
    password: SecretString,
    policy: RefreshPolicy,
    window: Duration,
    state: Mutex<CredentialState>,
}

impl TokenSupplier {
    /// Creates a supplier with an uninitialized state.
    ///
    /// No request is sent before the first [`ensure_fresh`](Self::ensure_fresh).
    ///
    /// # Errors
    ///
    /// Fails if the token endpoint URL cannot be built or the HTTP client cannot be created.
    pub fn new(config: &KeycloakConfig) -> Result<Self, AdminError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.token_endpoint()?,
            client_id: config.admin.client_id.clone(),
            username: config.admin.username.clone(),
            password: config.admin.password.clone(),
            policy: config.refresh_policy,
            window: config.refresh_window(),
            state: Mutex::new(CredentialState::default()),
        })
    }

    /// Token endpoint used for the grants.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns an access token valid for immediate use.
    ///
    /// Runs the password grant when the state is empty or expired, the refresh
    /// grant when the [`RefreshPolicy`] asks for it, nothing otherwise.
    /// The lock is released on every exit path, including cancellation.
    ///
    /// # Errors
    ///
    /// Returns the [`TokenError`] of the failed exchange; the state is left untouched.
    pub async fn ensure_fresh(&self) -> Result<SecretString, TokenError> {
        let mut state = self.state.lock().await;

        match state.freshness(self.policy, self.window, Instant::now()) {
            Freshness::Uninitialized => self.init(&mut state).await?,
            Freshness::Stale => self.refresh(&mut state).await?,
            Freshness::Fresh => {}
        }

        Ok(state.access_token())
    }

    /// Current access token, if any, without contacting the token endpoint.
    pub async fn current_token(&self) -> Option<SecretString> {
        let state = self.state.lock().await;
        state.is_initialized().then(|| state.access_token())
    }

    /// Expiry of the current access token, if any.
    pub async fn expires_at(&self) -> Option<Instant> {
        self.state.lock().await.expires_at()
    }

    async fn init(&self, state: &mut CredentialState) -> Result<(), TokenError> {
        debug!(endpoint = %self.endpoint, username = %self.username, "requesting admin token with password grant");
        let form = [
            ("client_id", self.client_id.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.expose()),
            ("grant_type", "password"),
        ];
        let grant = self.exchange(&form).await?;
        state.apply(&grant, Instant::now());
        info!(expires_in = grant.expires_in, "admin token acquired");

        Ok(())
    }

    async fn refresh(&self, state: &mut CredentialState) -> Result<(), TokenError> {
        debug!(endpoint = %self.endpoint, "refreshing admin token");
        let refresh_token = SecretString::new(state.refresh_token());
        let form = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose()),
        ];
        let grant = self.exchange(&form).await?;
        state.apply(&grant, Instant::now());
        debug!(expires_in = grant.expires_in, "admin token refreshed");

        Ok(())
    }

    async fn exchange(&self, form: &[(&str, &str)]) -> Result<TokenGrant, TokenError> {
        let body = SecretString::new(serde_urlencoded::to_string(form)?);

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body.expose().to_string())
            .send()
            .await
            .inspect_err(|error| warn!(%error, "token endpoint unreachable"))?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!(%status, %body, "token endpoint rejected the grant");
            return Err(TokenError::Rejected { status, body });
        }

        let grant = serde_json::from_slice::<TokenGrant>(&bytes).map_err(|error| {
            TokenError::InvalidResponse {
                reason: error.to_string(),
            }
        })?;

        if grant.access_token.is_empty() || grant.expires_in == 0 {
            return Err(TokenError::InvalidResponse {
                reason: "empty access_token or zero expires_in".to_string(),
            });
        }

        Ok(grant)
    }
}
