use http::header::AUTHORIZATION;
use http::{HeaderValue, Method};
use reqwest::RequestBuilder;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use super::normalize::{ProviderReply, normalize};
use crate::{AdminError, KeycloakConfig, TokenError, TokenSupplier};

/// Supplies [`AdminClient`]s carrying a valid bearer credential.
///
/// The underlying HTTP client is built on first use and shared by every handle.
/// A single factory is meant to live for the whole process, shared behind an `Arc`.
#[derive(Debug)]
pub struct AdminClientFactory {
    config: KeycloakConfig,
    tokens: TokenSupplier,
    http: OnceCell<reqwest::Client>,
}

impl AdminClientFactory {
    /// Creates the factory and its [`TokenSupplier`].
    ///
    /// # Errors
    ///
    /// Fails if the configured server URL cannot be used.
    pub fn new(config: &KeycloakConfig) -> Result<Self, AdminError> {
        let tokens = TokenSupplier::new(config)?;
        Ok(Self {
            config: config.clone(),
            tokens,
            http: OnceCell::new(),
        })
    }

    /// The token supplier shared by all handles.
    pub fn tokens(&self) -> &TokenSupplier {
        &self.tokens
    }

    /// Returns a client stamped with a fresh bearer header.
    ///
    /// May run a token grant first, see [`TokenSupplier::ensure_fresh`].
    ///
    /// # Errors
    ///
    /// Fails with [`AdminError::AuthExchange`] if no valid token can be obtained.
    pub async fn client(&self) -> Result<AdminClient, AdminError> {
        let token = self.tokens.ensure_fresh().await?;

        let mut bearer = HeaderValue::try_from(format!("Bearer {}", token.expose())).map_err(
            |_| TokenError::InvalidResponse {
                reason: "access token is not a valid header value".to_string(),
            },
        )?;
        bearer.set_sensitive(true);

        let http = self
            .http
            .get_or_try_init(|| async {
                debug!(base = %self.config.url, "building admin HTTP client");
                reqwest::Client::builder()
                    .timeout(self.config.timeout())
                    .connect_timeout(self.config.connect_timeout())
                    .build()
            })
            .await?
            .clone();

        Ok(AdminClient {
            http,
            base: self.config.url.clone(),
            bearer,
        })
    }
}

/// Handle on the admin API, bound to the server URL and a bearer header.
///
/// Cheap to clone, obtained from [`AdminClientFactory::client`].
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
    bearer: HeaderValue,
}

impl AdminClient {
    /// `{url}/admin/realms/{realm}/{segments...}`, each segment percent-encoded.
    ///
    /// # Errors
    ///
    /// Fails if the server URL cannot carry a path.
    pub fn url(&self, realm: &str, segments: &[&str]) -> Result<Url, AdminError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AdminError::InvalidUrl {
                url: self.base.to_string(),
            })?
            .pop_if_empty()
            .extend(["admin", "realms", realm])
            .extend(segments);
        Ok(url)
    }

    /// Prepares a request on an admin URL, with the bearer header.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built.
    pub fn request(
        &self,
        method: Method,
        realm: &str,
        segments: &[&str],
    ) -> Result<RequestBuilder, AdminError> {
        self.request_with_query(method, realm, segments, &[])
    }

    /// Same as [`request`](Self::request), with query parameters.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be built.
    pub fn request_with_query(
        &self,
        method: Method,
        realm: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, AdminError> {
        let mut url = self.url(realm, segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!(%method, %url, "admin call");
        let builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.bearer.clone());
        Ok(builder)
    }

    /// Sends a request and normalizes the reply.
    ///
    /// # Errors
    ///
    /// See [`normalize`].
    pub async fn send(&self, request: RequestBuilder) -> Result<ProviderReply, AdminError> {
        normalize(request.send().await).await
    }
}
