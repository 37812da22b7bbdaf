//! Collapse admin API replies into a uniform outcome.

use bytes::Bytes;
use http::header::LOCATION;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::AdminError;

/// Keycloak ids are UUIDs: the last 36 characters of the `Location` header.
const ID_LENGTH: usize = 36;

/// Keys Keycloak uses for error messages, most specific first.
const MESSAGE_KEYS: [&str; 3] = ["errorMessage", "error_description", "error"];

/// A successful admin API reply, with its body already read.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ProviderReply {
    /// Status returned by the admin API.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Fails if the body is not the expected representation.
    pub fn json<T>(&self) -> Result<T, AdminError>
    where
        T: DeserializeOwned,
    {
        let result = serde_json::from_slice(&self.body)?;
        Ok(result)
    }

    /// Id of the entity created by this reply.
    ///
    /// # Errors
    ///
    /// Fails with [`AdminError::UnexpectedStatus`] unless the status is `201 Created`,
    /// and with [`AdminError::InvalidLocation`] when the `Location` header is unusable.
    pub fn created_id(&self) -> Result<String, AdminError> {
        if self.status != StatusCode::CREATED {
            warn!(status = %self.status, "unexpected status code for a create");
            return Err(AdminError::UnexpectedStatus {
                status: self.status,
            });
        }

        let location = self.header(LOCATION).unwrap_or_default();
        id_from_location(location)
    }
}

/// Turns the result of an admin call into a [`ProviderReply`] or an [`AdminError`].
///
/// | result                         | outcome                                  |
/// |--------------------------------|------------------------------------------|
/// | response with a 2xx status     | `Ok`, status of the response             |
/// | response with an error status  | [`AdminError::Provider`] with its status |
/// | error carrying a status        | [`AdminError::Provider`] with that status|
/// | transport error                | [`AdminError::Transport`] (500)          |
///
/// The body is always read, so the connection goes back to the pool whatever the outcome.
///
/// # Errors
///
/// See the table above.
pub async fn normalize(
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<ProviderReply, AdminError> {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            return Err(match error.status() {
                Some(status) => AdminError::Provider {
                    status,
                    message: error.to_string(),
                },
                None => {
                    warn!(%error, "admin call failed");
                    AdminError::Transport(error)
                }
            });
        }
    };

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    debug!(%status, size = body.len(), "admin call replied");

    if status.is_success() {
        Ok(ProviderReply {
            status,
            headers,
            body,
        })
    } else {
        let message = provider_message(status, &body);
        debug!(%status, %message, "admin call rejected");
        Err(AdminError::Provider { status, message })
    }
}

/// Extracts the entity id from a `Location` header: its trailing 36 characters.
///
/// ```
/// # use realmgate_core::id_from_location;
/// let location = "http://kc/admin/realms/r/roles-by-id/3fa85f64-5717-4562-b3fc-2c963f66afa6";
/// assert_eq!(
///     id_from_location(location).unwrap(),
///     "3fa85f64-5717-4562-b3fc-2c963f66afa6"
/// );
/// ```
///
/// # Errors
///
/// Fails if the header is shorter than an id.
pub fn id_from_location(location: &str) -> Result<String, AdminError> {
    location
        .len()
        .checked_sub(ID_LENGTH)
        .and_then(|start| location.get(start..))
        .map(ToString::to_string)
        .ok_or_else(|| AdminError::InvalidLocation {
            location: location.to_string(),
        })
}

fn provider_message(status: StatusCode, body: &[u8]) -> String {
    let from_body = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        MESSAGE_KEYS
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(String::from))
    });

    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("identity provider error")
            .to_string()
    })
}
