use http::StatusCode;

/// Errors raised while exchanging credentials with the token endpoint.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TokenError {
    /// The grant form could not be encoded.
    #[display("cannot encode token request: {_0}")]
    Encode(serde_urlencoded::ser::Error),

    /// The token endpoint could not be reached.
    #[display("token endpoint unreachable: {_0}")]
    Network(reqwest::Error),

    /// The token endpoint answered with a non-200 status.
    #[display("token endpoint answered {status}: {body}")]
    #[from(skip)]
    Rejected {
        /// Status returned by the token endpoint.
        status: StatusCode,
        /// Raw body, usually an OAuth2 error document.
        body: String,
    },

    /// The token endpoint answered 200 with an unusable body.
    #[display("invalid token response: {reason}")]
    #[from(skip)]
    InvalidResponse {
        /// What was wrong with the body.
        reason: String,
    },
}

/// Errors returned by the resource services.
///
/// Use [`AdminError::status_code`] to turn an error into the HTTP status of the gateway reply.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum AdminError {
    /// Acquiring or refreshing the admin token failed.
    #[display("authentication against the identity provider failed: {_0}")]
    AuthExchange(TokenError),

    /// Network-level failure on an admin call (connection refused, timeout, ...).
    #[display("identity provider unreachable: {_0}")]
    Transport(reqwest::Error),

    /// The admin API answered with an error status.
    #[display("{message}")]
    #[from(skip)]
    Provider {
        /// Status returned by the admin API.
        status: StatusCode,
        /// Error message extracted from the reply.
        message: String,
    },

    /// The admin API answered a status the operation does not expect.
    #[display("unexpected status code: {}", status.as_u16())]
    #[from(skip)]
    UnexpectedStatus {
        /// Status returned by the admin API.
        status: StatusCode,
    },

    /// The requested entity does not exist.
    #[display("{kind} {key} not found")]
    #[from(skip)]
    NotFound {
        /// Entity kind (`user`, `group`, `role`).
        kind: &'static str,
        /// Key used for the lookup.
        key: String,
    },

    /// An entity with the same name already exists.
    #[display("{kind} name {name} already exists")]
    #[from(skip)]
    Conflict {
        /// Entity kind (`user`, `group`, `role`).
        kind: &'static str,
        /// Conflicting name.
        name: String,
    },

    /// The `Location` header of a create reply is missing or too short to hold an id.
    #[display("cannot extract an id from Location header {location:?}")]
    #[from(skip)]
    InvalidLocation {
        /// Header value, empty when missing.
        location: String,
    },

    /// The admin API payload does not match the expected representation.
    #[display("invalid identity provider payload: {_0}")]
    Decode(serde_json::Error),

    /// A URL could not be derived from the configured server URL.
    #[display("invalid URL {url}")]
    #[from(skip)]
    InvalidUrl {
        /// Offending URL.
        url: String,
    },
}

impl AdminError {
    /// HTTP status the gateway should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthExchange(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Provider { status, .. } | Self::UnexpectedStatus { status } => {
                if status.is_success() {
                    StatusCode::BAD_GATEWAY
                } else {
                    *status
                }
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Transport(_)
            | Self::InvalidLocation { .. }
            | Self::Decode(_)
            | Self::InvalidUrl { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
