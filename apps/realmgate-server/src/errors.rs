use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use realmgate_core::AdminError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

/// API error response returned for all error cases
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, derive_more::Error, derive_more::From, derive_more::Display)]
pub(crate) enum ApiError {
    Admin(AdminError),

    #[display("{message}")]
    #[from(skip)]
    Validation { message: String },
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Admin(error) => error.status_code(),
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(%status, error = ?self, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let error_response = ApiErrorResponse { message };

        (status, Json(error_response)).into_response()
    }
}
