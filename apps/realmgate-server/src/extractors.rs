//! Request body binding.

use axum::Json;
use axum::extract::{FromRequest, Request};
use realmgate_core::{Group, GroupUpdate, Role, RoleUpdate, User, UserUpdate};
use serde::de::DeserializeOwned;

use crate::errors::ApiError;

/// Checks a bound payload before it reaches the provider.
pub(crate) trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn not_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be blank")));
    }
    Ok(())
}

fn not_blank_if_present(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    value.map_or(Ok(()), |value| not_blank(field, value))
}

impl Validate for User {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank("username", &self.username)
    }
}

impl Validate for Group {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank("name", &self.name)
    }
}

impl Validate for Role {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank("name", &self.name)
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank_if_present("username", self.username.as_deref())
    }
}

impl Validate for GroupUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank_if_present("name", self.name.as_deref())
    }
}

impl Validate for RoleUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        not_blank_if_present("name", self.name.as_deref())
    }
}

/// JSON body, rejected with 400 and the error envelope when malformed or invalid.
pub(crate) struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        value.validate()?;

        Ok(Self(value))
    }
}
