//! # Realmgate Core
//!
//! Talk to the Keycloak admin REST API on behalf of a gateway.
//!
//! The crate is split in three layers:
//! - **credentials** - the [`TokenSupplier`] owns the admin access token, the refresh
//!   token and their expiry, and keeps them fresh under a single lock
//! - **admin** - the [`AdminClientFactory`] hands out an [`AdminClient`] carrying the
//!   current bearer header, and every reply goes through [`normalize`]
//! - **services** - [`UserService`], [`GroupService`] and [`RoleService`] issue the
//!   CRUD and relationship calls for one realm and return an [`Outcome`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use realmgate_core::{AdminClientFactory, AdminCredentials, KeycloakConfig, Role, RoleService};
//! use url::Url;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KeycloakConfig::new(
//!     Url::parse("http://localhost:8080")?,
//!     AdminCredentials::new("admin", "admin"),
//! )
//! .with_realm("custom");
//!
//! let admin = Arc::new(AdminClientFactory::new(&config)?);
//! let roles = RoleService::new(Arc::clone(&admin), config.realm.clone());
//!
//! // The first call performs the password grant
//! let created = roles.create(&Role::new("editor")).await?;
//! assert_eq!(created.payload.len(), 36);
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every operation returns `Result<Outcome<T>, AdminError>`.
//! [`AdminError::status_code`] gives the HTTP status the gateway should answer with,
//! a failed token exchange surfaces as [`AdminError::AuthExchange`] instead of
//! stopping the process.

mod config;
pub use self::config::*;

mod error;
pub use self::error::*;

mod secret;
pub use self::secret::SecretString;

pub mod credentials;
pub use self::credentials::{CredentialState, TokenSupplier};

pub mod admin;
pub use self::admin::{AdminClient, AdminClientFactory, ProviderReply, id_from_location, normalize};

pub mod domain;
pub use self::domain::{Group, GroupUpdate, Role, RoleUpdate, User, UserUpdate};

pub mod services;
pub use self::services::{GroupService, Outcome, RoleService, UserService};
