//! Admin credential lifecycle.
//!
//! The [`TokenSupplier`] authenticates with the password grant on first use and keeps
//! the [`CredentialState`] fresh with the refresh grant, according to the configured
//! [`RefreshPolicy`](crate::RefreshPolicy).

mod state;
mod supplier;

pub use self::state::CredentialState;
pub use self::supplier::TokenSupplier;
