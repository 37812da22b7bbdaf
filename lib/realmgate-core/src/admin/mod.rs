//! Access to the Keycloak admin REST API.

mod client;
mod normalize;

pub use self::client::{AdminClient, AdminClientFactory};
pub use self::normalize::{ProviderReply, id_from_location, normalize};
