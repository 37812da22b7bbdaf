use std::sync::Arc;

use http::Method;
use tracing::{debug, info};

use super::Outcome;
use crate::{AdminClientFactory, AdminError, Role, RoleUpdate};

const ROLES: &str = "roles";
const ROLES_BY_ID: &str = "roles-by-id";

/// Realm roles.
///
/// Roles are listed by name but addressed by id: reads, updates and deletes
/// go through `roles-by-id/{id}`.
#[derive(Debug, Clone)]
pub struct RoleService {
    admin: Arc<AdminClientFactory>,
    realm: String,
}

impl RoleService {
    /// Creates a service for `realm`.
    pub fn new(admin: Arc<AdminClientFactory>, realm: impl Into<String>) -> Self {
        Self {
            admin,
            realm: realm.into(),
        }
    }

    /// Realm handled by this service.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// All realm roles, in provider order.
    ///
    /// # Errors
    ///
    /// Fails if the list call fails.
    pub async fn list(&self) -> Result<Outcome<Vec<Role>>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[ROLES])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// `GET roles-by-id/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the role does not exist.
    pub async fn get(&self, role_id: &str) -> Result<Outcome<Role>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[ROLES_BY_ID, role_id])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// First role named exactly `name`, if any.
    ///
    /// # Errors
    ///
    /// Fails if the list call fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Outcome<Option<Role>>, AdminError> {
        let roles = self.list().await?;
        Ok(roles.map(|roles| roles.into_iter().find(|role| role.name == name)))
    }

    /// Succeeds when no role is named `name`.
    ///
    /// # Errors
    ///
    /// Fails with [`AdminError::Conflict`] if the name is taken, or if the list call fails.
    pub async fn check_name(&self, name: &str) -> Result<(), AdminError> {
        let found = self.find_by_name(name).await?;
        match found.payload {
            Some(_) => Err(AdminError::Conflict {
                kind: "role",
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Creates a role and returns its id.
    ///
    /// The name is checked against the current roles first, so a duplicate is
    /// rejected without a create call. The check and the create are two calls:
    /// a concurrent create can still win and surface as the provider's 409.
    ///
    /// # Errors
    ///
    /// Fails with [`AdminError::Conflict`] if the name is taken, or
    /// [`AdminError::UnexpectedStatus`] if the provider does not answer `201 Created`.
    pub async fn create(&self, role: &Role) -> Result<Outcome<String>, AdminError> {
        self.check_name(&role.name).await?;
        debug!(realm = %self.realm, name = %role.name, "role name is available");

        let client = self.admin.client().await?;
        let request = client
            .request(Method::POST, &self.realm, &[ROLES])?
            .json(role);
        let reply = client.send(request).await?;
        let id = reply.created_id()?;
        info!(realm = %self.realm, name = %role.name, %id, "role created");

        Ok(Outcome::new(reply.status(), id))
    }

    /// Applies a partial update, returns it with its id.
    ///
    /// Only the fields present in `update` are sent.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the role does not exist.
    pub async fn update(
        &self,
        role_id: &str,
        update: RoleUpdate,
    ) -> Result<Outcome<RoleUpdate>, AdminError> {
        let client = self.admin.client().await?;
        let request = client
            .request(Method::PUT, &self.realm, &[ROLES_BY_ID, role_id])?
            .json(&update);
        let reply = client.send(request).await?;

        let updated = RoleUpdate {
            id: Some(role_id.to_string()),
            ..update
        };
        Ok(Outcome::new(reply.status(), updated))
    }

    /// `DELETE roles-by-id/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the role does not exist.
    pub async fn delete(&self, role_id: &str) -> Result<Outcome<()>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::DELETE, &self.realm, &[ROLES_BY_ID, role_id])?;
        let reply = client.send(request).await?;
        info!(realm = %self.realm, %role_id, "role deleted");

        Ok(Outcome::status_only(reply.status()))
    }
}
