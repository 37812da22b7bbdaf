use std::sync::Arc;

use http::Method;
use tracing::info;

use super::Outcome;
use crate::{AdminClientFactory, AdminError, Group, GroupUpdate};

const GROUPS: &str = "groups";

/// Top-level groups of a realm.
#[derive(Debug, Clone)]
pub struct GroupService {
    admin: Arc<AdminClientFactory>,
    realm: String,
}

impl GroupService {
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

    /// Creates a group and returns its id.
    ///
    /// # Errors
    ///
    /// Fails with 409 if a sibling group has the same name, or
    /// [`AdminError::UnexpectedStatus`] if the provider does not answer `201 Created`.
    pub async fn create(&self, group: &Group) -> Result<Outcome<String>, AdminError> {
        let client = self.admin.client().await?;
        let request = client
            .request(Method::POST, &self.realm, &[GROUPS])?
            .json(group);
        let reply = client.send(request).await?;
        let id = reply.created_id()?;
        info!(realm = %self.realm, name = %group.name, %id, "group created");

        Ok(Outcome::new(reply.status(), id))
    }

    /// `GET groups/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the group does not exist.
    pub async fn get(&self, group_id: &str) -> Result<Outcome<Group>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[GROUPS, group_id])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// Applies a partial update, returns it with its id.
    ///
    /// Only the fields present in `update` are sent.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the group does not exist.
    pub async fn update(
        &self,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<Outcome<GroupUpdate>, AdminError> {
        let client = self.admin.client().await?;
        let request = client
            .request(Method::PUT, &self.realm, &[GROUPS, group_id])?
            .json(&update);
        let reply = client.send(request).await?;

        let updated = GroupUpdate {
            id: Some(group_id.to_string()),
            ..update
        };
        Ok(Outcome::new(reply.status(), updated))
    }

    /// `DELETE groups/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the group does not exist.
    pub async fn delete(&self, group_id: &str) -> Result<Outcome<()>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::DELETE, &self.realm, &[GROUPS, group_id])?;
        let reply = client.send(request).await?;
        info!(realm = %self.realm, %group_id, "group deleted");

        Ok(Outcome::status_only(reply.status()))
    }

    /// All top-level groups, in provider order.
    ///
    /// # Errors
    ///
    /// Fails if the list call fails.
    pub async fn list(&self) -> Result<Outcome<Vec<Group>>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[GROUPS])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }
}
