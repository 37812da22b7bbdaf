use std::sync::Arc;

use http::Method;
use tracing::info;

use super::Outcome;
use crate::{AdminClientFactory, AdminError, Group, User, UserUpdate};

const USERS: &str = "users";
const GROUPS: &str = "groups";

/// Users of a realm, and their group memberships.
#[derive(Debug, Clone)]
pub struct UserService {
    admin: Arc<AdminClientFactory>,
    realm: String,
}

impl UserService {
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

    /// `GET users/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user does not exist.
    pub async fn get(&self, user_id: &str) -> Result<Outcome<User>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[USERS, user_id])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// First user whose username matches exactly, if any.
    ///
    /// # Errors
    ///
    /// Fails if the lookup call fails.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Outcome<Option<User>>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request_with_query(
            Method::GET,
            &self.realm,
            &[USERS],
            &[("username", username), ("exact", "true")],
        )?;
        let reply = client.send(request).await?;
        let users = reply.json::<Vec<User>>()?;

        Ok(Outcome::new(reply.status(), users.into_iter().next()))
    }

    /// All users, in provider order.
    ///
    /// # Errors
    ///
    /// Fails if the list call fails.
    pub async fn list(&self) -> Result<Outcome<Vec<User>>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[USERS])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// Creates a user and returns its id.
    ///
    /// # Errors
    ///
    /// Fails with 409 if the username is taken, or [`AdminError::UnexpectedStatus`]
    /// if the provider does not answer `201 Created`.
    pub async fn create(&self, user: &User) -> Result<Outcome<String>, AdminError> {
        let client = self.admin.client().await?;
        let request = client
            .request(Method::POST, &self.realm, &[USERS])?
            .json(user);
        let reply = client.send(request).await?;
        let id = reply.created_id()?;
        info!(realm = %self.realm, username = %user.username, %id, "user created");

        Ok(Outcome::new(reply.status(), id))
    }

    /// Applies a partial update, returns it with its id.
    ///
    /// Only the fields present in `update` are sent.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user does not exist.
    pub async fn update(
        &self,
        user_id: &str,
        update: UserUpdate,
    ) -> Result<Outcome<UserUpdate>, AdminError> {
        let client = self.admin.client().await?;
        let request = client
            .request(Method::PUT, &self.realm, &[USERS, user_id])?
            .json(&update);
        let reply = client.send(request).await?;

        let updated = UserUpdate {
            id: Some(user_id.to_string()),
            ..update
        };
        Ok(Outcome::new(reply.status(), updated))
    }

    /// `DELETE users/{id}`
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user does not exist.
    pub async fn delete(&self, user_id: &str) -> Result<Outcome<()>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::DELETE, &self.realm, &[USERS, user_id])?;
        let reply = client.send(request).await?;
        info!(realm = %self.realm, %user_id, "user deleted");

        Ok(Outcome::status_only(reply.status()))
    }

    /// Groups the user is a direct member of.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user does not exist.
    pub async fn list_groups(&self, user_id: &str) -> Result<Outcome<Vec<Group>>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(Method::GET, &self.realm, &[USERS, user_id, GROUPS])?;
        let reply = client.send(request).await?;

        Ok(Outcome::new(reply.status(), reply.json()?))
    }

    /// Adds the user to a group. Idempotency is left to the provider.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user or the group does not exist.
    pub async fn join_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Outcome<()>, AdminError> {
        self.membership(Method::PUT, user_id, group_id).await
    }

    /// Removes the user from a group. Idempotency is left to the provider.
    ///
    /// # Errors
    ///
    /// Fails with the provider status, 404 when the user or the group does not exist.
    pub async fn leave_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Outcome<()>, AdminError> {
        self.membership(Method::DELETE, user_id, group_id).await
    }

    async fn membership(
        &self,
        method: Method,
        user_id: &str,
        group_id: &str,
    ) -> Result<Outcome<()>, AdminError> {
        let client = self.admin.client().await?;
        let request = client.request(method, &self.realm, &[USERS, user_id, GROUPS, group_id])?;
        let reply = client.send(request).await?;

        Ok(Outcome::status_only(reply.status()))
    }
}
