//! Document Store Client
//!
//! The only storage contract: read/write JSON documents by collection and
//! query them by field equality. [`DocumentRepository`] maps the domain
//! repositories onto it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entity::{role::Role, session_settings::SessionSettings, user::User};
use crate::domain::repository::{RoleRepository, SessionSettingsRepository, UserRepository};
use crate::domain::value_object::{Email, RoleId, UserId};
use crate::error::AccessResult;

/// Collection names
pub mod collections {
    pub const USERS: &str = "users";
    pub const ROLES: &str = "roles";
    pub const CREDENTIALS: &str = "credentials";
    pub const IDP_SESSIONS: &str = "idp_sessions";
    pub const SESSION_SETTINGS: &str = "session_settings";
    pub const MAIL_OUTBOX: &str = "mail_outbox";
}

/// Document store client trait
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AccessResult<Option<Value>>;

    /// Documents whose top-level `field` equals `value`, ordered by id
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> AccessResult<Vec<Value>>;

    /// Every document of a collection, ordered by id
    async fn list(&self, collection: &str) -> AccessResult<Vec<Value>>;

    /// Insert or replace
    async fn put(&self, collection: &str, id: &str, document: Value) -> AccessResult<()>;

    /// Returns whether a document was deleted
    async fn delete(&self, collection: &str, id: &str) -> AccessResult<bool>;
}

pub(crate) fn encode<T: Serialize>(document: &T) -> AccessResult<Value> {
    Ok(serde_json::to_value(document)?)
}

pub(crate) fn decode<T: DeserializeOwned>(document: Value) -> AccessResult<T> {
    Ok(serde_json::from_value(document)?)
}

pub(crate) fn decode_all<T: DeserializeOwned>(documents: Vec<Value>) -> AccessResult<Vec<T>> {
    documents.into_iter().map(decode).collect()
}

/// Domain repositories over any [`DocumentStore`]
pub struct DocumentRepository<S> {
    store: Arc<S>,
}

impl<S> DocumentRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S> Clone for DocumentRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> UserRepository for DocumentRepository<S>
where
    S: DocumentStore + Send + Sync,
{
    async fn find_user(&self, user_id: &UserId) -> AccessResult<Option<User>> {
        self.store
            .get(collections::USERS, user_id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> AccessResult<Option<User>> {
        let found = self
            .store
            .find_by_field(collections::USERS, "email", &Value::from(email.as_str()))
            .await?;
        found.into_iter().next().map(decode).transpose()
    }

    async fn list_users(&self) -> AccessResult<Vec<User>> {
        decode_all(self.store.list(collections::USERS).await?)
    }

    async fn save_user(&self, user: &User) -> AccessResult<()> {
        self.store
            .put(collections::USERS, user.id.as_str(), encode(user)?)
            .await
    }
}

impl<S> RoleRepository for DocumentRepository<S>
where
    S: DocumentStore + Send + Sync,
{
    async fn find_role(&self, role_id: &RoleId) -> AccessResult<Option<Role>> {
        self.store
            .get(collections::ROLES, role_id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> AccessResult<Option<Role>> {
        let found = self
            .store
            .find_by_field(collections::ROLES, "name", &Value::from(name))
            .await?;
        found.into_iter().next().map(decode).transpose()
    }

    async fn find_default_role(&self) -> AccessResult<Option<Role>> {
        let found = self
            .store
            .find_by_field(collections::ROLES, "isDefault", &Value::Bool(true))
            .await?;
        found.into_iter().next().map(decode).transpose()
    }

    async fn list_roles(&self) -> AccessResult<Vec<Role>> {
        decode_all(self.store.list(collections::ROLES).await?)
    }

    async fn save_role(&self, role: &Role) -> AccessResult<()> {
        self.store
            .put(collections::ROLES, role.id.as_str(), encode(role)?)
            .await
    }

    async fn delete_role(&self, role_id: &RoleId) -> AccessResult<bool> {
        self.store.delete(collections::ROLES, role_id.as_str()).await
    }
}

impl<S> SessionSettingsRepository for DocumentRepository<S>
where
    S: DocumentStore + Send + Sync,
{
    async fn find_session_settings(&self, user_id: &UserId) -> AccessResult<Option<SessionSettings>> {
        self.store
            .get(collections::SESSION_SETTINGS, user_id.as_str())
            .await?
            .map(decode)
            .transpose()
    }

    async fn save_session_settings(&self, settings: &SessionSettings) -> AccessResult<()> {
        self.store
            .put(
                collections::SESSION_SETTINGS,
                settings.user_id.as_str(),
                encode(settings)?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::policy::Policy;
    use crate::domain::value_object::{Action, Subject};
    use crate::infra::memory::MemoryDocumentStore;

    fn repo() -> DocumentRepository<MemoryDocumentStore> {
        DocumentRepository::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn test_role_roundtrip_and_default_lookup() {
        let repo = repo();
        let subscriber =
            Role::new("subscriber", "", vec![Policy::can(Action::Read, Subject::User)]).as_default();
        let admin = Role::new("admin", "", vec![Policy::can(Action::Manage, Subject::All)]);
        repo.save_role(&subscriber).await.unwrap();
        repo.save_role(&admin).await.unwrap();

        assert_eq!(repo.find_role(&subscriber.id).await.unwrap(), Some(subscriber.clone()));
        assert_eq!(repo.find_role_by_name("admin").await.unwrap(), Some(admin.clone()));
        assert_eq!(repo.find_default_role().await.unwrap(), Some(subscriber));
        assert_eq!(repo.list_roles().await.unwrap().len(), 2);

        assert!(repo.delete_role(&admin.id).await.unwrap());
        assert!(!repo.delete_role(&admin.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_user_lookup_by_email() {
        let repo = repo();
        let user = User::new(UserId::new(), Email::new("a@example.com").unwrap(), None);
        repo.save_user(&user).await.unwrap();

        let found = repo
            .find_user_by_email(&Email::new("A@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(user));
        assert!(repo.find_user(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let repo = repo();
        DocumentStore::put(
            repo.store().as_ref(),
            collections::ROLES,
            "broken",
            serde_json::json!({ "name": 42 }),
        )
        .await
        .unwrap();

        let result = repo.find_role(&RoleId::from_string("broken")).await;
        assert!(matches!(result, Err(crate::error::AccessError::Serialization(_))));
    }
}
