//! Session Service
//!
//! Per-user session and refresh token lifetimes.

use std::sync::Arc;

use crate::domain::entity::session_settings::{SessionLifetimes, SessionSettings};
use crate::domain::repository::SessionSettingsRepository;
use crate::domain::value_object::UserId;
use crate::error::{AccessError, AccessResult};

pub struct SessionLifetimeService<R> {
    repo: Arc<R>,
    defaults: SessionLifetimes,
}

impl<R> SessionLifetimeService<R>
where
    R: SessionSettingsRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, defaults: SessionLifetimes) -> Self {
        Self { repo, defaults }
    }

    /// Stored overrides, falling back to the configured defaults
    pub async fn lifetimes_for(&self, user_id: &UserId) -> AccessResult<SessionLifetimes> {
        let lifetimes = self
            .repo
            .find_session_settings(user_id)
            .await?
            .map(|settings| settings.resolve(self.defaults))
            .unwrap_or(self.defaults);
        Ok(lifetimes)
    }

    /// Replace a user's overrides; `None` restores the default
    ///
    /// ## Errors
    /// * `Validation` - a non-positive lifetime
    pub async fn update(
        &self,
        user_id: &UserId,
        session_ttl_secs: Option<i64>,
        refresh_ttl_secs: Option<i64>,
    ) -> AccessResult<SessionLifetimes> {
        for secs in [session_ttl_secs, refresh_ttl_secs].into_iter().flatten() {
            if secs <= 0 {
                return Err(AccessError::Validation(
                    "Session lifetimes must be positive".to_string(),
                ));
            }
        }

        let settings = SessionSettings {
            user_id: user_id.clone(),
            session_ttl_secs,
            refresh_ttl_secs,
        };
        self.repo.save_session_settings(&settings).await?;

        tracing::info!(
            user_id = %user_id,
            session_ttl_secs = ?session_ttl_secs,
            refresh_ttl_secs = ?refresh_ttl_secs,
            "Session settings updated"
        );
        Ok(settings.resolve(self.defaults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{document::DocumentRepository, memory::MemoryDocumentStore};
    use std::time::Duration;

    const DEFAULTS: SessionLifetimes = SessionLifetimes {
        session: Duration::from_secs(3600),
        refresh: Duration::from_secs(604_800),
    };

    fn service() -> SessionLifetimeService<DocumentRepository<MemoryDocumentStore>> {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        SessionLifetimeService::new(Arc::new(repo), DEFAULTS)
    }

    #[tokio::test]
    async fn test_defaults_without_settings() {
        let service = service();
        assert_eq!(service.lifetimes_for(&UserId::new()).await.unwrap(), DEFAULTS);
    }

    #[tokio::test]
    async fn test_override_is_applied() {
        let service = service();
        let user_id = UserId::new();
        service.update(&user_id, Some(900), None).await.unwrap();

        let lifetimes = service.lifetimes_for(&user_id).await.unwrap();
        assert_eq!(lifetimes.session, Duration::from_secs(900));
        assert_eq!(lifetimes.refresh, DEFAULTS.refresh);
    }

    #[tokio::test]
    async fn test_non_positive_update_rejected() {
        let service = service();
        assert!(matches!(
            service.update(&UserId::new(), Some(0), None).await,
            Err(AccessError::Validation(_))
        ));
    }
}
