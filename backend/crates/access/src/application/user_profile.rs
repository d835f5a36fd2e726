//! User Profiles

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::{AccessError, AccessResult};

const DISPLAY_NAME_MAX_LENGTH: usize = 64;

pub struct UserProfileUseCase<R> {
    repo: Arc<R>,
}

impl<R> UserProfileUseCase<R>
where
    R: UserRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AccessResult<Vec<User>> {
        self.repo.list_users().await
    }

    pub async fn get(&self, user_id: &UserId) -> AccessResult<User> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or(AccessError::UserNotFound)
    }

    /// Blank display names clear the field
    pub async fn update(&self, user_id: &UserId, display_name: Option<String>) -> AccessResult<User> {
        if let Some(name) = &display_name {
            if name.trim().chars().count() > DISPLAY_NAME_MAX_LENGTH {
                return Err(AccessError::Validation(format!(
                    "Display name must be at most {DISPLAY_NAME_MAX_LENGTH} characters"
                )));
            }
        }

        let mut user = self.get(user_id).await?;
        user.rename(display_name);
        self.repo.save_user(&user).await?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::Email;
    use crate::infra::{document::DocumentRepository, memory::MemoryDocumentStore};

    #[tokio::test]
    async fn test_profile_update() {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        let user = User::new(UserId::new(), Email::new("p@example.com").unwrap(), None);
        repo.save_user(&user).await.unwrap();
        let use_case = UserProfileUseCase::new(Arc::new(repo));

        let renamed = use_case.update(&user.id, Some(" Pat ".to_string())).await.unwrap();
        assert_eq!(renamed.display_name.as_deref(), Some("Pat"));

        let cleared = use_case.update(&user.id, Some("   ".to_string())).await.unwrap();
        assert_eq!(cleared.display_name, None);

        assert!(matches!(
            use_case.update(&user.id, Some("x".repeat(65))).await,
            Err(AccessError::Validation(_))
        ));
        assert!(matches!(
            use_case.get(&UserId::new()).await,
            Err(AccessError::UserNotFound)
        ));
        assert_eq!(use_case.list().await.unwrap().len(), 1);
    }
}
