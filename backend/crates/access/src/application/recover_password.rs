//! Password Recovery Use Case
//!
//! Request: queue a one-time reset token for the address. Confirm: set the
//! new password and end every session of the account.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::identity::IdentityProvider;
use crate::domain::value_object::{Email, UserId};
use crate::error::AccessResult;

pub struct RecoverPasswordUseCase<I> {
    identity: Arc<I>,
}

impl<I> RecoverPasswordUseCase<I>
where
    I: IdentityProvider + Send + Sync,
{
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    /// Succeeds for unknown addresses so accounts cannot be enumerated
    pub async fn request(&self, email: &str) -> AccessResult<()> {
        let email = Email::new(email)?;
        self.identity.send_password_reset(&email).await
    }

    /// ## Errors
    /// * `PasswordPolicy` - the new password is rejected
    /// * `InvalidResetToken` - unknown, used or expired token
    pub async fn confirm(&self, reset_token: &str, new_password: String) -> AccessResult<UserId> {
        let password = ClearTextPassword::new(new_password)?;
        let user_id = self
            .identity
            .confirm_password_reset(reset_token, &password)
            .await?;

        tracing::info!(user_id = %user_id, "Password recovered");
        Ok(user_id)
    }
}
