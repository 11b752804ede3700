use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::repositories::{RepositoryError, UserRepository};
use crate::infrastructure::auth::{IdentityError, IdentityVerifier, JwtError, JwtService};

/// Sign in input
pub struct SignInInput {
    pub id_token: String,
}

/// Sign in output
pub struct SignInOutput {
    pub user: User,
    pub token: String,
}

/// Sign in use case.
///
/// Verifies the provider token, upserts the profile and issues an app token.
/// The upsert refreshes email, display name and avatar from the provider but
/// never touches `nickname`: that field belongs to the user once the profile
/// exists.
pub struct SignIn<U: UserRepository> {
    user_repo: Arc<U>,
    identity: Arc<dyn IdentityVerifier>,
    jwt_service: Arc<JwtService>,
}

impl<U: UserRepository> SignIn<U> {
    pub fn new(
        user_repo: Arc<U>,
        identity: Arc<dyn IdentityVerifier>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            identity,
            jwt_service,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> Result<SignInOutput, SignInError> {
        if input.id_token.is_empty() {
            return Err(SignInError::Validation("Token is required".into()));
        }

        let verified = self.identity.verify_id_token(&input.id_token).await?;

        let user = match self.user_repo.find_by_id(&verified.id).await? {
            Some(mut existing) => {
                existing.email = verified.email;
                existing.display_name = verified.display_name;
                existing.avatar_url = verified.avatar_url;
                existing.updated_at = chrono::Utc::now().timestamp();
                self.user_repo.save(&existing).await?;
                existing
            }
            None => {
                let user = User::new(
                    verified.id,
                    verified.email,
                    verified.display_name,
                    verified.avatar_url,
                );
                self.user_repo.save(&user).await?;
                user
            }
        };

        let token = self.jwt_service.sign(&user.id, &user.nickname)?;

        Ok(SignInOutput { user, token })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("Token error: {0}")]
    Jwt(#[from] JwtError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
