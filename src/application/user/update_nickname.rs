use std::sync::Arc;

use crate::domain::entities::User;
use crate::domain::repositories::{RepositoryError, UserRepository};

const MAX_NICKNAME_LEN: usize = 40;

/// Update nickname input
pub struct UpdateNicknameInput {
    pub user_id: String,
    pub nickname: String,
}

/// Update nickname use case.
///
/// The new name reaches room boards lazily: each room's auto-join renames the
/// linked player on the user's next visit.
pub struct UpdateNickname<U: UserRepository> {
    user_repo: Arc<U>,
}

impl<U: UserRepository> UpdateNickname<U> {
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, input: UpdateNicknameInput) -> Result<User, UpdateNicknameError> {
        let nickname = input.nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(UpdateNicknameError::Validation("Nickname is required".into()));
        }
        if nickname.chars().count() > MAX_NICKNAME_LEN {
            return Err(UpdateNicknameError::Validation(format!(
                "Nickname must be at most {MAX_NICKNAME_LEN} characters"
            )));
        }

        let mut user = self
            .user_repo
            .find_by_id(&input.user_id)
            .await?
            .ok_or(UpdateNicknameError::UserNotFound)?;

        user.nickname = nickname;
        user.updated_at = chrono::Utc::now().timestamp();
        self.user_repo.save(&user).await?;

        Ok(user)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateNicknameError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
