use wqp_domain::UserSummary;

use super::*;

impl UserService {
    /// Returns a user by identifier.
    pub async fn get_user(&self, user_id: UserId) -> AppResult<User> {
        self.user_repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Returns a user by username, or `None` when absent.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.user_repository
            .find_user_by_username(username.trim())
            .await
    }

    /// Lists users without credential material.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        Ok(self
            .user_repository
            .list_users()
            .await?
            .iter()
            .map(User::summary)
            .collect())
    }
}
