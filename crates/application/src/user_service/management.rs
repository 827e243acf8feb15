use tracing::info;

use wqp_domain::validate_role_label;

use super::*;

impl UserService {
    /// Replaces a user's username, email and legacy role label.
    ///
    /// Relational role memberships are not touched.
    pub async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User> {
        let username = Username::new(input.username)?;
        let email = parse_optional_email(input.email)?;
        let role_label = validate_role_label(&input.role_label)?;

        self.ensure_username_available(&username, Some(user_id))
            .await?;

        let user = self
            .user_repository
            .update_user(
                user_id,
                UserRecordUpdate {
                    username,
                    email,
                    role_label,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        info!(user_id = %user_id, "user updated");
        Ok(user)
    }

    /// Deletes a user and its role memberships.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        if !self.user_repository.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        info!(user_id = %user_id, "user deleted");
        Ok(())
    }
}
