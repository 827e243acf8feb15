use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, credential_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error(error, "find user by id"))?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn find_user_by_username_impl(
        &self,
        username: &str,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, credential_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error(error, "find user by username"))?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn list_users_impl(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, credential_hash, role, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list users"))?;

        rows.into_iter().map(User::try_from).collect()
    }

    pub(super) async fn find_missing_user_ids_impl(
        &self,
        user_ids: &[UserId],
    ) -> AppResult<Vec<UserId>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = user_ids.iter().map(UserId::as_uuid).collect::<Vec<_>>();
        let missing = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT requested.id
            FROM unnest($1::uuid[]) AS requested(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM users WHERE users.id = requested.id
            )
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "resolve user ids"))?;

        Ok(missing.into_iter().map(UserId::from_uuid).collect())
    }
}
