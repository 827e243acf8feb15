use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_user_impl(&self, record: NewUserRecord) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, credential_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, credential_hash, role, created_at
            "#,
        )
        .bind(record.username.as_str())
        .bind(record.email.as_ref().map(EmailAddress::as_str))
        .bind(record.credential_hash.as_str())
        .bind(record.role_label.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            username_conflict_or_storage(error, record.username.as_str(), "create user")
        })?;

        User::try_from(row)
    }

    pub(super) async fn update_user_impl(
        &self,
        user_id: UserId,
        update: UserRecordUpdate,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = $2, email = $3, role = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, credential_hash, role, created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(update.username.as_str())
        .bind(update.email.as_ref().map(EmailAddress::as_str))
        .bind(update.role_label.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            username_conflict_or_storage(error, update.username.as_str(), "update user")
        })?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn delete_user_impl(&self, user_id: UserId) -> AppResult<bool> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "delete user memberships"))?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "delete user"))?
        .rows_affected();

        transaction
            .commit()
            .await
            .map_err(|error| commit_error(error, "delete user"))?;

        Ok(rows_affected > 0)
    }
}
