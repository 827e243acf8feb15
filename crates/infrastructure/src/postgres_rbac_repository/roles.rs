use super::*;

impl PostgresRbacRepository {
    pub(super) async fn create_role_impl(&self, record: NewRoleRecord) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(record.name.as_str())
        .bind(record.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| role_conflict_or_storage(error, &record.name, "create role"))?;

        Role::try_from(row)
    }

    pub(super) async fn find_role_impl(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error(error, "find role by id"))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn find_role_by_name_impl(&self, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error(error, "find role by name"))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list roles"))?;

        rows.into_iter().map(Role::try_from).collect()
    }

    pub(super) async fn update_role_impl(
        &self,
        role_id: RoleId,
        update: RoleRecordUpdate,
    ) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = $2, description = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(update.name.as_str())
        .bind(update.description.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| role_conflict_or_storage(error, &update.name, "update role"))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<bool> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        let Some(role_name) = sqlx::query_scalar::<_, String>(
            r#"
            SELECT name
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "lock role"))?
        else {
            return Ok(false);
        };

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role = $1
            "#,
        )
        .bind(role_name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "delete role grants"))?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "delete role memberships"))?;

        sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "delete role"))?;

        transaction
            .commit()
            .await
            .map_err(|error| commit_error(error, "delete role"))?;

        Ok(true)
    }
}
