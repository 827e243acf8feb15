use sqlx::{Postgres, Transaction};

use super::*;

impl PostgresRbacRepository {
    pub(super) async fn replace_role_members_impl(
        &self,
        role_id: RoleId,
        user_ids: &[UserId],
    ) -> AppResult<()> {
        let ids = user_ids.iter().map(UserId::as_uuid).collect::<Vec<_>>();
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        let locked = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT id
            FROM roles
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "lock role"))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist"
            )));
        }

        let missing = missing_user_ids(&mut transaction, &ids).await?;
        if !missing.is_empty() {
            return Err(AppError::invalid_reference(
                ReferenceKind::User,
                missing.iter().map(ToString::to_string),
            ));
        }

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "clear role members"))?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT requested.id, $1
            FROM unnest($2::uuid[]) AS requested(id)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(&ids)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                return AppError::invalid_reference(
                    ReferenceKind::User,
                    ids.iter().map(ToString::to_string),
                );
            }
            storage_error(error, "insert role members")
        })?;

        transaction
            .commit()
            .await
            .map_err(|error| commit_error(error, "replace role members"))
    }

    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_name: &RoleName,
        permission_ids: &[PermissionId],
    ) -> AppResult<()> {
        let ids = permission_ids
            .iter()
            .map(PermissionId::as_str)
            .collect::<Vec<_>>();
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        let locked = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT id
            FROM roles
            WHERE name = $1
            FOR UPDATE
            "#,
        )
        .bind(role_name.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "lock role"))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_name}' does not exist"
            )));
        }

        let missing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT requested.id
            FROM unnest($1::text[]) AS requested(id)
            WHERE NOT EXISTS (
                SELECT 1 FROM permissions WHERE permissions.id = requested.id
            )
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "resolve permission ids"))?;

        if !missing.is_empty() {
            return Err(AppError::invalid_reference(
                ReferenceKind::Permission,
                missing,
            ));
        }

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role = $1
            "#,
        )
        .bind(role_name.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "clear role grants"))?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role, permission_id)
            SELECT $1, unnest($2::text[])
            ON CONFLICT (role, permission_id) DO NOTHING
            "#,
        )
        .bind(role_name.as_str())
        .bind(&ids)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                return AppError::invalid_reference(
                    ReferenceKind::Permission,
                    ids.iter().copied(),
                );
            }
            storage_error(error, "insert role grants")
        })?;

        transaction
            .commit()
            .await
            .map_err(|error| commit_error(error, "replace role permissions"))
    }

    pub(super) async fn list_role_members_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT users.id, users.username, users.email, users.role
            FROM user_roles
            INNER JOIN users ON users.id = user_roles.user_id
            WHERE user_roles.role_id = $1
            ORDER BY users.username
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list role members"))?;

        Ok(rows.into_iter().map(UserSummary::from).collect())
    }

    pub(super) async fn list_role_permissions_impl(
        &self,
        role_name: &str,
    ) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.category
            FROM role_permissions
            INNER JOIN permissions ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role = $1
            ORDER BY permissions.id
            "#,
        )
        .bind(role_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list role permissions"))?;

        rows.into_iter().map(Permission::try_from).collect()
    }

    pub(super) async fn list_roles_for_user_impl(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT roles.id, roles.name, roles.description, roles.created_at
            FROM user_roles
            INNER JOIN roles ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY roles.name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list roles for user"))?;

        rows.into_iter().map(Role::try_from).collect()
    }
}

async fn missing_user_ids(
    transaction: &mut Transaction<'_, Postgres>,
    ids: &[uuid::Uuid],
) -> AppResult<Vec<uuid::Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_scalar::<_, uuid::Uuid>(
        r#"
        SELECT requested.id
        FROM unnest($1::uuid[]) AS requested(id)
        WHERE NOT EXISTS (
            SELECT 1 FROM users WHERE users.id = requested.id
        )
        "#,
    )
    .bind(ids)
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| storage_error(error, "resolve user ids"))
}
