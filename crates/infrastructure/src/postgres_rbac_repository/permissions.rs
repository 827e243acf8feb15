use tracing::debug;

use super::*;

impl PostgresRbacRepository {
    pub(super) async fn sync_catalog_impl(
        &self,
        catalog: &PermissionCatalog,
        prune: bool,
    ) -> AppResult<CatalogSyncReport> {
        let ids = catalog
            .iter()
            .map(|permission| permission.id.as_str())
            .collect::<Vec<_>>();
        let names = catalog
            .iter()
            .map(|permission| permission.name.as_str())
            .collect::<Vec<_>>();
        let categories = catalog
            .iter()
            .map(|permission| permission.category.as_str())
            .collect::<Vec<_>>();

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        let upserted = sqlx::query(
            r#"
            INSERT INTO permissions (id, name, category)
            SELECT * FROM unnest($1::text[], $2::text[], $3::text[])
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                category = EXCLUDED.category
            "#,
        )
        .bind(&ids)
        .bind(&names)
        .bind(&categories)
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error(error, "upsert permission catalog"))?
        .rows_affected();

        let pruned = if prune {
            sqlx::query(
                r#"
                DELETE FROM permissions
                WHERE NOT (id = ANY($1::text[]))
                "#,
            )
            .bind(&ids)
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error(error, "prune permission catalog"))?
            .rows_affected()
        } else {
            0
        };

        transaction
            .commit()
            .await
            .map_err(|error| commit_error(error, "sync permission catalog"))?;

        let report = CatalogSyncReport {
            upserted: usize::try_from(upserted).unwrap_or(usize::MAX),
            pruned: usize::try_from(pruned).unwrap_or(usize::MAX),
        };
        debug!(
            upserted = report.upserted,
            pruned = report.pruned,
            "permission catalog synchronized"
        );

        Ok(report)
    }

    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, category
            FROM permissions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error(error, "list permissions"))?;

        rows.into_iter().map(Permission::try_from).collect()
    }
}
