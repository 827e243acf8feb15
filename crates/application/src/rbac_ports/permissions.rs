use async_trait::async_trait;

use wqp_core::AppResult;
use wqp_domain::{Permission, PermissionCatalog};

use super::records::CatalogSyncReport;

/// Repository port for stored permission rows.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Upserts every catalog entry. With `prune`, rows the catalog no longer
    /// defines are deleted along with their grants.
    async fn sync_catalog(
        &self,
        catalog: &PermissionCatalog,
        prune: bool,
    ) -> AppResult<CatalogSyncReport>;

    /// Lists stored permissions ordered by id.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;
}
