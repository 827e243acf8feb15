use std::sync::Arc;

use tracing::{debug, info};

use wqp_core::{AppError, AppResult};
use wqp_domain::RoleName;

use crate::{CatalogSyncReport, CreateRoleInput, PermissionRepository, RbacService};


/// Brings stored permissions and default roles in line with the catalog at startup.
#[derive(Clone)]
pub struct CatalogBootstrapService {
    permission_repository: Arc<dyn PermissionRepository>,
    rbac_service: RbacService,
}

impl CatalogBootstrapService {
    /// Creates a new catalog bootstrap service.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        rbac_service: RbacService,
    ) -> Self {
        Self {
            permission_repository,
            rbac_service,
        }
    }

    /// Upserts every catalog entry into storage.
    ///
    /// With `prune`, stored permissions the catalog no longer defines are
    /// removed together with every grant that references them.
    pub async fn sync_catalog(&self, prune: bool) -> AppResult<CatalogSyncReport> {
        let report = self
            .permission_repository
            .sync_catalog(self.rbac_service.catalog(), prune)
            .await?;

        info!(
            upserted = report.upserted,
            pruned = report.pruned,
            "permission catalog synchronized"
        );
        Ok(report)
    }

    /// Creates missing default roles and grants them their default permissions.
    ///
    /// Roles that already exist keep whatever grants they have. Returns the
    /// names of the roles created by this call.
    pub async fn seed_default_roles(&self) -> AppResult<Vec<RoleName>> {
        let mut seeded = Vec::new();

        for seed in self.rbac_service.catalog().default_role_grants()? {
            if self
                .rbac_service
                .find_role_by_name(seed.role_name.as_str())
                .await?
                .is_some()
            {
                debug!(role_name = %seed.role_name, "default role already present");
                continue;
            }

            let role = match self
                .rbac_service
                .create_role(CreateRoleInput {
                    name: seed.role_name.clone().into(),
                    description: Some(seed.description),
                })
                .await
            {
                Ok(role) => role,
                Err(AppError::DuplicateKey(_)) => {
                    debug!(role_name = %seed.role_name, "default role created concurrently");
                    continue;
                }
                Err(error) => return Err(error),
            };

            self.rbac_service
                .replace_role_permissions(role.name.as_str(), seed.permission_ids)
                .await?;
            seeded.push(role.name);
        }

        if !seeded.is_empty() {
            info!(count = seeded.len(), "default roles seeded");
        }
        Ok(seeded)
    }
}
