use tracing::info;
use wqp_application::CatalogBootstrapService;
use wqp_core::AppError;

use crate::api_config::ApiConfig;

pub(super) async fn bootstrap_catalog(
    service: &CatalogBootstrapService,
    config: &ApiConfig,
) -> Result<(), AppError> {
    service.sync_catalog(config.permission_catalog_prune).await?;

    if !config.seed_default_roles {
        info!("default role seeding disabled");
        return Ok(());
    }

    let seeded = service.seed_default_roles().await?;
    info!(created = seeded.len(), "default roles ensured");
    Ok(())
}
