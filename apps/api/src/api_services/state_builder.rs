use std::sync::Arc;

use wqp_application::{AuthorizationService, CatalogBootstrapService, RbacService, UserService};
use wqp_core::AppError;
use wqp_infrastructure::Argon2PasswordHasher;

use crate::api_config::ApiConfig;
use crate::state::{AppState, StorageHandle};

use super::load_permission_catalog;

mod bootstrap;
mod repositories;

pub async fn build_app_state(
    config: &ApiConfig,
    storage: StorageHandle,
) -> Result<AppState, AppError> {
    let catalog = Arc::new(load_permission_catalog(
        config.permission_catalog_path.as_deref(),
    )?);
    let repositories = repositories::build_repository_set(&storage);

    let rbac_service = RbacService::new(
        repositories.role_repository.clone(),
        repositories.user_repository.clone(),
        repositories.assignment_repository.clone(),
        catalog,
    );
    let catalog_bootstrap_service = CatalogBootstrapService::new(
        repositories.permission_repository.clone(),
        rbac_service.clone(),
    );
    bootstrap::bootstrap_catalog(&catalog_bootstrap_service, config).await?;

    Ok(AppState {
        user_service: UserService::new(
            repositories.user_repository.clone(),
            Arc::new(Argon2PasswordHasher::new()),
        ),
        authorization_service: AuthorizationService::new(
            repositories.user_repository,
            repositories.role_repository,
            repositories.assignment_repository,
            config.legacy_role_policy,
        ),
        rbac_service,
        permission_repository: repositories.permission_repository,
        storage,
        admin_api_token: Arc::from(config.admin_api_token.as_str()),
    })
}
