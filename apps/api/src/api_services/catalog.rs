use std::path::Path;

use tracing::info;
use wqp_core::AppError;
use wqp_domain::PermissionCatalog;

/// Loads the override catalog at `path`, or the built-in one when unset.
pub fn load_permission_catalog(path: Option<&Path>) -> Result<PermissionCatalog, AppError> {
    let Some(path) = path else {
        return PermissionCatalog::builtin();
    };

    let document = std::fs::read_to_string(path).map_err(|error| {
        AppError::Validation(format!(
            "failed to read PERMISSION_CATALOG_PATH '{}': {error}",
            path.display()
        ))
    })?;
    let catalog = PermissionCatalog::from_json(document.as_str())?;

    info!(
        path = %path.display(),
        permissions = catalog.len(),
        "loaded permission catalog override"
    );
    Ok(catalog)
}
