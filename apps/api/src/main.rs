//! WQP administrative API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

use tracing::{info, warn};
use wqp_core::AppError;

use crate::api_config::{ApiConfig, StorageBackendConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, connect_and_migrate};
use crate::state::StorageHandle;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let storage = match &config.storage {
        StorageBackendConfig::Postgres {
            database_url,
            max_connections,
        } => StorageHandle::Postgres(connect_and_migrate(database_url, *max_connections).await?),
        StorageBackendConfig::Memory => {
            warn!("using in-memory storage; all data is lost on shutdown");
            StorageHandle::Memory
        }
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = build_app_state(&config, storage).await?;
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(
        %address,
        legacy_role_policy = config.legacy_role_policy.as_str(),
        "wqp-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
