use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use wqp_core::AppError;
use wqp_domain::LegacyRolePolicy;

const ADMIN_API_TOKEN_MIN_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage: StorageBackendConfig,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub admin_api_token: String,
    pub permission_catalog_path: Option<PathBuf>,
    pub permission_catalog_prune: bool,
    pub seed_default_roles: bool,
    pub legacy_role_policy: LegacyRolePolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let storage = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => StorageBackendConfig::Postgres {
                database_url: required(&lookup, "DATABASE_URL")?,
                max_connections: parsed_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            "memory" => StorageBackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && storage == StorageBackendConfig::Memory {
            return Err(AppError::Validation(
                "the migrate command requires STORAGE_BACKEND=postgres".to_owned(),
            ));
        }

        let admin_api_token = required(&lookup, "ADMIN_API_TOKEN")?;
        if admin_api_token.len() < ADMIN_API_TOKEN_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "ADMIN_API_TOKEN must be at least {ADMIN_API_TOKEN_MIN_LENGTH} characters"
            )));
        }

        let legacy_role_policy = lookup("LEGACY_ROLE_POLICY")
            .filter(|value| !value.trim().is_empty())
            .map(|value| LegacyRolePolicy::from_str(value.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            migrate_only,
            storage,
            frontend_url: lookup("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_owned()),
            api_host: lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: parsed_or(&lookup, "API_PORT", 3001)?,
            admin_api_token,
            permission_catalog_path: lookup("PERMISSION_CATALOG_PATH")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            permission_catalog_prune: flag_or(&lookup, "PERMISSION_CATALOG_PRUNE", false)?,
            seed_default_roles: flag_or(&lookup, "SEED_DEFAULT_ROLES", true)?,
            legacy_role_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn parsed_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn flag_or(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool, AppError> {
    match lookup(name).as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{value}'"
        ))),
    }
}
