//! Storage and credential adapters for the application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_rbac_store;
mod postgres_errors;
mod postgres_rbac_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_rbac_repository::PostgresRbacRepository;
pub use postgres_user_repository::PostgresUserRepository;
