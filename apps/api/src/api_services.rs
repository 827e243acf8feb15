mod catalog;
mod database;
mod state_builder;

pub use catalog::load_permission_catalog;
pub use database::connect_and_migrate;
pub use state_builder::build_app_state;
