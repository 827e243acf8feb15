use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use wqp_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let admin_routes = Router::new()
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permissions_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::provision_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::role_detail_handler)
                .put(handlers::roles::revise_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_id}/members",
            put(handlers::roles::replace_role_members_handler),
        )
        .route(
            "/api/role-permissions/{role_name}",
            get(handlers::roles::role_permissions_handler)
                .put(handlers::roles::replace_role_permissions_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::register_user_handler),
        )
        .route(
            "/api/users/batch-create",
            post(handlers::users::batch_register_users_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::users::user_roles_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::users::user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/authorization",
            get(handlers::users::authorization_snapshot_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_admin_token,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
