use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the API router. Static segments (`/users/age`, `/users/new`) are
/// registered alongside the `{id}` capture; axum gives them precedence.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/age", get(handlers::average_age))
        .route("/api/users/new", get(handlers::new_users))
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(Extension(service))
}
