//! HTTP surface: router, authorization gate and handlers.

pub mod auth_svc;
pub mod error;
pub mod fleet_svc;
pub mod gate;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::JwtManager;
use crate::storage::FleetDatabase;

pub use error::ApiError;
pub use gate::require_identity;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: FleetDatabase,
    pub jwt: Arc<JwtManager>,
}

/// Build the full application router.
///
/// `/login` and `/health` are public; everything else sits behind
/// [`require_identity`].
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/results",
            get(fleet_svc::list_results).post(fleet_svc::add_result),
        )
        .route("/transports", get(fleet_svc::list_transports))
        .route("/routes/{id}", get(fleet_svc::routes_for_bus))
        .route(
            "/admin/users",
            get(auth_svc::list_users).post(auth_svc::add_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    Router::new()
        .route("/login", post(auth_svc::login))
        .route("/health", get(health))
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
        ])
}
