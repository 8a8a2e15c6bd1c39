//! HTTP API Surface
//! Mission: Assemble the routers and shared state for the service

pub mod response;
pub mod users;

use crate::auth::{self, auth_middleware, require_any_role, JwtManager, RequiredRoles};
use crate::models::UserRole;
use crate::store::UserStore;
use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Shared application state, constructed once in `main` and injected
/// everywhere. No globals, no lazy singletons.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub jwt: Arc<JwtManager>,
}

const ADMIN_ONLY: RequiredRoles = RequiredRoles(&[UserRole::Admin]);

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    // Public: no session required.
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(auth::api::register))
        .route("/api/auth/login", post(auth::api::login))
        .with_state(state.clone());

    // Authenticated: any valid session.
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::api::me))
        .route("/api/auth/logout", post(auth::api::logout))
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", get(users::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // Admin: authenticated plus explicit role membership. Layer order
    // matters: the auth layer added last wraps the role check.
    let admin_routes = Router::new()
        .route("/api/users", post(users::create_user))
        .route(
            "/api/users/:id",
            patch(users::update_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(ADMIN_ONLY, require_any_role))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback(unknown_route)
}

// ===== Misc Handlers =====

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    response::success(
        StatusCode::OK,
        "Service up and running",
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}

async fn unknown_route(req: axum::extract::Request) -> impl IntoResponse {
    info!(method = %req.method(), path = %req.uri().path(), "Route doesn't exist");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": "Route doesn't exist",
        })),
    )
}
