//! Route configuration and setup.
//!
//! A single router carries every route; the auth middleware consults the
//! public-route table in [`crate::auth::middleware`] and the access guard
//! consults the role table in [`crate::auth::guard`], both keyed by method
//! and route template and read at dispatch time.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Uri},
    routing::{get, post},
    Json, Router,
};
use medley_core::{AppError, Config};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::guard::role_guard;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::error::HttpAppError;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: state.jwt.clone(),
        users: state.users.clone(),
    });

    let app = api_routes()
        .layer(axum::middleware::from_fn(role_guard))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        // Added after the auth layers so unknown paths 404 instead of 401.
        .fallback(not_found)
        // The transport body ceiling is independent of, and in addition to,
        // the per-category admission ceilings.
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();
        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Unknown routes get the same failure envelope as everything else.
async fn not_found(uri: Uri) -> HttpAppError {
    let path = uri.path().to_string();
    HttpAppError::at(AppError::NotFound(format!("Route {} not found", path)), path)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/users",
            get(handlers::users::find_all).post(handlers::users::create),
        )
        .route(
            "/api/users/{id}",
            get(handlers::users::find_one)
                .patch(handlers::users::update)
                .delete(handlers::users::remove),
        )
        .route("/api/users/{id}/media", get(handlers::users::user_media))
        .route(
            "/api/tags",
            get(handlers::tags::find_all).post(handlers::tags::create),
        )
        .route(
            "/api/tags/{id}",
            get(handlers::tags::find_one)
                .patch(handlers::tags::update)
                .delete(handlers::tags::remove),
        )
        .route(
            "/api/media",
            get(handlers::media::find_all).post(handlers::media::create),
        )
        .route(
            "/api/media/{id}",
            get(handlers::media::find_one)
                .patch(handlers::media::update)
                .delete(handlers::media::remove),
        )
}
