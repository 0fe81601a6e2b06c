//! API handlers for the boat budget REST endpoints

pub mod boats;
pub mod health;
pub mod openapi;
pub mod uploads;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::StorageBackend,
    error::AppError,
    models::caller::{Caller, CallerClaims},
    AppState,
};

/// Extractor for an authenticated caller from a JWT bearer token
pub struct AuthenticatedCaller(pub Caller);

/// Like [`AuthenticatedCaller`], but a missing or invalid token yields an
/// anonymous request instead of a rejection
pub struct OptionalCaller(pub Option<Caller>);

fn caller_from_parts(parts: &Parts, state: &AppState) -> Result<Caller, AppError> {
    // Get the Authorization header
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    // Check for Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

    let auth = &state.config.auth;
    let claims = CallerClaims::from_token(token, &auth.jwt_secret, auth.issuer.as_deref())
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    Ok(claims.into())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        caller_from_parts(parts, state).map(AuthenticatedCaller)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match caller_from_parts(parts, state) {
            Ok(caller) => Ok(OptionalCaller(Some(caller))),
            Err(e) => {
                if parts.headers.contains_key(AUTHORIZATION) {
                    tracing::debug!("Treating request as anonymous: {}", e);
                }
                Ok(OptionalCaller(None))
            }
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Leave room for the multipart framing around the file itself
    let upload_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Boats
        .route("/boats", get(boats::list_boats).post(boats::create_boat))
        .route(
            "/boats/:id",
            get(boats::get_boat)
                .put(boats::update_boat)
                .delete(boats::delete_boat),
        )
        .route("/boats/:id/duplicate", post(boats::duplicate_boat))
        .route("/boats/:id/budget", get(boats::get_budget))
        // Uploads
        .route(
            "/uploads",
            post(uploads::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    let mut app = Router::new().nest("/api/v1", api_v1).merge(openapi);

    let storage = &state.config.storage;
    if storage.backend == StorageBackend::Local {
        app = app.nest_service("/uploads", ServeDir::new(&storage.local_dir));
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}
