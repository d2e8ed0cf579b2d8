use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{any, get},
};

use super::AppState;
use super::handlers::{self, CorsPolicy};
use crate::config::ServerConfig;
use crate::error::{Result, ShopmateError};

/// Chat endpoint at the configured path plus `/health`, all wrapped in CORS headers
pub fn create_router(config: &ServerConfig, state: AppState) -> Result<Router> {
    if !config.path.starts_with('/') || config.path == "/health" {
        return Err(ShopmateError::Config(format!("server.path '{}' is not usable", config.path)));
    }
    let allow_origin = HeaderValue::from_str(&config.allowed_origin)
        .map_err(|e| ShopmateError::Config(format!("server.allowed-origin is not a valid header value: {}", e)))?;
    let cors = CorsPolicy { allow_origin };

    let router = Router::new()
        .route(&config.path, any(handlers::handle_chat))
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn_with_state(cors, handlers::apply_cors))
        .with_state(state);

    Ok(router)
}
