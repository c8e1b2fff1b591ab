use std::time::Duration;

use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{
    config::Config,
    handlers::{AppState, health, not_found, openapi_json, root, scrape},
};

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

fn base_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.contains(&"*".to_string()) {
        return base_cors().allow_origin(Any);
    }

    let origins: Result<Vec<_>, _> = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse())
        .collect();

    match origins {
        Ok(origins) => base_cors().allow_origin(origins),
        Err(_) => {
            tracing::warn!("Invalid CORS origins, falling back to allow all");
            base_cors().allow_origin(Any)
        }
    }
}

/// Routes without request tracing; [`crate::server::build_app`] adds it.
pub fn create_router(config: &Config, state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/scrape", get(scrape))
        .route("/health", get(health))
        .route("/openapi.json", get(openapi_json))
        .fallback(not_found)
        .layer(cors_layer(config))
        .with_state(state)
}
