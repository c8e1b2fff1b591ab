use std::sync::Arc;

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
};
use scrapemd_crawler::{FetchOrchestrator, Link, ScrapeRequest, ScrapeResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;

pub const SERVICE_NAME: &str = "scrapemd-web-api";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<FetchOrchestrator>,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub url: Option<String>,
    pub depth: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

#[derive(OpenApi)]
#[openapi(
    paths(scrape, health, openapi_json),
    components(
        schemas(ScrapeResult),
        schemas(Link),
        schemas(HealthResponse)
    ),
    tags(
        (name = "scrapemd", description = "Web page to Markdown scraping API")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/scrape",
    responses(
        (status = 200, description = "Page scraped successfully", body = ScrapeResult),
        (status = 400, description = "Missing or invalid url or depth"),
        (status = 500, description = "Fetching or parsing the page failed"),
    ),
    params(
        ("url" = String, Query, description = "Absolute http or https URL to scrape"),
        ("depth" = Option<u32>, Query, description = "Static crawl depth, default 1")
    )
)]
pub async fn scrape(
    query: Result<Query<ScrapeParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<ScrapeResult>, ApiError> {
    let Query(params) = query.map_err(|rejection| {
        debug!("Rejected scrape query: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;
    debug!("GET /scrape called with url: {:?}, depth: {:?}", params.url, params.depth);

    let url = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("query parameter `url` is required"))?;

    let request = ScrapeRequest::parse(url, params.depth.as_deref()).map_err(|e| {
        debug!("Rejected scrape request for '{}': {}", url, e);
        ApiError::from(e)
    })?;

    match state.orchestrator.scrape(&request).await {
        Ok(result) => {
            info!(
                "Successfully scraped {}: {} links, {} warnings",
                url,
                result.links.len(),
                result.warnings.len()
            );
            Ok(Json(result))
        }
        Err(e) => {
            error!("Failed to scrape '{}': {}", url, e);
            Err(ApiError::from(e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

pub async fn root() -> &'static str {
    "scrapemd web API is running"
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI specification", body = String),
    )
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    debug!("GET /openapi.json called");
    Json(ApiDoc::openapi())
}
