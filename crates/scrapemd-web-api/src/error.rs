use axum::http::StatusCode;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use scrapemd_crawler::ScrapeError;
use serde::Serialize;
use serde::ser::SerializeMap;

/// Error body returned by every failing endpoint: `{"error": <kind>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("error", self.kind)?;
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl From<ScrapeError> for ApiError {
    fn from(error: ScrapeError) -> Self {
        let (status, kind) = match &error {
            ScrapeError::InvalidUrl { .. } => (StatusCode::BAD_REQUEST, "invalid_url"),
            ScrapeError::InvalidDepth(_) => (StatusCode::BAD_REQUEST, "invalid_depth"),
            ScrapeError::FetchFailed { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "fetch_failed"),
            ScrapeError::ParseFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "parse_failed"),
            ScrapeError::Timeout { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "scrape_timeout"),
        };
        Self::new(status, kind, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
