use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::{error::ScrapeError, links::Link};

pub const DEFAULT_DEPTH: u32 = 1;

/// A validated scrape request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    url: Url,
    depth: u32,
}

fn validate_url(url: &str) -> Result<Url, ScrapeError> {
    let invalid = |reason: String| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

impl ScrapeRequest {
    pub fn new(url: &str, depth: u32) -> Result<Self, ScrapeError> {
        let url = validate_url(url)?;
        if depth == 0 {
            return Err(ScrapeError::InvalidDepth(depth.to_string()));
        }
        Ok(Self { url, depth })
    }

    /// Builds a request from raw query values. The URL is checked before the depth;
    /// a missing or blank depth means [`DEFAULT_DEPTH`].
    pub fn parse(url: &str, depth: Option<&str>) -> Result<Self, ScrapeError> {
        let url = validate_url(url)?;
        let depth = match depth.map(str::trim) {
            None | Some("") => DEFAULT_DEPTH,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or_else(|| ScrapeError::InvalidDepth(raw.to_string()))?,
        };
        Ok(Self { url, depth })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Host component, used as the title when a page has none.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub title: String,
    pub raw_html: String,
    pub markdown: String,
    pub links: Vec<Link>,
    pub warnings: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}
