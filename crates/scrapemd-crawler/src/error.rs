use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

/// Failure of a single fetch strategy.
#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("page render timed out after {}s", .0.as_secs_f64())]
    #[diagnostic(code(scrapemd_crawler::render_timeout))]
    RenderTimeout(Duration),

    #[error("navigation to {url} failed: {message}")]
    #[diagnostic(code(scrapemd_crawler::navigation))]
    Navigation { url: String, message: String },

    #[error("headless browser is not available")]
    #[diagnostic(
        code(scrapemd_crawler::browser_unavailable),
        help("Install Chromium or set CHROME_EXECUTABLE to enable JavaScript rendering.")
    )]
    BrowserUnavailable,

    #[error("failed to fetch {url}: {message}")]
    #[diagnostic(code(scrapemd_crawler::static_fetch))]
    StaticFetch { url: String, message: String },

    #[error("request to {url} failed with status: {status}")]
    #[diagnostic(code(scrapemd_crawler::http_status))]
    HttpStatus { url: String, status: u16 },

    #[error("{url} is disallowed by robots.txt")]
    #[diagnostic(
        code(scrapemd_crawler::robots_disallowed),
        help("Set SCRAPER_IGNORE_ROBOTS=true to skip robots.txt checks.")
    )]
    RobotsDisallowed { url: String },

    #[error("failed to build HTTP client: {0}")]
    #[diagnostic(code(scrapemd_crawler::client_build))]
    ClientBuild(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &url::Url, error: reqwest::Error) -> Self {
        Self::StaticFetch {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn navigation(url: &url::Url, error: impl std::fmt::Display) -> Self {
        Self::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum LinkError {
    #[error("cannot resolve link `{href}` against {base}: {message}")]
    #[diagnostic(code(scrapemd_crawler::unresolvable_link))]
    Unresolvable {
        href: String,
        base: String,
        message: String,
    },
}

/// Failure of a whole scrape request.
#[derive(Debug, Error, Diagnostic)]
pub enum ScrapeError {
    #[error("invalid URL `{url}`: {reason}")]
    #[diagnostic(code(scrapemd_crawler::invalid_url), help("Use an absolute http or https URL."))]
    InvalidUrl { url: String, reason: String },

    #[error("invalid depth `{0}`: must be a positive integer")]
    #[diagnostic(code(scrapemd_crawler::invalid_depth))]
    InvalidDepth(String),

    #[error("scraping failed: dynamic fetch: {dynamic}; static fetch: {fallback}")]
    #[diagnostic(code(scrapemd_crawler::fetch_failed))]
    FetchFailed {
        dynamic: FetchError,
        #[source]
        fallback: FetchError,
    },

    #[error("failed to parse HTML: {0}")]
    #[diagnostic(code(scrapemd_crawler::parse_failed))]
    ParseFailed(#[from] scrapemd_markdown::ConvertError),

    #[error("scrape did not finish within {}s: timed out during {stage}", .limit.as_secs_f64())]
    #[diagnostic(code(scrapemd_crawler::timeout))]
    Timeout { limit: Duration, stage: String },
}
