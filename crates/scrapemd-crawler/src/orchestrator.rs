use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use scraper::Html;
use tokio::time::{Instant, timeout_at};
use url::Url;

use crate::error::{FetchError, ScrapeError};
use crate::fetcher::PageFetcher;
use crate::links::{Link, extract_links};
use crate::types::{ScrapeRequest, ScrapeResult};

pub const EMPTY_HTML_WARNING: &str = "captured HTML was empty";

/// How the fetch stage of a scrape ended.
#[derive(Debug)]
pub enum FetchAttempt {
    /// The rendering fetcher succeeded; links still have to be extracted against `final_url`.
    Rendered { html: String, final_url: Url },
    /// Rendering failed and the fallback fetch succeeded.
    Static {
        html: String,
        links: Vec<Link>,
        dynamic_error: FetchError,
    },
    BothFailed {
        dynamic: FetchError,
        fallback: FetchError,
    },
}

pub fn fallback_warning(error: &FetchError) -> String {
    format!("dynamic render failed ({}), falling back to static fetch", error)
}

/// Runs the render-then-crawl pipeline for one request.
pub struct FetchOrchestrator {
    dynamic: Arc<dyn PageFetcher>,
    fallback: Arc<dyn PageFetcher>,
    overall_timeout: Duration,
}

impl FetchOrchestrator {
    pub fn new(dynamic: Arc<dyn PageFetcher>, fallback: Arc<dyn PageFetcher>, overall_timeout: Duration) -> Self {
        Self {
            dynamic,
            fallback,
            overall_timeout,
        }
    }

    /// Runs the dynamic fetcher, then the fallback if it fails, all before the overall deadline.
    pub async fn attempt(&self, request: &ScrapeRequest) -> Result<FetchAttempt, ScrapeError> {
        let deadline = Instant::now() + self.overall_timeout;
        let url = request.url();

        let dynamic = timeout_at(deadline, self.dynamic.fetch(url, request.depth()))
            .await
            .map_err(|_| self.timed_out(request, format!("{} fetch", self.dynamic.name())))?;
        let dynamic_error = match dynamic {
            Ok(outcome) => {
                return Ok(FetchAttempt::Rendered {
                    html: outcome.html,
                    final_url: outcome.final_url.unwrap_or_else(|| url.clone()),
                });
            }
            Err(e) => e,
        };

        tracing::warn!(
            "{} fetch failed for {}: {}, trying {}",
            self.dynamic.name(),
            url,
            dynamic_error,
            self.fallback.name()
        );

        let fallback = timeout_at(deadline, self.fallback.fetch(url, request.depth()))
            .await
            .map_err(|_| {
                self.timed_out(
                    request,
                    format!(
                        "{} fetch after {} fetch failed ({})",
                        self.fallback.name(),
                        self.dynamic.name(),
                        dynamic_error
                    ),
                )
            })?;

        Ok(match fallback {
            Ok(outcome) => FetchAttempt::Static {
                html: outcome.html,
                links: outcome.links,
                dynamic_error,
            },
            Err(fallback) => FetchAttempt::BothFailed {
                dynamic: dynamic_error,
                fallback,
            },
        })
    }

    fn timed_out(&self, request: &ScrapeRequest, stage: String) -> ScrapeError {
        tracing::error!(
            "Scrape of {} timed out after {:?} during {}",
            request.url(),
            self.overall_timeout,
            stage
        );
        ScrapeError::Timeout {
            limit: self.overall_timeout,
            stage,
        }
    }

    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResult, ScrapeError> {
        let fetched_at = Utc::now();
        tracing::info!("Scraping {} (depth {})", request.url(), request.depth());

        let attempt = self.attempt(request).await?;

        let mut warnings = Vec::new();
        let (html, links) = match attempt {
            FetchAttempt::Rendered { html, final_url } => {
                let links = links_from_rendered(&html, &final_url);
                (html, links)
            }
            FetchAttempt::Static {
                html,
                links,
                dynamic_error,
            } => {
                warnings.push(fallback_warning(&dynamic_error));
                (html, links)
            }
            FetchAttempt::BothFailed { dynamic, fallback } => {
                tracing::error!("All fetch strategies failed for {}: {}; {}", request.url(), dynamic, fallback);
                return Err(ScrapeError::FetchFailed { dynamic, fallback });
            }
        };

        if html.trim().is_empty() {
            tracing::warn!("Empty HTML captured for {}", request.url());
            warnings.push(EMPTY_HTML_WARNING.to_string());
        }

        let (title, markdown) = convert_page(&html)?;
        let title = title.unwrap_or_else(|| request.host().to_string());

        tracing::info!(
            "Scraped {}: {} links, {} warnings, {} bytes of markdown",
            request.url(),
            links.len(),
            warnings.len(),
            markdown.len()
        );

        Ok(ScrapeResult {
            title,
            raw_html: html,
            markdown,
            links,
            warnings,
            fetched_at,
        })
    }
}

fn links_from_rendered(html: &str, base: &Url) -> Vec<Link> {
    extract_links(&Html::parse_document(html), base)
}

/// Parses `html` once and returns its title and Markdown.
fn convert_page(html: &str) -> Result<(Option<String>, String), ScrapeError> {
    let document = Html::parse_document(html);
    let title = scrapemd_markdown::document_title(&document)?;
    let markdown = scrapemd_markdown::convert_document(&document)?;
    Ok((title, markdown))
}
