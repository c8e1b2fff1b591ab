//! Page fetching and content extraction for scrapemd.
//!
//! A scrape first renders the page in a headless browser; if that fails it falls back to a
//! plain HTTP crawl. The captured HTML is then converted to Markdown and its links resolved.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::{sync::Arc, time::Duration};
//! use scrapemd_crawler::{
//!     CrawlerConfig, FetchOrchestrator, HeadlessBrowser, RenderConfig, ScrapeRequest, StaticCrawler,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = Arc::new(HeadlessBrowser::launch(RenderConfig::default()).await);
//!     let crawler = Arc::new(StaticCrawler::new(CrawlerConfig::default())?);
//!     let orchestrator = FetchOrchestrator::new(browser.clone(), crawler, Duration::from_secs(30));
//!
//!     let result = orchestrator.scrape(&ScrapeRequest::new("https://example.com", 1)?).await?;
//!     println!("{}", result.markdown);
//!
//!     browser.shutdown().await;
//!     Ok(())
//! }
//! ```
pub mod browser;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod links;
pub mod orchestrator;
pub mod robots;
pub mod types;

pub use browser::{HeadlessBrowser, RenderConfig};
pub use crawler::{CrawlerConfig, DEFAULT_USER_AGENTS, StaticCrawler};
pub use error::{FetchError, LinkError, ScrapeError};
pub use fetcher::{FetchOutcome, PageFetcher};
pub use links::{Link, extract_links, extract_links_from_html, resolve_link};
pub use orchestrator::{FetchAttempt, FetchOrchestrator};
pub use types::{DEFAULT_DEPTH, ScrapeRequest, ScrapeResult};
