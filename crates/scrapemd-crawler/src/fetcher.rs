use async_trait::async_trait;
use url::Url;

use crate::{error::FetchError, links::Link};

/// What a fetch strategy hands back to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub html: String,
    /// Links found while fetching. Strategies that do not discover links leave this empty.
    pub links: Vec<Link>,
    /// URL the page was served from after redirects, when the strategy knows it.
    pub final_url: Option<Url>,
}

/// A way of retrieving the HTML of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch `url`. `depth` bounds any link traversal the strategy performs.
    async fn fetch(&self, url: &Url, depth: u32) -> Result<FetchOutcome, FetchError>;
}
