use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use url::Url;

use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::http_client::{self, FetchedPage};
use crate::links::{Link, extract_crawl_links};
use crate::robots::{RobotsTxt, host_key};

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Minimum pause between two requests to the same host.
    pub delay: Duration,
    /// Upper bound of the random jitter added to `delay`.
    pub random_delay: Duration,
    pub user_agents: Vec<String>,
    pub request_timeout: Duration,
    pub ignore_robots_txt: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            random_delay: Duration::from_secs(1),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            request_timeout: Duration::from_secs(30),
            ignore_robots_txt: false,
        }
    }
}

fn jitter(max: Duration) -> Duration {
    let max_millis = max.as_millis() as u64;
    if max_millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_millis))
}

/// Tracks when each host was last requested during one crawl.
#[derive(Debug, Default)]
struct Politeness {
    last_request: HashMap<String, Instant>,
}

impl Politeness {
    async fn wait_turn(&mut self, url: &Url, delay: Duration, random_delay: Duration) {
        let host = host_key(url).unwrap_or_default();
        if let Some(last) = self.last_request.get(&host) {
            let wait = delay + jitter(random_delay);
            let elapsed = last.elapsed();
            if wait > elapsed {
                tracing::debug!("Waiting {:?} before requesting {}", wait - elapsed, url);
                tokio::time::sleep(wait - elapsed).await;
            }
        }
        self.last_request.insert(host, Instant::now());
    }
}

/// Non-rendering breadth-first crawler.
///
/// Visits the requested page and, while the level is below the requested depth, same-host
/// pages linked from it. Only the first page's body is returned; deeper pages contribute links.
pub struct StaticCrawler {
    client: Client,
    config: CrawlerConfig,
    next_agent: AtomicUsize,
}

impl StaticCrawler {
    pub fn new(config: CrawlerConfig) -> Result<Self, FetchError> {
        let client = http_client::new_reqwest(config.request_timeout)?;
        Ok(Self {
            client,
            config,
            next_agent: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    fn next_user_agent(&self) -> String {
        if self.config.user_agents.is_empty() {
            return DEFAULT_USER_AGENTS[0].to_string();
        }
        let index = self.next_agent.fetch_add(1, Ordering::Relaxed) % self.config.user_agents.len();
        self.config.user_agents[index].clone()
    }

    pub async fn crawl(&self, start_url: &Url, depth: u32) -> Result<FetchOutcome, FetchError> {
        let user_agent = self.next_user_agent();
        let mut crawl_host = host_key(start_url);

        tracing::info!(
            "Static crawl of {} (depth {}) with User-Agent '{}'",
            start_url,
            depth,
            user_agent
        );

        let mut robots = if self.config.ignore_robots_txt {
            None
        } else {
            let robots = RobotsTxt::fetch(&self.client, start_url, &user_agent).await;
            if !robots.is_allowed(start_url, &user_agent) {
                return Err(FetchError::RobotsDisallowed {
                    url: start_url.to_string(),
                });
            }
            Some(robots)
        };

        let mut to_visit: VecDeque<(Url, u32)> = VecDeque::from([(start_url.clone(), 1)]);
        let mut visited: HashSet<Url> = HashSet::from([start_url.clone()]);
        let mut politeness = Politeness::default();
        let mut links: Vec<Link> = Vec::new();
        let mut start_html: Option<String> = None;
        let mut start_final_url: Option<Url> = None;

        while let Some((current_url, level)) = to_visit.pop_front() {
            let is_start = start_html.is_none();

            if !is_start
                && robots
                    .as_ref()
                    .is_some_and(|robots| !robots.is_allowed(&current_url, &user_agent))
            {
                tracing::warn!("Skipping URL disallowed by robots.txt: {}", current_url);
                continue;
            }

            politeness
                .wait_turn(&current_url, self.config.delay, self.config.random_delay)
                .await;

            let page = http_client::fetch_page(&self.client, &current_url, &user_agent).await?;

            if !page.status.is_success() {
                if is_start {
                    return Err(FetchError::HttpStatus {
                        url: current_url.to_string(),
                        status: page.status.as_u16(),
                    });
                }
                tracing::warn!("Skipping {}: HTTP {}", current_url, page.status);
                continue;
            }

            if is_start {
                let final_host = host_key(&page.final_url);
                if final_host != crawl_host {
                    tracing::info!(
                        "{} redirected to {}, following links on the new host",
                        current_url,
                        page.final_url
                    );
                    if robots.is_some() {
                        robots = Some(RobotsTxt::fetch(&self.client, &page.final_url, &user_agent).await);
                    }
                    crawl_host = final_host;
                }
                start_final_url = Some(page.final_url.clone());
            }

            let mut served_url = page.final_url.clone();
            served_url.set_fragment(None);
            visited.insert(served_url);

            let page_links = discover_links(&page);
            tracing::debug!("{} links on {} (level {})", page_links.len(), page.final_url, level);

            if level < depth {
                for link in &page_links {
                    let Some(next) = crawlable(&link.href, crawl_host.as_deref()) else {
                        continue;
                    };
                    if visited.insert(next.clone()) {
                        to_visit.push_back((next, level + 1));
                    }
                }
            }

            links.extend(page_links);

            if is_start {
                start_html = Some(page.body);
            }
        }

        Ok(FetchOutcome {
            html: start_html.unwrap_or_default(),
            links,
            final_url: start_final_url,
        })
    }
}

fn discover_links(page: &FetchedPage) -> Vec<Link> {
    if page.is_html() {
        extract_crawl_links(&page.body, &page.final_url)
    } else {
        Vec::new()
    }
}

/// Returns the URL to enqueue for `href` when it stays on the starting host.
fn crawlable(href: &str, start_host: Option<&str>) -> Option<Url> {
    let mut url = Url::parse(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") || host_key(&url).as_deref() != start_host {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

#[async_trait]
impl PageFetcher for StaticCrawler {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, url: &Url, depth: u32) -> Result<FetchOutcome, FetchError> {
        self.crawl(url, depth).await
    }
}
