use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use url::Url;

use crate::crawler::DEFAULT_USER_AGENTS;
use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, PageFetcher};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const BODY_READY_SCRIPT: &str = "document.body !== null";
const BODY_VISIBLE_SCRIPT: &str = r#"(() => {
    const body = document.body;
    if (!body) return false;
    const style = window.getComputedStyle(body);
    return style.display !== 'none' && style.visibility !== 'hidden';
})()"#;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Budget for one render, from opening the tab to capturing the HTML.
    pub timeout: Duration,
    /// Pause after the body becomes visible, letting scripts finish.
    pub settle: Duration,
    pub user_agent: String,
    pub chrome_executable: Option<PathBuf>,
    pub no_sandbox: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            settle: Duration::from_secs(2),
            user_agent: DEFAULT_USER_AGENTS[0].to_string(),
            chrome_executable: None,
            no_sandbox: false,
        }
    }
}

/// Closes the wrapped tab when dropped.
///
/// `close` is the normal path. Dropping the guard without closing, e.g. when a timeout cancels
/// the render, spawns the close on the runtime instead.
struct PageGuard {
    page: Option<Page>,
    url: String,
    runtime_handle: tokio::runtime::Handle,
}

impl PageGuard {
    fn new(page: Page, url: &Url) -> Self {
        Self {
            page: Some(page),
            url: url.to_string(),
            runtime_handle: tokio::runtime::Handle::current(),
        }
    }

    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    async fn close(mut self) {
        if let Some(page) = self.page.take() {
            match page.close().await {
                Ok(()) => tracing::debug!("Tab closed for {}", self.url),
                Err(e) => tracing::warn!("Failed to close tab for {}: {}", self.url, e),
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let url = std::mem::take(&mut self.url);
            self.runtime_handle.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::warn!("Tab cleanup failed for {}: {}", url, e);
                }
            });
        }
    }
}

/// A single headless Chromium process shared by all renders.
///
/// Each render opens its own tab. If the browser cannot be launched the instance stays
/// unavailable and every render fails with [`FetchError::BrowserUnavailable`].
pub struct HeadlessBrowser {
    browser: RwLock<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    config: RenderConfig,
}

impl HeadlessBrowser {
    pub async fn launch(config: RenderConfig) -> Self {
        match Self::start_process(&config).await {
            Ok((browser, handler)) => {
                tracing::info!("Headless browser launched");
                Self {
                    browser: RwLock::new(Some(browser)),
                    handler: Mutex::new(Some(handler)),
                    config,
                }
            }
            Err(e) => {
                tracing::warn!("Headless browser unavailable, only static fetches will succeed: {}", e);
                Self::disabled(config)
            }
        }
    }

    /// An instance without a browser process.
    pub fn disabled(config: RenderConfig) -> Self {
        Self {
            browser: RwLock::new(None),
            handler: Mutex::new(None),
            config,
        }
    }

    async fn start_process(config: &RenderConfig) -> Result<(Browser, JoinHandle<()>), String> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-default-browser-check")
            .arg(format!("--user-agent={}", config.user_agent));
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        let browser_config = builder.build()?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| format!("failed to launch browser: {}", e))?;
        let handle = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok((browser, handle))
    }

    pub async fn is_available(&self) -> bool {
        self.browser.read().await.is_some()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Loads `url` in a fresh tab and returns the rendered document HTML with the URL it ended on.
    pub async fn render(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        match tokio::time::timeout(self.config.timeout, self.render_in_tab(url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Render of {} timed out after {:?}", url, self.config.timeout);
                Err(FetchError::RenderTimeout(self.config.timeout))
            }
        }
    }

    async fn render_in_tab(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        let page = {
            let browser = self.browser.read().await;
            let browser = browser.as_ref().ok_or(FetchError::BrowserUnavailable)?;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| FetchError::navigation(url, e))?
        };
        let guard = PageGuard::new(page, url);

        let result = match guard.page() {
            Some(page) => self.capture(page, url).await,
            None => Err(FetchError::BrowserUnavailable),
        };
        guard.close().await;
        result
    }

    async fn capture(&self, page: &Page, url: &Url) -> Result<FetchOutcome, FetchError> {
        tracing::debug!("Navigating to {}", url);
        page.goto(url.as_str())
            .await
            .map_err(|e| FetchError::navigation(url, e))?;

        wait_until(page, url, BODY_READY_SCRIPT).await?;
        wait_until(page, url, BODY_VISIBLE_SCRIPT).await?;
        tokio::time::sleep(self.config.settle).await;

        let html = page.content().await.map_err(|e| FetchError::navigation(url, e))?;
        let final_url = match page.url().await {
            Ok(current) => current.and_then(|current| Url::parse(&current).ok()),
            Err(e) => {
                tracing::debug!("Could not read final URL of {}: {}", url, e);
                None
            }
        };

        Ok(FetchOutcome {
            html,
            links: Vec::new(),
            final_url,
        })
    }

    /// Closes the browser process. Later renders fail with [`FetchError::BrowserUnavailable`].
    pub async fn shutdown(&self) {
        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close headless browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to wait for headless browser exit: {}", e);
            }
            tracing::info!("Headless browser closed");
        }

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
    }
}

/// Polls `script` until it evaluates to `true`. Bounded by the caller's timeout.
///
/// A failed evaluation means the target is gone and is reported as a navigation error.
async fn wait_until(page: &Page, url: &Url, script: &str) -> Result<(), FetchError> {
    poll_until(|| async move {
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| FetchError::navigation(url, e))?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    })
    .await
}

async fn poll_until<F, Fut>(mut check: F) -> Result<(), FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, FetchError>>,
{
    while !check().await? {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Ok(())
}

#[async_trait]
impl PageFetcher for HeadlessBrowser {
    fn name(&self) -> &'static str {
        "headless-browser"
    }

    async fn fetch(&self, url: &Url, _depth: u32) -> Result<FetchOutcome, FetchError> {
        self.render(url).await
    }
}
