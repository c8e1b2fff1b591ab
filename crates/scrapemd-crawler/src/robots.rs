use reqwest::{Client, header};
use robots_txt::{Robots, matcher::SimpleMatcher};
use url::Url;

/// `host[:port]` key identifying the site a robots.txt applies to.
pub(crate) fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

// Stores the robots.txt text for one site and parses it on demand.
#[derive(Debug)]
pub struct RobotsTxt {
    robots_text: Option<String>,
    host: String,
}

impl RobotsTxt {
    /// Fetches `/robots.txt` for the site of `target_url`.
    ///
    /// A missing or unreachable robots.txt allows everything.
    pub async fn fetch(client: &Client, target_url: &Url, user_agent: &str) -> Self {
        let host = host_key(target_url).unwrap_or_default();

        let robots_url = match target_url.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build robots.txt URL for {}: {}", target_url, e);
                return Self::allow_all(host);
            }
        };

        tracing::info!("Fetching robots.txt from: {}", robots_url);

        match client
            .get(robots_url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(text) => {
                    tracing::debug!("robots.txt content for {}:\n{}", host, text);
                    RobotsTxt {
                        robots_text: Some(text),
                        host,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read robots.txt body for {}: {}", host, e);
                    Self::allow_all(host)
                }
            },
            Ok(response) => {
                tracing::debug!("No robots.txt for {}: HTTP {}", host, response.status());
                Self::allow_all(host)
            }
            Err(e) => {
                tracing::warn!("Error fetching robots.txt for {}: {}", host, e);
                Self::allow_all(host)
            }
        }
    }

    pub fn allow_all(host: String) -> Self {
        RobotsTxt {
            robots_text: None,
            host,
        }
    }

    /// Checks whether `url_to_check` may be crawled by `user_agent`.
    ///
    /// URLs on other sites are not covered by this file and are reported as disallowed.
    pub fn is_allowed(&self, url_to_check: &Url, user_agent: &str) -> bool {
        let Some(text) = &self.robots_text else {
            return true;
        };

        if host_key(url_to_check).as_deref() != Some(self.host.as_str()) {
            tracing::warn!(
                "Checking URL {} against robots.txt for a different host {}",
                url_to_check,
                self.host
            );
            return false;
        }

        let parsed_robots = Robots::from_str_lossy(text);
        let section = parsed_robots.choose_section(user_agent);
        SimpleMatcher::new(&section.rules).check_path(url_to_check.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use std::sync::Once;
    use tokio::runtime::Runtime;

    static INIT: Once = Once::new();
    fn init_tracing() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });
    }

    fn robots(text: Option<&str>) -> RobotsTxt {
        RobotsTxt {
            robots_text: text.map(str::to_string),
            host: "example.com".to_string(),
        }
    }

    #[test]
    fn test_fetch_successful() {
        init_tracing();
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let server = MockServer::start_async().await;
            let robots_body = "User-agent: *\nDisallow: /private/";
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET).path("/robots.txt");
                    then.status(200).body(robots_body);
                })
                .await;

            let client = reqwest::Client::new();
            let url = Url::parse(&server.url("/some/page")).unwrap();
            let robots = RobotsTxt::fetch(&client, &url, "agent").await;

            assert_eq!(robots.host, server.address().to_string());
            assert_eq!(robots.robots_text.as_deref(), Some(robots_body));
            assert!(!robots.is_allowed(&Url::parse(&server.url("/private/x")).unwrap(), "agent"));
            assert!(robots.is_allowed(&Url::parse(&server.url("/public")).unwrap(), "agent"));
            mock.assert_async().await;
        });
    }

    #[test]
    fn test_fetch_not_found() {
        init_tracing();
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(GET).path("/robots.txt");
                    then.status(404);
                })
                .await;

            let client = reqwest::Client::new();
            let url = Url::parse(&server.base_url()).unwrap();
            let robots = RobotsTxt::fetch(&client, &url, "agent").await;

            assert!(robots.robots_text.is_none());
            mock.assert_async().await;
        });
    }

    #[test]
    fn test_fetch_unreachable_allows_all() {
        init_tracing();
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let client = reqwest::Client::new();
            let url = Url::parse("http://127.0.0.1:1/").unwrap();
            let robots = RobotsTxt::fetch(&client, &url, "agent").await;
            assert!(robots.is_allowed(&url, "agent"));
        });
    }

    #[test]
    fn test_is_allowed_basic_rules() {
        let rt = robots(Some("User-agent: *\nDisallow: /private/\nAllow: /public/"));

        assert!(!rt.is_allowed(&Url::parse("http://example.com/private/something").unwrap(), "*"));
        assert!(rt.is_allowed(&Url::parse("http://example.com/public/page").unwrap(), "*"));
        assert!(rt.is_allowed(&Url::parse("http://example.com/anywhere_else").unwrap(), "*"));
    }

    #[test]
    fn test_is_allowed_with_no_robots_text() {
        let rt = robots(None);
        assert!(rt.is_allowed(&Url::parse("http://example.com/some/path").unwrap(), "test-agent"));
    }

    #[test]
    fn test_is_allowed_specific_user_agent() {
        let rt = robots(Some("User-agent: special-bot\nDisallow: /blocked/\nUser-agent: *\nAllow: /"));

        let blocked_url = Url::parse("http://example.com/blocked/page").unwrap();
        let allowed_url = Url::parse("http://example.com/other/page").unwrap();

        assert!(!rt.is_allowed(&blocked_url, "special-bot"));
        assert!(rt.is_allowed(&blocked_url, "other-bot"));
        assert!(rt.is_allowed(&allowed_url, "special-bot"));
    }

    #[test]
    fn test_is_allowed_different_host() {
        let rt = robots(Some("User-agent: *\nDisallow: /private/"));
        assert!(!rt.is_allowed(&Url::parse("http://other.com/private/").unwrap(), "*"));
    }

    #[test]
    fn test_is_allowed_empty_robots_txt() {
        let rt = robots(Some(""));
        assert!(rt.is_allowed(&Url::parse("http://example.com/any/path").unwrap(), "*"));
    }

    #[test]
    fn test_host_key() {
        assert_eq!(host_key(&Url::parse("http://example.com/a").unwrap()).as_deref(), Some("example.com"));
        assert_eq!(
            host_key(&Url::parse("http://127.0.0.1:8080/a").unwrap()).as_deref(),
            Some("127.0.0.1:8080")
        );
        assert_eq!(host_key(&Url::parse("https://example.com:443/").unwrap()).as_deref(), Some("example.com"));
    }
}
