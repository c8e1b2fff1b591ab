use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use url::Url;

use crate::error::FetchError;

/// A fetched response, read to completion.
#[derive(Debug)]
pub struct FetchedPage {
    /// URL that produced the response, after redirects.
    pub final_url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => content_type.to_ascii_lowercase().contains("html"),
            None => self.body.trim_start().starts_with('<'),
        }
    }
}

/// Create a reqwest client for crawling.
pub fn new_reqwest(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(30))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(|e| FetchError::ClientBuild(e.to_string()))
}

/// GET `url` with the given user agent. Only transport failures are errors; any status is returned.
pub async fn fetch_page(client: &Client, url: &Url, user_agent: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .header(header::USER_AGENT, user_agent)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let final_url = response.url().clone();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchedPage {
        final_url,
        status,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use rstest::rstest;

    #[test]
    fn test_new_reqwest_client() {
        assert!(new_reqwest(Duration::from_secs(30)).is_ok());
    }

    #[rstest]
    #[case(Some("text/html; charset=utf-8"), "", true)]
    #[case(Some("application/xhtml+xml"), "", true)]
    #[case(Some("application/json"), "<html></html>", false)]
    #[case(None, "  <!doctype html>", true)]
    #[case(None, "{\"a\":1}", false)]
    fn test_is_html(#[case] content_type: Option<&str>, #[case] body: &str, #[case] expected: bool) {
        let page = FetchedPage {
            final_url: Url::parse("http://example.com").unwrap(),
            status: StatusCode::OK,
            content_type: content_type.map(str::to_string),
            body: body.to_string(),
        };
        assert_eq!(page.is_html(), expected);
    }

    #[tokio::test]
    async fn test_fetch_page_sends_user_agent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/page").header("user-agent", "test-agent/1.0");
                then.status(200)
                    .header("content-type", "text/html")
                    .body("<html><body>ok</body></html>");
            })
            .await;

        let client = new_reqwest(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.url("/page")).unwrap();
        let page = fetch_page(&client, &url, "test-agent/1.0").await.unwrap();

        assert_eq!(page.status, StatusCode::OK);
        assert!(page.is_html());
        assert_eq!(page.body, "<html><body>ok</body></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_returns_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("nope");
            })
            .await;

        let client = new_reqwest(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&server.url("/missing")).unwrap();
        let page = fetch_page(&client, &url, "agent").await.unwrap();

        assert_eq!(page.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused() {
        let client = new_reqwest(Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let result = fetch_page(&client, &url, "agent").await;
        assert!(matches!(result, Err(FetchError::StaticFetch { .. })));
    }
}
