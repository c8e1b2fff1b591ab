use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::error::LinkError;

/// A hyperlink discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    /// Absolute URL.
    pub href: String,
    /// Trimmed anchor text, possibly empty.
    pub text: String,
}

/// Resolves `href` against `base`. Absolute URLs come back unchanged.
pub fn resolve_link(href: &str, base: &Url) -> Result<Url, LinkError> {
    base.join(href.trim()).map_err(|e| LinkError::Unresolvable {
        href: href.to_string(),
        base: base.to_string(),
        message: e.to_string(),
    })
}

fn collect_links(document: &Html, base: &Url, skip_fragments: bool) -> Vec<Link> {
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let links: Vec<Link> = document
        .select(&link_selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            if skip_fragments && href.trim_start().starts_with('#') {
                return None;
            }
            match resolve_link(href, base) {
                Ok(url) => Some(Link {
                    href: url.to_string(),
                    text: element.text().collect::<String>().trim().to_string(),
                }),
                Err(e) => {
                    tracing::debug!("Skipping link: {}", e);
                    None
                }
            }
        })
        .collect();

    tracing::debug!("Extracted {} links from {}", links.len(), base);
    links
}

/// Every `a[href]` in document order, resolved against `base`.
pub fn extract_links(document: &Html, base: &Url) -> Vec<Link> {
    collect_links(document, base, false)
}

pub fn extract_links_from_html(html: &str, base: &Url) -> Vec<Link> {
    if html.is_empty() {
        return Vec::new();
    }
    extract_links(&Html::parse_document(html), base)
}

/// Links as the static crawler records them: fragment-only hrefs are left out.
pub(crate) fn extract_crawl_links(html: &str, base: &Url) -> Vec<Link> {
    if html.is_empty() {
        return Vec::new();
    }
    collect_links(&Html::parse_document(html), base, true)
}
