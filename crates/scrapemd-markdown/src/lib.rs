//! Converts scraped HTML documents into Markdown.
//!
//! The conversion walks the element children of the page's content container
//! (the primary-content landmark, an article, a `.content`/`#content` block, or the
//! body, in that order) and maps each element to Markdown according to its
//! [`NodeKind`](node::NodeKind).
//!
//! ```rust
//! let markdown = scrapemd_markdown::convert_html_to_markdown(
//!     "<html><body><h2>Foo</h2><ol><li>a</li><li>b</li></ol></body></html>",
//! )
//! .unwrap();
//! assert_eq!(markdown, "## Foo\n\n1. a\n2. b\n\n");
//! ```
pub mod converter;
pub mod error;
pub mod node;
pub mod parser;

use scraper::{ElementRef, Html, Selector};

pub use error::ConvertError;
pub use node::{HtmlElement, HtmlNode, ListKind, NodeKind, is_block_element};

/// Landmarks tried in order when looking for the main content of a page.
const CONTENT_SELECTORS: &[&str] = &[r#"main, [role="main"]"#, "article", ".content, #content"];

fn select_first<'a>(document: &'a Html, selector: &str) -> Result<Option<ElementRef<'a>>, ConvertError> {
    let compiled = Selector::parse(selector).map_err(|e| ConvertError::invalid_selector(selector, e))?;
    Ok(document.select(&compiled).next())
}

/// The subtree whose children are converted: the first matching landmark, the body, or the root.
pub fn select_content_container(document: &Html) -> Result<ElementRef<'_>, ConvertError> {
    for selector in CONTENT_SELECTORS {
        if let Some(container) = select_first(document, selector)? {
            return Ok(container);
        }
    }

    Ok(select_first(document, "body")?.unwrap_or_else(|| document.root_element()))
}

/// Trimmed text of the first `<title>`, if any.
pub fn document_title(document: &Html) -> Result<Option<String>, ConvertError> {
    Ok(select_first(document, "title")?
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty()))
}

pub fn convert_document(document: &Html) -> Result<String, ConvertError> {
    let container = select_content_container(document)?;
    let nodes = parser::map_children(container);
    let markdown = converter::convert_nodes_to_markdown(&nodes, Some(container.value().name()));

    if !markdown.trim().is_empty() {
        return Ok(markdown);
    }

    let body = select_first(document, "body")?.unwrap_or_else(|| document.root_element());
    Ok(parser::map_element(body).visible_text().trim().to_string())
}

pub fn convert_html_to_markdown(html_input: &str) -> Result<String, ConvertError> {
    if html_input.trim().is_empty() {
        return Ok(String::new());
    }

    convert_document(&Html::parse_document(html_input))
}
