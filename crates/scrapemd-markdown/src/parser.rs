use rustc_hash::FxHashMap;
use scraper::{ElementRef, Node};

use crate::node::{HtmlElement, HtmlNode};

/// Maps a scraper element and its subtree into an owned [`HtmlElement`].
pub fn map_element(element: ElementRef<'_>) -> HtmlElement {
    let attributes: FxHashMap<String, String> = element
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    HtmlElement::new(element.value().name(), attributes, map_children(element))
}

/// Maps the direct children of `element`. Doctypes and processing instructions are dropped.
pub fn map_children(element: ElementRef<'_>) -> Vec<HtmlNode> {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(HtmlNode::Text((**text).to_owned())),
            Node::Comment(comment) => Some(HtmlNode::Comment((**comment).to_owned())),
            Node::Element(_) => ElementRef::wrap(child).map(|el| HtmlNode::Element(map_element(el))),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_map_element_keeps_structure() {
        let fragment = Html::parse_fragment(r#"<div class="box">Hi <a href="/x">there</a><!-- note --></div>"#);
        let div = fragment
            .root_element()
            .child_elements()
            .next()
            .unwrap();

        let mapped = map_element(div);

        assert_eq!(mapped.tag_name, "div");
        assert_eq!(mapped.attr("class"), Some("box"));
        assert_eq!(mapped.children.len(), 3);
        assert_eq!(mapped.children[0], HtmlNode::Text("Hi ".to_string()));
        match &mapped.children[1] {
            HtmlNode::Element(a) => {
                assert_eq!(a.tag_name, "a");
                assert_eq!(a.attr("href"), Some("/x"));
                assert_eq!(a.visible_text(), "there");
            }
            other => panic!("expected anchor, got {:?}", other),
        }
        assert_eq!(mapped.children[2], HtmlNode::Comment(" note ".to_string()));
    }
}
