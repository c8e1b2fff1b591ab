use itertools::Itertools;

use crate::node::{HtmlElement, HtmlNode, ListKind, NodeKind};

fn handle_heading_element(element: &HtmlElement, level: u8) -> String {
    let text = element.visible_text();
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    format!("{} {}\n\n", "#".repeat(level as usize), text)
}

fn handle_paragraph_element(element: &HtmlElement) -> String {
    trimmed_block(element)
}

fn handle_list_element(element: &HtmlElement, kind: ListKind) -> String {
    let items = element
        .child_elements()
        .filter(|child| child.tag_name == "li")
        .enumerate()
        .filter_map(|(index, li)| {
            let text = li.visible_text();
            let text = text.trim();
            if text.is_empty() {
                // Skipped items still consume their ordinal.
                return None;
            }
            Some(match kind {
                ListKind::Unordered => format!("- {}\n", text),
                ListKind::Ordered => format!("{}. {}\n", index + 1, text),
            })
        })
        .join("");

    if items.is_empty() {
        items
    } else {
        format!("{}\n", items)
    }
}

fn handle_pre_element(element: &HtmlElement) -> String {
    let (lang, code) = match element.find_descendant("code") {
        Some(code) => {
            let lang = code
                .attr("class")
                .and_then(|classes| {
                    classes
                        .split_whitespace()
                        .find_map(|class| class.strip_prefix("language-"))
                })
                .unwrap_or_default();
            (lang.to_string(), code.visible_text())
        }
        None => (String::new(), element.visible_text()),
    };

    format!("```{}\n{}\n```\n\n", lang, code)
}

fn handle_inline_code_element(element: &HtmlElement) -> String {
    format!("`{}`", element.visible_text())
}

fn handle_blockquote_element(element: &HtmlElement) -> String {
    let text = element.visible_text();
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    let quoted = text.split('\n').map(|line| format!("> {}\n", line)).join("");
    format!("{}\n", quoted)
}

fn handle_image_element(element: &HtmlElement) -> String {
    format!(
        "![{}]({})\n\n",
        element.attr("alt").unwrap_or_default(),
        element.attr("src").unwrap_or_default()
    )
}

fn handle_anchor_element(element: &HtmlElement) -> String {
    format!(
        "[{}]({})",
        element.visible_text(),
        element.attr("href").unwrap_or_default()
    )
}

fn trimmed_block(element: &HtmlElement) -> String {
    let text = element.visible_text();
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", text)
    }
}

pub fn convert_element_to_markdown(element: &HtmlElement, parent_tag: Option<&str>) -> String {
    match NodeKind::of(element, parent_tag) {
        NodeKind::Heading(level) => handle_heading_element(element, level),
        NodeKind::Paragraph => handle_paragraph_element(element),
        NodeKind::List(kind) => handle_list_element(element, kind),
        NodeKind::Preformatted => handle_pre_element(element),
        NodeKind::InlineCode => handle_inline_code_element(element),
        NodeKind::Blockquote => handle_blockquote_element(element),
        NodeKind::Image => handle_image_element(element),
        NodeKind::Anchor => handle_anchor_element(element),
        NodeKind::Ignored => String::new(),
        NodeKind::GenericBlock => trimmed_block(element),
        NodeKind::GenericInline => element.visible_text(),
    }
}

/// Converts the element children of a container, left to right.
///
/// Text and comment nodes sitting directly in the container are not emitted; callers fall
/// back to the container's plain text when nothing is produced.
pub fn convert_nodes_to_markdown(nodes: &[HtmlNode], parent_tag: Option<&str>) -> String {
    nodes
        .iter()
        .filter_map(|node| match node {
            HtmlNode::Element(element) => Some(convert_element_to_markdown(element, parent_tag)),
            HtmlNode::Text(_) | HtmlNode::Comment(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rustc_hash::FxHashMap;

    fn text_node(text: &str) -> HtmlNode {
        HtmlNode::Text(text.to_string())
    }

    fn element_node(tag: &str, children: Vec<HtmlNode>) -> HtmlNode {
        HtmlNode::Element(HtmlElement::new(tag, FxHashMap::default(), children))
    }

    fn element_with_attrs(tag: &str, attrs: &[(&str, &str)], children: Vec<HtmlNode>) -> HtmlNode {
        let attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HtmlNode::Element(HtmlElement::new(tag, attributes, children))
    }

    #[rstest]
    #[case(vec![element_node("h2", vec![text_node("Foo")])], "## Foo\n\n")]
    #[case(vec![element_node("h1", vec![text_node("  Title  ")])], "# Title\n\n")]
    #[case(vec![element_node("h3", vec![text_node("   ")])], "")]
    #[case(vec![element_node("p", vec![text_node(" Hello, world! ")])], "Hello, world!\n\n")]
    #[case(vec![element_node("p", vec![])], "")]
    #[case(
        vec![element_node(
            "ul",
            vec![
                element_node("li", vec![text_node("Item 1")]),
                text_node("\n"),
                element_node("li", vec![text_node("Item 2")]),
            ],
        )],
        "- Item 1\n- Item 2\n\n"
    )]
    #[case(
        vec![element_with_attrs(
            "ol",
            &[("start", "5")],
            vec![
                element_node("li", vec![text_node("a")]),
                element_node("li", vec![text_node("b")]),
            ],
        )],
        "1. a\n2. b\n\n"
    )]
    #[case(
        vec![element_node(
            "ol",
            vec![
                element_node("li", vec![text_node("first")]),
                element_node("li", vec![text_node(" ")]),
                element_node("li", vec![text_node("third")]),
            ],
        )],
        "1. first\n3. third\n\n"
    )]
    #[case(vec![element_node("ul", vec![element_node("li", vec![])])], "")]
    #[case(
        vec![element_node(
            "pre",
            vec![element_with_attrs("code", &[("class", "hl language-rust")], vec![text_node("let x = 1;")])],
        )],
        "```rust\nlet x = 1;\n```\n\n"
    )]
    #[case(vec![element_node("pre", vec![text_node("plain")])], "```\nplain\n```\n\n")]
    #[case(vec![element_node("code", vec![text_node("x + y")])], "`x + y`")]
    #[case(
        vec![element_node("blockquote", vec![text_node(" line one\nline two ")])],
        "> line one\n> line two\n\n"
    )]
    #[case(vec![element_node("blockquote", vec![text_node("  \n ")])], "")]
    #[case(
        vec![element_with_attrs("img", &[("src", "img.png"), ("alt", "alt text")], vec![])],
        "![alt text](img.png)\n\n"
    )]
    #[case(vec![element_with_attrs("img", &[], vec![])], "![]()\n\n")]
    #[case(
        vec![element_with_attrs("a", &[("href", "/docs")], vec![text_node(" Docs ")])],
        "[ Docs ](/docs)"
    )]
    #[case(
        vec![element_node("section", vec![element_node("p", vec![text_node("nested")]), text_node(" tail ")])],
        "nested tail\n\n"
    )]
    #[case(vec![element_node("span", vec![text_node(" raw ")])], " raw ")]
    #[case(vec![element_node("script", vec![text_node("alert(1)")])], "")]
    #[case(vec![text_node("loose text"), element_node("p", vec![text_node("kept")])], "kept\n\n")]
    fn test_convert_nodes_to_markdown(#[case] nodes: Vec<HtmlNode>, #[case] expected: &str) {
        assert_eq!(convert_nodes_to_markdown(&nodes, Some("body")), expected);
    }

    #[test]
    fn test_code_inside_pre_is_not_backticked() {
        let nodes = vec![element_node("code", vec![text_node("inner")])];
        assert_eq!(convert_nodes_to_markdown(&nodes, Some("pre")), "");
    }

    #[test]
    fn test_blocks_concatenate_in_order() {
        let nodes = vec![
            element_node("h1", vec![text_node("Title")]),
            element_node("p", vec![text_node("Intro")]),
            element_with_attrs("a", &[("href", "https://example.com")], vec![text_node("link")]),
        ];
        assert_eq!(
            convert_nodes_to_markdown(&nodes, Some("body")),
            "# Title\n\nIntro\n\n[link](https://example.com)"
        );
    }
}
