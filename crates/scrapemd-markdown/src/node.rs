use rustc_hash::FxHashMap;

/// Tags whose text never counts as visible content.
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Tags treated as block-level when no dedicated rule applies.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "canvas",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "noscript",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tfoot",
    "ul",
    "video",
];

pub fn is_block_element(tag_name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag_name)
}

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Text(String),
    Element(HtmlElement),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag_name: String,
    pub attributes: FxHashMap<String, String>,
    pub children: Vec<HtmlNode>,
}

impl HtmlElement {
    pub fn new(tag_name: &str, attributes: FxHashMap<String, String>, children: Vec<HtmlNode>) -> Self {
        HtmlElement {
            tag_name: tag_name.to_lowercase(),
            attributes,
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Concatenated text of all descendant text nodes, skipping script-like elements.
    pub fn visible_text(&self) -> String {
        let mut text = String::new();
        collect_visible_text(&self.children, &mut text);
        text
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &HtmlElement> {
        self.children.iter().filter_map(|node| match node {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First descendant element with the given tag, in document order.
    pub fn find_descendant(&self, tag_name: &str) -> Option<&HtmlElement> {
        self.child_elements().find_map(|child| {
            if child.tag_name == tag_name {
                Some(child)
            } else {
                child.find_descendant(tag_name)
            }
        })
    }
}

fn collect_visible_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Element(element) if INVISIBLE_ELEMENTS.contains(&element.tag_name.as_str()) => {}
            HtmlNode::Element(element) => collect_visible_text(&element.children, out),
            HtmlNode::Comment(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// Conversion rule an element falls under. Every element is classified exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading(u8),
    Paragraph,
    List(ListKind),
    Preformatted,
    InlineCode,
    Blockquote,
    Image,
    Anchor,
    Ignored,
    GenericBlock,
    GenericInline,
}

impl NodeKind {
    pub fn classify(tag_name: &str, parent_tag: Option<&str>) -> Self {
        match tag_name {
            "h1" => NodeKind::Heading(1),
            "h2" => NodeKind::Heading(2),
            "h3" => NodeKind::Heading(3),
            "h4" => NodeKind::Heading(4),
            "h5" => NodeKind::Heading(5),
            "h6" => NodeKind::Heading(6),
            "p" => NodeKind::Paragraph,
            "ul" => NodeKind::List(ListKind::Unordered),
            "ol" => NodeKind::List(ListKind::Ordered),
            "pre" => NodeKind::Preformatted,
            // Code directly inside <pre> is emitted by the pre rule.
            "code" if parent_tag == Some("pre") => NodeKind::Ignored,
            "code" => NodeKind::InlineCode,
            "blockquote" => NodeKind::Blockquote,
            "img" => NodeKind::Image,
            "a" => NodeKind::Anchor,
            "script" | "style" | "template" | "head" | "link" | "meta" => NodeKind::Ignored,
            tag if is_block_element(tag) => NodeKind::GenericBlock,
            _ => NodeKind::GenericInline,
        }
    }

    pub fn of(element: &HtmlElement, parent_tag: Option<&str>) -> Self {
        Self::classify(&element.tag_name, parent_tag)
    }
}
