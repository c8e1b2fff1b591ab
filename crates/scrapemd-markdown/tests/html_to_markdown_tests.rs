use scrapemd_markdown::convert_html_to_markdown;

fn assert_conversion(html: &str, expected_markdown: &str) {
    match convert_html_to_markdown(html) {
        Ok(markdown) => assert_eq!(markdown, expected_markdown, "html: {}", html),
        Err(e) => panic!("Conversion failed for HTML '{}': {:?}", html, e),
    }
}

#[test]
fn test_heading_exact_output() {
    assert_conversion("<html><body><h2>Foo</h2></body></html>", "## Foo\n\n");
}

#[test]
fn test_ordered_list_ignores_start_attribute() {
    assert_conversion(
        r#"<html><body><ol start="7"><li>a</li><li>b</li></ol></body></html>"#,
        "1. a\n2. b\n\n",
    );
}

#[test]
fn test_full_article() {
    let html = concat!(
        "<html><head><title>Guide</title></head><body>",
        "<header><a href=\"/\">Home</a></header>",
        "<article>",
        "<h1>Getting started</h1>",
        "<p>Install the tool.</p>",
        "<pre><code class=\"language-bash\">cargo install demo</code></pre>",
        "<ul><li>fast</li><li>small</li></ul>",
        "<blockquote>Be careful</blockquote>",
        "<img src=\"/logo.png\" alt=\"Logo\">",
        "<div>See also</div>",
        "</article>",
        "</body></html>"
    );
    let expected = concat!(
        "# Getting started\n\n",
        "Install the tool.\n\n",
        "```bash\ncargo install demo\n```\n\n",
        "- fast\n- small\n\n",
        "> Be careful\n\n",
        "![Logo](/logo.png)\n\n",
        "See also\n\n"
    );
    assert_conversion(html, expected);
}

#[test]
fn test_inline_elements_are_emitted_raw() {
    assert_conversion(
        r#"<html><body><span>Read </span><a href="/docs">the docs</a><code>now</code></body></html>"#,
        "Read [the docs](/docs)`now`",
    );
}

#[test]
fn test_nested_blocks_flatten_to_text() {
    assert_conversion(
        "<html><body><div><p>one</p><p>two</p></div></body></html>",
        "onetwo\n\n",
    );
}

#[test]
fn test_empty_blocks_emit_nothing() {
    assert_conversion(
        "<html><body><p>  </p><h1></h1><div>\n</div><p>kept</p></body></html>",
        "kept\n\n",
    );
}

#[test]
fn test_text_only_body_falls_back_to_text() {
    assert_conversion("<html><body>\n  Hello there \n</body></html>", "Hello there");
}
