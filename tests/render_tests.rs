use learn_portal::render::{ArticleNode, InlineNode, recognized_language, render_body};

// --- Block Structure ---

#[test]
fn test_heading_and_paragraph_tree() {
    let nodes = render_body("# Title\n\nSome *emphasized* text.").expect("render");

    assert_eq!(nodes.len(), 2);
    match &nodes[0] {
        ArticleNode::Heading { level, children } => {
            assert_eq!(*level, 1);
            assert_eq!(
                children,
                &vec![InlineNode::Text {
                    text: "Title".to_string()
                }]
            );
        }
        other => panic!("expected heading, got {other:?}"),
    }
    match &nodes[1] {
        ArticleNode::Paragraph { children } => {
            assert!(children.contains(&InlineNode::Emphasis {
                children: vec![InlineNode::Text {
                    text: "emphasized".to_string()
                }]
            }));
        }
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn test_deep_headings_clamp_to_level_three() {
    let nodes = render_body("##### Deep").expect("render");

    match &nodes[0] {
        ArticleNode::Heading { level, .. } => assert_eq!(*level, 3),
        other => panic!("expected heading, got {other:?}"),
    }
}

#[test]
fn test_lists_ordered_and_unordered() {
    let nodes = render_body("- alpha\n- beta\n\n1. one\n2. two").expect("render");

    match &nodes[0] {
        ArticleNode::List { ordered, items } => {
            assert!(!ordered);
            assert_eq!(items.len(), 2);
            // Tight list items wrap their bare inline run into a paragraph.
            assert_eq!(
                items[0],
                vec![ArticleNode::Paragraph {
                    children: vec![InlineNode::Text {
                        text: "alpha".to_string()
                    }]
                }]
            );
        }
        other => panic!("expected list, got {other:?}"),
    }
    match &nodes[1] {
        ArticleNode::List { ordered, items } => {
            assert!(ordered);
            assert_eq!(items.len(), 2);
        }
        other => panic!("expected ordered list, got {other:?}"),
    }
}

#[test]
fn test_block_quote_wraps_blocks() {
    let nodes = render_body("> quoted line").expect("render");

    match &nodes[0] {
        ArticleNode::BlockQuote { children } => {
            assert!(matches!(children[0], ArticleNode::Paragraph { .. }));
        }
        other => panic!("expected block quote, got {other:?}"),
    }
}

#[test]
fn test_table_header_and_rows() {
    let body = "| Name | Score |\n| --- | --- |\n| Ada | 10 |\n| Alan | 9 |";
    let nodes = render_body(body).expect("render");

    match &nodes[0] {
        ArticleNode::Table { header, rows } => {
            assert_eq!(header.len(), 2);
            assert_eq!(
                header[0],
                vec![InlineNode::Text {
                    text: "Name".to_string()
                }]
            );
            assert_eq!(rows.len(), 2);
            assert_eq!(
                rows[1][0],
                vec![InlineNode::Text {
                    text: "Alan".to_string()
                }]
            );
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn test_links_images_and_inline_code() {
    let nodes =
        render_body("See [docs](https://example.com \"Docs\") and `let x` and ![alt text](/img.png).")
            .expect("render");

    let ArticleNode::Paragraph { children } = &nodes[0] else {
        panic!("expected paragraph");
    };

    assert!(children.contains(&InlineNode::Link {
        href: "https://example.com".to_string(),
        title: "Docs".to_string(),
        children: vec![InlineNode::Text {
            text: "docs".to_string()
        }],
    }));
    assert!(children.contains(&InlineNode::Code {
        code: "let x".to_string()
    }));
    assert!(children.contains(&InlineNode::Image {
        src: "/img.png".to_string(),
        alt: "alt text".to_string(),
    }));
}

#[test]
fn test_image_alt_text_with_inline_markup_flattens_to_plain_text() {
    let nodes = render_body("![*styled* alt](/img.png) and ![`code` alt](/pic.png)")
        .expect("render");

    let ArticleNode::Paragraph { children } = &nodes[0] else {
        panic!("expected paragraph");
    };

    assert!(children.contains(&InlineNode::Image {
        src: "/img.png".to_string(),
        alt: "styled alt".to_string(),
    }));
    assert!(children.contains(&InlineNode::Image {
        src: "/pic.png".to_string(),
        alt: "code alt".to_string(),
    }));
}

// --- Code Fences & Highlighting Metadata ---

#[test]
fn test_code_block_with_recognized_language() {
    let nodes = render_body("```rust\nfn main() {}\n```").expect("render");

    match &nodes[0] {
        ArticleNode::CodeBlock { language, code } => {
            assert_eq!(language.as_deref(), Some("rust"));
            assert_eq!(code, "fn main() {}\n");
        }
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn test_code_block_with_unrecognized_language_is_plain() {
    let nodes = render_body("```klingon\nqapla'\n```").expect("render");

    match &nodes[0] {
        ArticleNode::CodeBlock { language, .. } => assert!(language.is_none()),
        other => panic!("expected code block, got {other:?}"),
    }
}

#[test]
fn test_recognized_language_normalization() {
    assert_eq!(recognized_language("RUST"), Some("rust".to_string()));
    assert_eq!(recognized_language("rust ignore"), Some("rust".to_string()));
    assert_eq!(recognized_language("klingon"), None);
    assert_eq!(recognized_language(""), None);
}

// --- Sanitization (hard security contract) ---

#[test]
fn test_script_blocks_are_stripped_entirely() {
    let body = "<script>alert('pwned')</script>\n\n# Safe Heading";
    let nodes = render_body(body).expect("render");

    // The script cleans to nothing, so no Html node survives at all.
    assert!(
        !nodes.iter().any(|n| matches!(n, ArticleNode::Html { .. })),
        "script block must not produce an html node: {nodes:?}"
    );

    let serialized = serde_json::to_string(&nodes).unwrap();
    assert!(!serialized.contains("<script"));
    assert!(!serialized.contains("alert("));
}

#[test]
fn test_event_handlers_are_stripped_from_embedded_markup() {
    let body = "<div onclick=\"steal()\" class=\"note\">hello</div>";
    let nodes = render_body(body).expect("render");

    let Some(ArticleNode::Html { html }) = nodes.first() else {
        panic!("expected sanitized html block, got {nodes:?}");
    };

    assert!(html.contains("hello"));
    assert!(!html.contains("onclick"));
    assert!(!html.contains("steal"));
}

#[test]
fn test_inline_script_fragments_are_neutralized() {
    let body = "before <script>alert(1)</script> after";
    let nodes = render_body(body).expect("render");

    let serialized = serde_json::to_string(&nodes).unwrap();
    assert!(!serialized.contains("<script"));
}

// --- Failure Mode ---

#[test]
fn test_degenerate_input_renders_without_panicking() {
    // Unclosed fences, stray pipes, lone delimiters: none of these may panic;
    // they either render to something structural or to an empty tree.
    for body in ["```", "|", "> ", "![", "---"] {
        let result = render_body(body);
        assert!(result.is_ok(), "body {body:?} should render, got {result:?}");
    }
}

#[test]
fn test_empty_body_renders_to_empty_tree() {
    assert_eq!(render_body("").expect("render"), vec![]);
}
