use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Output Node Tree ---

/// ArticleNode
///
/// One block-level node of the rendered article tree. This is a sanitized,
/// structural representation ready for the frontend to map onto its own
/// components; it is deliberately *not* final markup, keeping visual rendering
/// a pure UI concern.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum ArticleNode {
    /// Heading levels are clamped to 1-3; deeper headings render as level 3.
    Heading {
        level: u8,
        children: Vec<InlineNode>,
    },
    Paragraph {
        children: Vec<InlineNode>,
    },
    List {
        ordered: bool,
        #[schema(no_recursion)]
        items: Vec<Vec<ArticleNode>>,
    },
    /// `language` is present only when the fence tag is in the recognized set;
    /// blocks with no or unrecognized tags pass through as plain code.
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    BlockQuote {
        #[schema(no_recursion)]
        children: Vec<ArticleNode>,
    },
    Table {
        header: Vec<Vec<InlineNode>>,
        rows: Vec<Vec<Vec<InlineNode>>>,
    },
    /// Raw embedded markup that survived sanitization. Scripts and event
    /// handlers have been stripped before this node exists.
    Html {
        html: String,
    },
    Rule,
}

/// InlineNode
///
/// One inline-level node (the children of headings, paragraphs, table cells,
/// and other inline containers).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum InlineNode {
    Text { text: String },
    Code { code: String },
    Emphasis {
        #[schema(no_recursion)]
        children: Vec<InlineNode>,
    },
    Strong {
        #[schema(no_recursion)]
        children: Vec<InlineNode>,
    },
    Link {
        href: String,
        title: String,
        #[schema(no_recursion)]
        children: Vec<InlineNode>,
    },
    Image { src: String, alt: String },
    /// Sanitized inline markup fragment.
    Html { html: String },
    Break,
}

/// RenderError
///
/// The distinct "content error" outcome for malformed input. Surfacing this as
/// a typed error (rather than a panic) lets the host page show a graceful error
/// panel instead of the article. It is deliberately separate from the
/// repository's not-found outcome.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("malformed article content: {0}")]
    MalformedContent(String),
}

// --- Syntax Highlighting Metadata ---

/// The fence language tags the frontend highlighter understands. Blocks tagged
/// outside this set are served as plain code.
const RECOGNIZED_LANGUAGES: &[&str] = &[
    "rust", "python", "javascript", "typescript", "c", "cpp", "java", "go", "sql", "bash",
    "shell", "html", "css", "json", "yaml", "toml",
];

/// recognized_language
///
/// Normalizes a fence info string to its highlighting tag: the first word,
/// lowercased, if it is in the recognized set.
pub fn recognized_language(info: &str) -> Option<String> {
    let tag = info.split_whitespace().next()?.to_lowercase();
    RECOGNIZED_LANGUAGES.contains(&tag.as_str()).then_some(tag)
}

// --- Renderer ---

/// render_body
///
/// Transforms a parsed article body (markdown with optional embedded raw HTML)
/// into the sanitized node tree.
///
/// Processing contract:
/// 1. Parse block structure (headings, paragraphs, lists, code fences, block
///    quotes, tables, links, images, inline code) into typed nodes.
/// 2. Sanitize: raw markup embedded in the input is stripped of executable
///    constructs (script tags, event handlers) before being admitted — this is
///    a hard security contract; unsanitized output never reaches the tree.
/// 3. Attach syntax-highlighting metadata to code blocks with recognized
///    language tags.
///
/// Structural imbalance in the event stream surfaces as
/// `RenderError::MalformedContent` rather than a panic.
pub fn render_body(body: &str) -> Result<Vec<ArticleNode>, RenderError> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(body, options) {
        builder.push_event(event)?;
    }
    builder.finish()
}

/// Container
///
/// One open frame on the builder stack. Each `Start` event opens a frame; the
/// matching `End` closes it and attaches the produced node to its parent.
enum Container {
    Heading { level: u8, inlines: Vec<InlineNode> },
    Paragraph { inlines: Vec<InlineNode> },
    BlockQuote { blocks: Vec<ArticleNode> },
    List { ordered: bool, items: Vec<Vec<ArticleNode>> },
    /// List items accept both blocks (loose lists) and bare inlines (tight
    /// lists); bare inlines are wrapped into a paragraph at close.
    Item { blocks: Vec<ArticleNode>, inlines: Vec<InlineNode> },
    CodeBlock { language: Option<String>, code: String },
    HtmlBlock { html: String },
    Table { header: Vec<Vec<InlineNode>>, rows: Vec<Vec<Vec<InlineNode>>> },
    TableHead { cells: Vec<Vec<InlineNode>> },
    TableRow { cells: Vec<Vec<InlineNode>> },
    TableCell { inlines: Vec<InlineNode> },
    Emphasis { inlines: Vec<InlineNode> },
    Strong { inlines: Vec<InlineNode> },
    Link { href: String, title: String, inlines: Vec<InlineNode> },
    Image { src: String, alt: String },
    /// Frames for markup outside the supported dialect. Content pushed into
    /// them is discarded at close, keeping the event stream balanced.
    Opaque,
}

/// TreeBuilder
///
/// Folds the parser's event stream into the node tree. The builder owns the
/// open-frame stack; completed top-level blocks accumulate in `root`.
struct TreeBuilder {
    root: Vec<ArticleNode>,
    stack: Vec<Container>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn push_event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_inline(InlineNode::Code {
                code: code.to_string(),
            }),
            Event::Html(html) => self.block_html(&html),
            Event::InlineHtml(html) => self.inline_html(&html),
            Event::SoftBreak => self.push_inline(InlineNode::Text {
                text: " ".to_string(),
            }),
            Event::HardBreak => self.push_inline(InlineNode::Break),
            Event::Rule => self.push_block(ArticleNode::Rule),
            // Footnotes, task lists and math are outside the supported dialect
            // and their extensions are not enabled; ignore defensively.
            _ => Ok(()),
        }
    }

    fn open(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        let frame = match tag {
            Tag::Paragraph => Container::Paragraph { inlines: vec![] },
            Tag::Heading { level, .. } => Container::Heading {
                // The dialect supports levels 1-3; deeper headings clamp to 3.
                level: (level as u8).min(3),
                inlines: vec![],
            },
            Tag::BlockQuote(_) => Container::BlockQuote { blocks: vec![] },
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => recognized_language(&info),
                    CodeBlockKind::Indented => None,
                };
                Container::CodeBlock {
                    language,
                    code: String::new(),
                }
            }
            Tag::List(start) => Container::List {
                ordered: start.is_some(),
                items: vec![],
            },
            Tag::Item => Container::Item {
                blocks: vec![],
                inlines: vec![],
            },
            Tag::Table(_) => Container::Table {
                header: vec![],
                rows: vec![],
            },
            Tag::TableHead => Container::TableHead { cells: vec![] },
            Tag::TableRow => Container::TableRow { cells: vec![] },
            Tag::TableCell => Container::TableCell { inlines: vec![] },
            Tag::Emphasis => Container::Emphasis { inlines: vec![] },
            Tag::Strong => Container::Strong { inlines: vec![] },
            Tag::Link {
                dest_url, title, ..
            } => Container::Link {
                href: dest_url.to_string(),
                title: title.to_string(),
                inlines: vec![],
            },
            Tag::Image { dest_url, .. } => Container::Image {
                src: dest_url.to_string(),
                alt: String::new(),
            },
            Tag::HtmlBlock => Container::HtmlBlock {
                html: String::new(),
            },
            _ => Container::Opaque,
        };
        self.stack.push(frame);
        Ok(())
    }

    /// Closes the topmost frame and attaches the node it produced to its parent.
    fn close(&mut self) -> Result<(), RenderError> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| RenderError::MalformedContent("unbalanced block close".into()))?;

        match frame {
            Container::Heading { level, inlines } => self.push_block(ArticleNode::Heading {
                level,
                children: inlines,
            }),
            Container::Paragraph { inlines } => {
                self.push_block(ArticleNode::Paragraph { children: inlines })
            }
            Container::BlockQuote { blocks } => {
                self.push_block(ArticleNode::BlockQuote { children: blocks })
            }
            Container::List { ordered, items } => {
                self.push_block(ArticleNode::List { ordered, items })
            }
            Container::Item { mut blocks, inlines } => {
                if !inlines.is_empty() {
                    // Tight list item: bare inline run becomes a paragraph.
                    blocks.push(ArticleNode::Paragraph { children: inlines });
                }
                match self.stack.last_mut() {
                    Some(Container::List { items, .. }) => {
                        items.push(blocks);
                        Ok(())
                    }
                    _ => Err(RenderError::MalformedContent(
                        "list item outside a list".into(),
                    )),
                }
            }
            Container::CodeBlock { language, code } => {
                self.push_block(ArticleNode::CodeBlock { language, code })
            }
            Container::HtmlBlock { html } => {
                // Sanitization boundary: executable constructs are removed
                // here; fragments that clean to nothing are dropped entirely.
                let clean = ammonia::clean(&html);
                if clean.trim().is_empty() {
                    Ok(())
                } else {
                    self.push_block(ArticleNode::Html { html: clean })
                }
            }
            Container::Table { header, rows } => {
                self.push_block(ArticleNode::Table { header, rows })
            }
            Container::TableHead { cells } => match self.stack.last_mut() {
                Some(Container::Table { header, .. }) => {
                    *header = cells;
                    Ok(())
                }
                _ => Err(RenderError::MalformedContent(
                    "table head outside a table".into(),
                )),
            },
            Container::TableRow { cells } => match self.stack.last_mut() {
                Some(Container::Table { rows, .. }) => {
                    rows.push(cells);
                    Ok(())
                }
                _ => Err(RenderError::MalformedContent(
                    "table row outside a table".into(),
                )),
            },
            Container::TableCell { inlines } => match self.stack.last_mut() {
                Some(Container::TableHead { cells } | Container::TableRow { cells }) => {
                    cells.push(inlines);
                    Ok(())
                }
                _ => Err(RenderError::MalformedContent(
                    "table cell outside a row".into(),
                )),
            },
            Container::Emphasis { inlines } => {
                self.push_inline(InlineNode::Emphasis { children: inlines })
            }
            Container::Strong { inlines } => {
                self.push_inline(InlineNode::Strong { children: inlines })
            }
            Container::Link {
                href,
                title,
                inlines,
            } => self.push_inline(InlineNode::Link {
                href,
                title,
                children: inlines,
            }),
            Container::Image { src, alt } => self.push_inline(InlineNode::Image { src, alt }),
            Container::Opaque => Ok(()),
        }
    }

    /// Routes text to the frame that owns it: code blocks accumulate verbatim,
    /// images accumulate alt text, everything else receives an inline text node.
    fn text(&mut self, text: &str) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            Some(Container::CodeBlock { code, .. }) => {
                code.push_str(text);
                Ok(())
            }
            Some(Container::Image { alt, .. }) => {
                alt.push_str(text);
                Ok(())
            }
            Some(Container::HtmlBlock { html }) => {
                html.push_str(text);
                Ok(())
            }
            _ => self.push_inline(InlineNode::Text {
                text: text.to_string(),
            }),
        }
    }

    fn block_html(&mut self, html: &str) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            Some(Container::HtmlBlock { html: buf }) => {
                buf.push_str(html);
                Ok(())
            }
            // Raw HTML outside an HTML block frame is treated as an inline
            // fragment and still goes through the sanitizer.
            _ => self.inline_html(html),
        }
    }

    fn inline_html(&mut self, html: &str) -> Result<(), RenderError> {
        let clean = ammonia::clean(html);
        if clean.trim().is_empty() {
            return Ok(());
        }
        self.push_inline(InlineNode::Html { html: clean })
    }

    /// Attaches a completed block node to the nearest block container.
    fn push_block(&mut self, node: ArticleNode) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            None => {
                self.root.push(node);
                Ok(())
            }
            Some(Container::BlockQuote { blocks } | Container::Item { blocks, .. }) => {
                blocks.push(node);
                Ok(())
            }
            Some(Container::Opaque) => Ok(()),
            Some(_) => Err(RenderError::MalformedContent(
                "block node inside an inline container".into(),
            )),
        }
    }

    /// Attaches an inline node to the nearest inline container. Alt text
    /// carries no structure, so markup inside an image flattens to plain text.
    fn push_inline(&mut self, node: InlineNode) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            Some(
                Container::Heading { inlines, .. }
                | Container::Paragraph { inlines }
                | Container::TableCell { inlines }
                | Container::Emphasis { inlines }
                | Container::Strong { inlines }
                | Container::Link { inlines, .. }
                | Container::Item { inlines, .. },
            ) => {
                inlines.push(node);
                Ok(())
            }
            Some(Container::Image { alt, .. }) => {
                alt.push_str(&alt_text(&node));
                Ok(())
            }
            Some(Container::Opaque) => Ok(()),
            _ => Err(RenderError::MalformedContent(
                "inline node outside an inline container".into(),
            )),
        }
    }

    fn finish(self) -> Result<Vec<ArticleNode>, RenderError> {
        if !self.stack.is_empty() {
            return Err(RenderError::MalformedContent(
                "unclosed block at end of input".into(),
            ));
        }
        Ok(self.root)
    }
}

/// Flattens an inline node to the plain text it would display as, for use as
/// image alt text. Emphasis, links, and code keep their textual content;
/// markup fragments contribute nothing.
fn alt_text(node: &InlineNode) -> String {
    match node {
        InlineNode::Text { text } => text.clone(),
        InlineNode::Code { code } => code.clone(),
        InlineNode::Emphasis { children }
        | InlineNode::Strong { children }
        | InlineNode::Link { children, .. } => children.iter().map(alt_text).collect(),
        InlineNode::Image { alt, .. } => alt.clone(),
        InlineNode::Html { .. } => String::new(),
        InlineNode::Break => " ".to_string(),
    }
}
