//! Comrak Renderer
//!
//! CommonMark + GFM rendering with raw HTML passthrough.

use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};

use super::document::{DocNode, DocumentTree, NodeKind};
use super::{Render, RenderError};

/// Nesting depth past which subtrees are collapsed into [`NodeKind::Other`]
const MAX_NESTING: usize = 128;

/// Markdown renderer backed by comrak
#[derive(Debug, Clone)]
pub struct ComrakRenderer {
    options: Options<'static>,
    max_input_bytes: Option<usize>,
}

impl ComrakRenderer {
    pub fn new() -> Self {
        Self {
            options: default_options(),
            max_input_bytes: None,
        }
    }

    /// Reject inputs larger than `limit` bytes with [`RenderError::InputTooLarge`]
    pub fn with_max_input_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_input_bytes = limit;
        self
    }
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for ComrakRenderer {
    fn render(&self, text: &str) -> Result<DocumentTree, RenderError> {
        if let Some(limit) = self.max_input_bytes
            && text.len() > limit
        {
            return Err(RenderError::InputTooLarge {
                len: text.len(),
                limit,
            });
        }

        let arena = Arena::new();
        let root = parse_document(&arena, text, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(DocumentTree::new(convert_node(root, 0), html))
    }
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;

    // Embedded HTML is part of the document, not something to escape.
    options.render.r#unsafe = true;

    options
}

fn convert_node<'a>(node: &'a AstNode<'a>, depth: usize) -> DocNode {
    if depth >= MAX_NESTING {
        return DocNode::new(NodeKind::Other);
    }
    let kind = node_kind(&node.data.borrow().value);

    DocNode {
        kind,
        children: node
            .children()
            .map(|child| convert_node(child, depth + 1))
            .collect(),
    }
}

fn node_kind(value: &NodeValue) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level,
        },
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Text(text) => NodeKind::Text(text.to_string()),
        NodeValue::Code(code) => NodeKind::Code(code.literal.to_string()),
        NodeValue::CodeBlock(block) => NodeKind::CodeBlock {
            info: block.info.to_string(),
            literal: block.literal.to_string(),
        },
        NodeValue::HtmlBlock(block) => NodeKind::HtmlBlock(block.literal.to_string()),
        NodeValue::HtmlInline(html) => NodeKind::HtmlInline(html.to_string()),
        NodeValue::Link(link) => NodeKind::Link {
            url: link.url.to_string(),
        },
        NodeValue::Image(link) => NodeKind::Image {
            url: link.url.to_string(),
        },
        NodeValue::Emph => NodeKind::Emphasis,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => NodeKind::List {
            ordered: list.list_type == ListType::Ordered,
        },
        NodeValue::Item(_) => NodeKind::Item,
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::SoftBreak => NodeKind::SoftBreak,
        NodeValue::LineBreak => NodeKind::LineBreak,
        _ => NodeKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_paragraph() {
        let doc = ComrakRenderer::new()
            .render("# Title\n\nSome *text*.")
            .expect("render");

        assert_eq!(doc.headings(), vec![(1, "Title".to_string())]);
        assert!(doc.html().contains("<h1>Title</h1>"));
        assert!(doc.html().contains("<em>text</em>"));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let doc = ComrakRenderer::new()
            .render("<div class=\"note\">raw</div>\n\ntext <kbd>Ctrl</kbd>")
            .expect("render");

        assert!(doc.html().contains("<div class=\"note\">raw</div>"));
        assert!(doc.html().contains("<kbd>Ctrl</kbd>"));
        assert!(matches!(
            doc.root().children[0].kind,
            NodeKind::HtmlBlock(ref html) if html.contains("note")
        ));
    }

    #[test]
    fn test_empty_input_renders_empty_document() {
        let doc = ComrakRenderer::new().render("").expect("render");
        assert!(doc.is_empty());
        assert_eq!(doc.root().kind, NodeKind::Document);
    }

    #[test]
    fn test_ordered_list_and_code() {
        let doc = ComrakRenderer::new()
            .render("1. one\n2. `two`\n")
            .expect("render");

        let list = &doc.root().children[0];
        assert_eq!(list.kind, NodeKind::List { ordered: true });
        assert_eq!(list.children.len(), 2);
        assert!(list.children.iter().all(|item| item.kind == NodeKind::Item));
        assert!(doc.plain_text().contains("two"));
    }

    #[test]
    fn test_input_limit() {
        let renderer = ComrakRenderer::new().with_max_input_bytes(Some(4));

        assert!(renderer.render("abcd").is_ok());
        assert_eq!(
            renderer.render("abcde"),
            Err(RenderError::InputTooLarge { len: 5, limit: 4 })
        );
    }

    #[test]
    fn test_deep_nesting_is_collapsed() {
        fn depth(node: &DocNode) -> usize {
            1 + node.children.iter().map(depth).max().unwrap_or(0)
        }

        let text = format!("{}deep\n", "> ".repeat(MAX_NESTING + 20));
        let doc = ComrakRenderer::new().render(&text).expect("render");

        assert!(depth(doc.root()) <= MAX_NESTING + 1);
        assert!(!doc.plain_text().contains("deep"));
        assert!(doc.html().contains("deep"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = ComrakRenderer::new();
        let text = "## A\n\n- [ ] task\n- ~~done~~\n";
        assert_eq!(renderer.render(text), renderer.render(text));
    }
}
