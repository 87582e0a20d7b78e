//! Rendered Document Tree
//!
//! Owned, renderer-independent representation of a rendered document.

/// Kind of a node in the rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading { level: u8 },
    Paragraph,
    Text(String),
    Code(String),
    CodeBlock { info: String, literal: String },
    HtmlBlock(String),
    HtmlInline(String),
    Link { url: String },
    Image { url: String },
    Emphasis,
    Strong,
    BlockQuote,
    List { ordered: bool },
    Item,
    ThematicBreak,
    SoftBreak,
    LineBreak,
    /// Constructs without a dedicated kind (tables, footnotes, ...)
    Other,
}

/// A node and its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    pub kind: NodeKind,
    pub children: Vec<DocNode>,
}

impl DocNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    /// Concatenated text content of this node and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(text) | NodeKind::Code(text) => out.push_str(text),
            NodeKind::CodeBlock { literal, .. } => out.push_str(literal),
            NodeKind::SoftBreak | NodeKind::LineBreak => out.push(' '),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a DocNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A fully rendered document: node tree plus its HTML serialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    root: DocNode,
    html: String,
}

impl DocumentTree {
    pub fn new(root: DocNode, html: String) -> Self {
        Self { root, html }
    }

    /// The document shown before anything has rendered successfully
    pub fn empty() -> Self {
        Self::new(DocNode::new(NodeKind::Document), String::new())
    }

    pub fn root(&self) -> &DocNode {
        &self.root
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Heading outline as `(level, text)` pairs in document order
    pub fn headings(&self) -> Vec<(u8, String)> {
        let mut headings = Vec::new();
        self.root.walk(&mut |node| {
            if let NodeKind::Heading { level } = node.kind {
                headings.push((level, node.text()));
            }
        });
        headings
    }

    pub fn plain_text(&self) -> String {
        self.root.text()
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::empty()
    }
}
