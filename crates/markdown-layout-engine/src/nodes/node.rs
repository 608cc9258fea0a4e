use std::sync::Arc;

use super::types::{
    CheckboxState, DiagramLanguage, MathStyle, NodeId, SourceRange, TableAlignment,
};

/// Shared handle to an immutable node. Layout results and parent nodes hold
/// these; a node lives as long as anything still refers to it.
pub type NodeRef = Arc<Node>;

/// One parsed Markdown construct.
///
/// Nodes are immutable once built. A rewrite constructs a new node (and so a
/// new [`NodeId`]) instead of editing in place, which is what lets several
/// layout passes share a tree without locking.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    range: Option<SourceRange>,
    kind: NodeKind,
}

/// The payload of a [`Node`], one variant per construct.
///
/// Leaf variants carry no children field, so "leaves have no children" holds
/// by construction.
#[derive(Debug)]
pub enum NodeKind {
    Document {
        children: Vec<NodeRef>,
    },
    Header {
        level: u8,
        children: Vec<NodeRef>,
    },
    Paragraph {
        children: Vec<NodeRef>,
    },
    Text {
        text: String,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    InlineCode {
        code: String,
    },
    Image {
        source: Option<String>,
        alt_text: Option<String>,
        title: Option<String>,
    },
    Link {
        destination: Option<String>,
        title: Option<String>,
        children: Vec<NodeRef>,
    },
    List {
        is_ordered: bool,
        children: Vec<NodeRef>,
    },
    ListItem {
        checkbox: CheckboxState,
        children: Vec<NodeRef>,
    },
    Table {
        alignments: Vec<Option<TableAlignment>>,
        children: Vec<NodeRef>,
    },
    TableHead {
        children: Vec<NodeRef>,
    },
    TableBody {
        children: Vec<NodeRef>,
    },
    TableRow {
        children: Vec<NodeRef>,
    },
    TableCell {
        children: Vec<NodeRef>,
    },
    Emphasis {
        children: Vec<NodeRef>,
    },
    Strong {
        children: Vec<NodeRef>,
    },
    Strikethrough {
        children: Vec<NodeRef>,
    },
    BlockQuote {
        children: Vec<NodeRef>,
    },
    ThematicBreak,
    Math {
        style: MathStyle,
        equation: String,
    },
    Diagram {
        language: DiagramLanguage,
        source: String,
    },
    /// `children` is the body; the summary is kept apart so a closed
    /// disclosure can skip the body entirely.
    Details {
        is_open: bool,
        summary: Option<NodeRef>,
        children: Vec<NodeRef>,
    },
    Summary {
        children: Vec<NodeRef>,
    },
}

impl Node {
    /// Builds a synthetic node with no source range.
    pub fn new(kind: NodeKind) -> NodeRef {
        Self::with_range(kind, None)
    }

    pub fn with_range(kind: NodeKind, range: Option<SourceRange>) -> NodeRef {
        Arc::new(Node {
            id: NodeId::new(),
            range,
            kind,
        })
    }

    pub fn text(text: impl Into<String>) -> NodeRef {
        Self::new(NodeKind::Text { text: text.into() })
    }

    pub fn paragraph(children: Vec<NodeRef>) -> NodeRef {
        Self::new(NodeKind::Paragraph { children })
    }

    pub fn document(children: Vec<NodeRef>) -> NodeRef {
        Self::new(NodeKind::Document { children })
    }

    pub fn math(style: MathStyle, equation: impl Into<String>) -> NodeRef {
        Self::new(NodeKind::Math {
            style,
            equation: equation.into(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Short variant name, used in logs and tree outlines.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Document { .. } => "Document",
            NodeKind::Header { .. } => "Header",
            NodeKind::Paragraph { .. } => "Paragraph",
            NodeKind::Text { .. } => "Text",
            NodeKind::CodeBlock { .. } => "CodeBlock",
            NodeKind::InlineCode { .. } => "InlineCode",
            NodeKind::Image { .. } => "Image",
            NodeKind::Link { .. } => "Link",
            NodeKind::List { .. } => "List",
            NodeKind::ListItem { .. } => "ListItem",
            NodeKind::Table { .. } => "Table",
            NodeKind::TableHead { .. } => "TableHead",
            NodeKind::TableBody { .. } => "TableBody",
            NodeKind::TableRow { .. } => "TableRow",
            NodeKind::TableCell { .. } => "TableCell",
            NodeKind::Emphasis { .. } => "Emphasis",
            NodeKind::Strong { .. } => "Strong",
            NodeKind::Strikethrough { .. } => "Strikethrough",
            NodeKind::BlockQuote { .. } => "BlockQuote",
            NodeKind::ThematicBreak => "ThematicBreak",
            NodeKind::Math { .. } => "Math",
            NodeKind::Diagram { .. } => "Diagram",
            NodeKind::Details { .. } => "Details",
            NodeKind::Summary { .. } => "Summary",
        }
    }

    /// Ordered children; always empty for leaf kinds.
    ///
    /// For `Details` this is the body only, see [`Node::summary`].
    pub fn children(&self) -> &[NodeRef] {
        match &self.kind {
            NodeKind::Document { children }
            | NodeKind::Header { children, .. }
            | NodeKind::Paragraph { children }
            | NodeKind::Link { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::ListItem { children, .. }
            | NodeKind::Table { children, .. }
            | NodeKind::TableHead { children }
            | NodeKind::TableBody { children }
            | NodeKind::TableRow { children }
            | NodeKind::TableCell { children }
            | NodeKind::Emphasis { children }
            | NodeKind::Strong { children }
            | NodeKind::Strikethrough { children }
            | NodeKind::BlockQuote { children }
            | NodeKind::Details { children, .. }
            | NodeKind::Summary { children } => children,
            NodeKind::Text { .. }
            | NodeKind::CodeBlock { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::Image { .. }
            | NodeKind::ThematicBreak
            | NodeKind::Math { .. }
            | NodeKind::Diagram { .. } => &[],
        }
    }

    pub fn summary(&self) -> Option<&NodeRef> {
        match &self.kind {
            NodeKind::Details { summary, .. } => summary.as_ref(),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::InlineCode { .. }
                | NodeKind::Image { .. }
                | NodeKind::ThematicBreak
                | NodeKind::Math { .. }
                | NodeKind::Diagram { .. }
        )
    }

    /// The string payload of a `Text` node.
    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Rebuilds this node with the same payload and range but new children,
    /// under a fresh id.
    ///
    /// Leaf kinds ignore `children`. For `Details` the summary is carried over
    /// unchanged; use [`Node::details_with`] to replace it too.
    pub fn with_children(&self, children: Vec<NodeRef>) -> NodeRef {
        let kind = match &self.kind {
            NodeKind::Document { .. } => NodeKind::Document { children },
            NodeKind::Header { level, .. } => NodeKind::Header {
                level: *level,
                children,
            },
            NodeKind::Paragraph { .. } => NodeKind::Paragraph { children },
            NodeKind::Link {
                destination, title, ..
            } => NodeKind::Link {
                destination: destination.clone(),
                title: title.clone(),
                children,
            },
            NodeKind::List { is_ordered, .. } => NodeKind::List {
                is_ordered: *is_ordered,
                children,
            },
            NodeKind::ListItem { checkbox, .. } => NodeKind::ListItem {
                checkbox: *checkbox,
                children,
            },
            NodeKind::Table { alignments, .. } => NodeKind::Table {
                alignments: alignments.clone(),
                children,
            },
            NodeKind::TableHead { .. } => NodeKind::TableHead { children },
            NodeKind::TableBody { .. } => NodeKind::TableBody { children },
            NodeKind::TableRow { .. } => NodeKind::TableRow { children },
            NodeKind::TableCell { .. } => NodeKind::TableCell { children },
            NodeKind::Emphasis { .. } => NodeKind::Emphasis { children },
            NodeKind::Strong { .. } => NodeKind::Strong { children },
            NodeKind::Strikethrough { .. } => NodeKind::Strikethrough { children },
            NodeKind::BlockQuote { .. } => NodeKind::BlockQuote { children },
            NodeKind::Details {
                is_open, summary, ..
            } => NodeKind::Details {
                is_open: *is_open,
                summary: summary.clone(),
                children,
            },
            NodeKind::Summary { .. } => NodeKind::Summary { children },
            NodeKind::Text { text } => NodeKind::Text { text: text.clone() },
            NodeKind::CodeBlock { language, code } => NodeKind::CodeBlock {
                language: language.clone(),
                code: code.clone(),
            },
            NodeKind::InlineCode { code } => NodeKind::InlineCode { code: code.clone() },
            NodeKind::Image {
                source,
                alt_text,
                title,
            } => NodeKind::Image {
                source: source.clone(),
                alt_text: alt_text.clone(),
                title: title.clone(),
            },
            NodeKind::ThematicBreak => NodeKind::ThematicBreak,
            NodeKind::Math { style, equation } => NodeKind::Math {
                style: *style,
                equation: equation.clone(),
            },
            NodeKind::Diagram { language, source } => NodeKind::Diagram {
                language: *language,
                source: source.clone(),
            },
        };
        Self::with_range(kind, self.range)
    }

    /// Rebuilds a `Details` node with a new summary and body. Other kinds
    /// fall back to [`Node::with_children`] with `children`.
    pub fn details_with(&self, summary: Option<NodeRef>, children: Vec<NodeRef>) -> NodeRef {
        match &self.kind {
            NodeKind::Details { is_open, .. } => Self::with_range(
                NodeKind::Details {
                    is_open: *is_open,
                    summary,
                    children,
                },
                self.range,
            ),
            _ => self.with_children(children),
        }
    }

    /// Concatenated text content of this subtree.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { text } => out.push_str(text),
            NodeKind::InlineCode { code } | NodeKind::CodeBlock { code, .. } => out.push_str(code),
            NodeKind::Math { equation, .. } => out.push_str(equation),
            NodeKind::Diagram { source, .. } => out.push_str(source),
            NodeKind::Image { alt_text, .. } => {
                if let Some(alt) = alt_text {
                    out.push_str(alt);
                }
            }
            _ => {
                if let Some(summary) = self.summary() {
                    summary.collect_text(out);
                }
                for child in self.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of levels below this node: 0 for a node without children.
    pub fn depth(&self) -> usize {
        let summary_depth = self.summary().map(|s| s.depth() + 1).unwrap_or(0);
        self.children()
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
            .max(summary_depth)
    }

    /// Depth-first, pre-order walk over this subtree (summaries included).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Some(summary) = self.summary() {
            summary.walk(visit);
        }
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_report_no_children() {
        let leaves = [
            Node::text("a"),
            Node::new(NodeKind::CodeBlock {
                language: None,
                code: "x".into(),
            }),
            Node::new(NodeKind::ThematicBreak),
            Node::math(MathStyle::Inline, "x"),
            Node::new(NodeKind::Diagram {
                language: DiagramLanguage::Mermaid,
                source: "graph TD".into(),
            }),
        ];
        for leaf in leaves {
            assert!(leaf.is_leaf());
            assert!(leaf.children().is_empty());
        }
    }

    #[test]
    fn identical_content_has_distinct_identity() {
        let a = Node::text("same");
        let b = Node::text("same");
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn with_children_rebuilds_under_new_id() {
        let original = Node::new(NodeKind::Header {
            level: 2,
            children: vec![Node::text("old")],
        });
        let rebuilt = original.with_children(vec![Node::text("new")]);

        assert_ne!(original.id(), rebuilt.id());
        assert!(matches!(rebuilt.kind(), NodeKind::Header { level: 2, .. }));
        assert_eq!(rebuilt.plain_text(), "new");
        // the original is untouched
        assert_eq!(original.plain_text(), "old");
    }

    #[test]
    fn details_plain_text_includes_summary_and_body() {
        let summary = Node::new(NodeKind::Summary {
            children: vec![Node::text("Title ")],
        });
        let details = Node::new(NodeKind::Details {
            is_open: false,
            summary: Some(summary),
            children: vec![Node::paragraph(vec![Node::text("Body")])],
        });
        assert_eq!(details.plain_text(), "Title Body");
        assert_eq!(details.depth(), 2);
    }

    #[test]
    fn depth_counts_nested_levels() {
        let inner = Node::new(NodeKind::BlockQuote {
            children: vec![Node::paragraph(vec![Node::text("hi")])],
        });
        let outer = Node::new(NodeKind::BlockQuote {
            children: vec![inner],
        });
        assert_eq!(outer.depth(), 3);
        assert_eq!(Node::text("leaf").depth(), 0);
    }
}
