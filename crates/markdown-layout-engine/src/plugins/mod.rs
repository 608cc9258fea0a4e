//! # Tree-rewrite plugins
//!
//! A plugin receives one sibling list (initially the document's top-level
//! children) and returns its replacement. Plugins never mutate nodes; a
//! rewrite rebuilds the affected parents with [`Node::with_children`].
//! Each plugin walks into the containers it cares about itself.
//!
//! Plugins are order sensitive: a diagram fence inside a raw `<details>`
//! block is only visible to [`DiagramExtractionPlugin`] once
//! [`DetailsExtractionPlugin`] has lifted it into a proper child.
//! [`default_plugins`] returns the recommended order.

pub mod cursor;
pub mod details;
pub mod diagram;
pub mod math;

use std::sync::Arc;

use crate::nodes::{Node, NodeKind, NodeRef, SourceRange};

pub use details::DetailsExtractionPlugin;
pub use diagram::DiagramExtractionPlugin;
pub use math::MathExtractionPlugin;

/// A pure sibling-list rewrite applied after the initial parse.
pub trait AstPlugin: Send + Sync {
    /// Name used in pipeline logs.
    fn name(&self) -> &'static str;

    fn visit(&self, nodes: Vec<NodeRef>) -> Vec<NodeRef>;
}

/// Details, then Diagram, then Math.
pub fn default_plugins() -> Vec<Box<dyn AstPlugin>> {
    vec![
        Box::new(DetailsExtractionPlugin),
        Box::new(DiagramExtractionPlugin),
        Box::new(MathExtractionPlugin),
    ]
}

/// Runs `plugins` over `nodes` in order, each seeing the previous output.
pub fn apply_plugins(plugins: &[Box<dyn AstPlugin>], nodes: Vec<NodeRef>) -> Vec<NodeRef> {
    plugins.iter().fold(nodes, |nodes, plugin| {
        let before = nodes.len();
        let out = plugin.visit(nodes);
        log::debug!(
            "plugin {} rewrote {} top-level node(s) into {}",
            plugin.name(),
            before,
            out.len()
        );
        out
    })
}

/// Rebuilds `node` with `rewrite` applied to its children, keeping the
/// original node when nothing changed.
///
/// Leaves are returned as-is. Shared by the plugins' recursive transforms.
pub(crate) fn rebuild_children(
    node: &NodeRef,
    mut rewrite: impl FnMut(&[NodeRef]) -> Vec<NodeRef>,
) -> NodeRef {
    if node.is_leaf() {
        return node.clone();
    }
    let children = rewrite(node.children());
    let summary = match node.kind() {
        NodeKind::Details {
            summary: Some(summary),
            ..
        } => {
            let rewritten = rewrite(std::slice::from_ref(summary));
            // a summary rewrites to exactly one node; anything else keeps it
            match <[NodeRef; 1]>::try_from(rewritten) {
                Ok([s]) => Some(s),
                Err(_) => Some(summary.clone()),
            }
        }
        _ => None,
    };

    let unchanged_children = same_nodes(&children, node.children());
    let unchanged_summary = match (summary.as_ref(), node.summary()) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => true,
    };
    if unchanged_children && unchanged_summary {
        return node.clone();
    }

    match node.kind() {
        NodeKind::Details { .. } => node.details_with(summary, children),
        _ => node.with_children(children),
    }
}

fn same_nodes(a: &[NodeRef], b: &[NodeRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

/// Range covering `first` through `last`, when both came from source.
pub(crate) fn source_span(first: &Node, last: &Node) -> Option<SourceRange> {
    let (a, b) = (first.range()?, last.range()?);
    Some(SourceRange {
        start: a.start,
        end: b.end,
        line: a.line,
    })
}

/// Text of a node that reads as one raw line: a Text node, or a Paragraph
/// whose children are all Text, concatenated. Trimmed.
pub(crate) fn raw_line(node: &Node) -> Option<String> {
    match node.kind() {
        NodeKind::Text { text } => Some(text.trim().to_string()),
        NodeKind::Paragraph { children } => {
            let mut out = String::new();
            for child in children {
                out.push_str(child.as_text()?);
            }
            Some(out.trim().to_string())
        }
        _ => None,
    }
}
