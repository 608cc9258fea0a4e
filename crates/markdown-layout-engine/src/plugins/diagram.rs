//! Lifts fenced code blocks tagged `mermaid`, `geojson`, `topojson` or `stl`
//! into [`NodeKind::Diagram`] nodes. Other fences stay code blocks.

use crate::nodes::{DiagramLanguage, Node, NodeKind, NodeRef};

use super::{AstPlugin, rebuild_children};

#[derive(Debug, Default, Clone, Copy)]
pub struct DiagramExtractionPlugin;

impl AstPlugin for DiagramExtractionPlugin {
    fn name(&self) -> &'static str {
        "diagram"
    }

    fn visit(&self, nodes: Vec<NodeRef>) -> Vec<NodeRef> {
        nodes.iter().map(transform).collect()
    }
}

fn transform(node: &NodeRef) -> NodeRef {
    if let NodeKind::CodeBlock {
        language: Some(language),
        code,
    } = node.kind()
    {
        return match language.parse::<DiagramLanguage>() {
            Ok(language) => Node::with_range(
                NodeKind::Diagram {
                    language,
                    source: code.clone(),
                },
                node.range(),
            ),
            Err(_) => node.clone(),
        };
    }
    rebuild_children(node, |children| children.iter().map(transform).collect())
}
