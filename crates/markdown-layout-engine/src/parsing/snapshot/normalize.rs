use std::fmt;

use serde::Serialize;

use crate::nodes::{CheckboxState, MathStyle, Node, NodeKind, TableAlignment};

/// Id-free view of a node tree. `Display` renders it as an indented outline,
/// one node per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnap {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnap>,
}

pub fn normalize(node: &Node) -> NodeSnap {
    let mut children = Vec::with_capacity(node.children().len() + 1);
    if let Some(summary) = node.summary() {
        children.push(normalize(summary));
    }
    children.extend(node.children().iter().map(|c| normalize(c)));
    NodeSnap {
        label: label(node),
        children,
    }
}

fn label(node: &Node) -> String {
    let name = node.kind_name();
    match node.kind() {
        NodeKind::Header { level, .. } => format!("{name}({level})"),
        NodeKind::Text { text } => format!("{name} {text:?}"),
        NodeKind::InlineCode { code } => format!("{name} {code:?}"),
        NodeKind::CodeBlock { language, code } => match language {
            Some(lang) => format!("{name}({lang}) {code:?}"),
            None => format!("{name} {code:?}"),
        },
        NodeKind::Image {
            source, alt_text, ..
        } => format!(
            "{name} {:?} alt={:?}",
            source.as_deref().unwrap_or_default(),
            alt_text.as_deref().unwrap_or_default()
        ),
        NodeKind::Link { destination, .. } => {
            format!("{name} {:?}", destination.as_deref().unwrap_or_default())
        }
        NodeKind::List { is_ordered, .. } => {
            format!("{name}({})", if *is_ordered { "ordered" } else { "bullet" })
        }
        NodeKind::ListItem { checkbox, .. } => match checkbox {
            CheckboxState::Checked => format!("{name} [x]"),
            CheckboxState::Unchecked => format!("{name} [ ]"),
            CheckboxState::None => name.to_string(),
        },
        NodeKind::Table { alignments, .. } => {
            let cols: Vec<_> = alignments
                .iter()
                .map(|a| match a {
                    Some(TableAlignment::Left) => "left",
                    Some(TableAlignment::Center) => "center",
                    Some(TableAlignment::Right) => "right",
                    None => "-",
                })
                .collect();
            format!("{name} [{}]", cols.join(", "))
        }
        NodeKind::Math { style, equation } => {
            let style = match style {
                MathStyle::Block => "block",
                MathStyle::Inline => "inline",
            };
            format!("{name}({style}) {equation:?}")
        }
        NodeKind::Diagram { language, source } => format!("{name}({language}) {source:?}"),
        NodeKind::Details { is_open, .. } => {
            format!("{name}({})", if *is_open { "open" } else { "closed" })
        }
        _ => name.to_string(),
    }
}

impl NodeSnap {
    fn write_outline(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:width$}{}", "", self.label, width = indent * 2)?;
        for child in &self.children {
            writeln!(f)?;
            child.write_outline(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for NodeSnap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}
