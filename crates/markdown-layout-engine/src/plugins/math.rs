//! LaTeX math extraction: `$...$` inline, `$$...$$` blocks and
//! `math`/`latex`/`tex` fences become [`NodeKind::Math`] nodes.

use crate::nodes::{MathStyle, Node, NodeKind, NodeRef};

use super::cursor::Cursor;
use super::{AstPlugin, rebuild_children, source_span};

const MATH_FENCES: [&str; 3] = ["math", "latex", "tex"];

#[derive(Debug, Default, Clone, Copy)]
pub struct MathExtractionPlugin;

impl AstPlugin for MathExtractionPlugin {
    fn name(&self) -> &'static str {
        "math"
    }

    fn visit(&self, nodes: Vec<NodeRef>) -> Vec<NodeRef> {
        merge_block_math(nodes).iter().map(transform).collect()
    }
}

/// Text of a paragraph made only of Text children. Any other child
/// disqualifies it as a block math delimiter or body.
fn paragraph_text(node: &Node) -> Option<String> {
    match node.kind() {
        NodeKind::Paragraph { children } => children.iter().map(|c| c.as_text()).collect(),
        _ => None,
    }
}

fn candidate_text(node: &Node) -> String {
    paragraph_text(node).unwrap_or_else(|| node.plain_text())
}

fn is_block_delimiter(node: &Node) -> bool {
    candidate_text(node).trim() == "$$"
}

fn merge_block_math(nodes: Vec<NodeRef>) -> Vec<NodeRef> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut i = 0;
    while i < nodes.len() {
        if let Some(text) = paragraph_text(&nodes[i]) {
            let full = text.trim();
            if full.starts_with("$$") {
                if full.ends_with("$$") && full.chars().count() > 4 {
                    let equation = full[2..full.len() - 2].trim();
                    out.push(Node::with_range(
                        NodeKind::Math {
                            style: MathStyle::Block,
                            equation: equation.to_string(),
                        },
                        nodes[i].range(),
                    ));
                    i += 1;
                    continue;
                }

                if full == "$$" {
                    let closer = (i + 1..nodes.len()).find(|&j| is_block_delimiter(&nodes[j]));
                    if let Some(close) = closer {
                        let equation = nodes[i + 1..close]
                            .iter()
                            .map(|n| candidate_text(n).trim().to_string())
                            .collect::<Vec<_>>()
                            .join("\n");
                        out.push(Node::with_range(
                            NodeKind::Math {
                                style: MathStyle::Block,
                                equation: equation.trim().to_string(),
                            },
                            source_span(&nodes[i], &nodes[close]),
                        ));
                        i = close + 1;
                        continue;
                    }
                    log::debug!("unterminated $$ block left as text");
                }
            }
        }
        out.push(nodes[i].clone());
        i += 1;
    }
    out
}

fn transform(node: &NodeRef) -> NodeRef {
    match node.kind() {
        NodeKind::CodeBlock {
            language: Some(language),
            code,
        } if is_math_fence(language) => Node::with_range(
            NodeKind::Math {
                style: MathStyle::Block,
                equation: code.trim().to_string(),
            },
            node.range(),
        ),
        NodeKind::Paragraph { .. }
        | NodeKind::Header { .. }
        | NodeKind::Link { .. }
        | NodeKind::Emphasis { .. }
        | NodeKind::Strong { .. }
        | NodeKind::Strikethrough { .. }
        | NodeKind::TableCell { .. }
        | NodeKind::Summary { .. } => rebuild_children(node, process_inline_children),
        _ => rebuild_children(node, |children| children.iter().map(transform).collect()),
    }
}

fn is_math_fence(language: &str) -> bool {
    let language = language.trim().to_lowercase();
    MATH_FENCES.contains(&language.as_str())
}

fn process_inline_children(children: &[NodeRef]) -> Vec<NodeRef> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        match child.as_text() {
            Some(text) => match extract_inline_math(text) {
                Some(pieces) => out.extend(pieces),
                None => out.push(child.clone()),
            },
            None => out.push(transform(child)),
        }
    }
    out
}

/// A `$` next to another unescaped `$` belongs to a `$$` marker.
fn is_double_dollar(cur: &Cursor<'_>, at: usize) -> bool {
    let dollar_at = |i: usize| cur.peek_at(i) == Some(b'$') && !cur.is_escaped(i);
    (at > 0 && dollar_at(at - 1)) || dollar_at(at + 1)
}

fn is_valid_inline_equation(equation: &str) -> bool {
    let trimmed = equation.trim();
    if trimmed.is_empty() || equation.contains('\n') {
        return false;
    }
    // `$word$` is far more often prose than math
    !(trimmed.chars().count() > 1 && trimmed.chars().all(char::is_alphabetic))
}

/// Splits `text` around inline equations. `None` when it holds none.
fn extract_inline_math(text: &str) -> Option<Vec<NodeRef>> {
    let mut cur = Cursor::new(text);
    let mut out = vec![];
    let mut buffer = String::new();

    while !cur.eof() {
        let at = cur.pos();
        if cur.peek() == Some(b'$') && !cur.is_escaped(at) && !is_double_dollar(&cur, at) {
            let close = cur.find_unescaped(b'$', at + 1, |c| !is_double_dollar(&cur, c));
            if let Some(close) = close {
                let equation = &text[at + 1..close];
                if is_valid_inline_equation(equation) {
                    if !buffer.is_empty() {
                        out.push(Node::text(std::mem::take(&mut buffer)));
                    }
                    out.push(Node::math(MathStyle::Inline, equation));
                } else {
                    // keep the pair literal so the closer cannot open a new span
                    buffer.push_str(&text[at..=close]);
                }
                cur.seek(close + 1);
                continue;
            }
        }
        if let Some(c) = cur.bump_char() {
            buffer.push(c);
        }
    }

    if out.is_empty() {
        return None;
    }
    if !buffer.is_empty() {
        out.push(Node::text(buffer));
    }
    Some(out)
}
