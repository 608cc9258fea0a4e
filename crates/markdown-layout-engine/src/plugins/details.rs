//! Lifts the raw HTML disclosure idiom
//!
//! ```text
//! <details [open]>
//! <summary>...</summary>   or   <summary> ... </summary>
//! ...body markdown...
//! </details>
//! ```
//!
//! into [`NodeKind::Details`] / [`NodeKind::Summary`] nodes. The parser keeps
//! HTML as raw Text, so tags are recognised by matching whole lines.
//! Unbalanced markup is left exactly as parsed.

use std::sync::LazyLock;

use regex::Regex;

use crate::nodes::{Node, NodeKind, NodeRef};

use super::{AstPlugin, raw_line, rebuild_children, source_span};

static DETAILS_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<details(?:\s+[^>]*)?>$").expect("valid regex"));
static DETAILS_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^</details>$").expect("valid regex"));
static SUMMARY_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<summary(?:\s+[^>]*)?>$").expect("valid regex"));
static SUMMARY_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^</summary>$").expect("valid regex"));
static SUMMARY_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^<summary(?:\s+[^>]*)?>(.*?)</summary>$").expect("valid regex")
});
static OPEN_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bopen\b").expect("valid regex"));

#[derive(Debug, Default, Clone, Copy)]
pub struct DetailsExtractionPlugin;

impl AstPlugin for DetailsExtractionPlugin {
    fn name(&self) -> &'static str {
        "details"
    }

    fn visit(&self, nodes: Vec<NodeRef>) -> Vec<NodeRef> {
        rewrite_siblings(&nodes)
    }
}

fn rewrite_siblings(nodes: &[NodeRef]) -> Vec<NodeRef> {
    let rewritten: Vec<NodeRef> = nodes.iter().map(rewrite_node_children).collect();
    let expanded = expand_tag_lines(&rewritten);
    match merge_details(&expanded, &rewritten) {
        Some(merged) => merged,
        // nothing matched: keep the raw nodes, unsplit
        None => rewritten,
    }
}

fn rewrite_node_children(node: &NodeRef) -> NodeRef {
    rebuild_children(node, rewrite_siblings)
}

fn looks_like_details_markup(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["<details", "</details>", "<summary", "</summary>"]
        .iter()
        .any(|tag| lower.contains(tag))
}

/// Sibling list after tag-line splitting. `origins[i]` is the index of the
/// unsplit sibling that `nodes[i]` came from.
struct Expanded {
    nodes: Vec<NodeRef>,
    origins: Vec<usize>,
}

/// Splits multi-line raw HTML Text nodes holding details/summary tags into
/// one Text node per non-blank line, so each tag can match on its own.
fn expand_tag_lines(siblings: &[NodeRef]) -> Expanded {
    let mut nodes = Vec::with_capacity(siblings.len());
    let mut origins = Vec::with_capacity(siblings.len());
    for (index, node) in siblings.iter().enumerate() {
        let split = node
            .as_text()
            .filter(|raw| raw.contains(['\n', '\r']) && looks_like_details_markup(raw));
        let Some(raw) = split else {
            nodes.push(node.clone());
            origins.push(index);
            continue;
        };
        for line in raw.split(['\n', '\r']).map(str::trim).filter(|l| !l.is_empty()) {
            let text = line.to_string();
            nodes.push(Node::with_range(NodeKind::Text { text }, node.range()));
            origins.push(index);
        }
    }
    Expanded { nodes, origins }
}

fn details_opener(node: &Node) -> Option<bool> {
    let text = raw_line(node)?;
    DETAILS_OPEN
        .is_match(&text)
        .then(|| OPEN_ATTR.is_match(&text))
}

fn matches_line(node: &Node, pattern: &Regex) -> bool {
    raw_line(node).is_some_and(|text| pattern.is_match(&text))
}

/// Merges balanced opener/closer runs into Details nodes. `None` when no
/// details block was found.
///
/// From an unterminated opener onwards the unsplit `siblings` are emitted,
/// so the opener's raw text and everything after it stay as parsed.
fn merge_details(expanded: &Expanded, siblings: &[NodeRef]) -> Option<Vec<NodeRef>> {
    let nodes = &expanded.nodes;
    let origins = &expanded.origins;
    let mut out = Vec::with_capacity(nodes.len());
    // origin of each verbatim node in `out`, `None` for merged Details
    let mut out_origins: Vec<Option<usize>> = Vec::with_capacity(nodes.len());
    let mut merged_end: Option<usize> = None;
    let mut i = 0;

    while i < nodes.len() {
        let Some(is_open) = details_opener(&nodes[i]) else {
            out.push(nodes[i].clone());
            out_origins.push(Some(origins[i]));
            i += 1;
            continue;
        };
        let Some(close) = find_details_close(nodes, i + 1) else {
            log::debug!("unterminated <details> left as raw text");
            let origin = origins[i];
            if merged_end == Some(origin) {
                // the sibling also closed a merged block; only its tail stays split
                let rest = nodes[i..].iter().zip(&origins[i..]);
                out.extend(rest.filter(|(_, o)| **o == origin).map(|(n, _)| n.clone()));
                out.extend(siblings[origin + 1..].iter().cloned());
            } else {
                while out_origins.last() == Some(&Some(origin)) {
                    out.pop();
                    out_origins.pop();
                }
                out.extend(siblings[origin..].iter().cloned());
            }
            break;
        };

        let (summary, body) = extract_summary_and_body(&nodes[i + 1..close]);
        out.push(Node::with_range(
            NodeKind::Details {
                is_open,
                summary,
                children: body,
            },
            source_span(&nodes[i], &nodes[close]).or(nodes[i].range()),
        ));
        out_origins.push(None);
        merged_end = Some(origins[close]);
        i = close + 1;
    }

    merged_end.is_some().then_some(out)
}

fn find_details_close(nodes: &[NodeRef], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, node) in nodes[start..].iter().enumerate() {
        if details_opener(node).is_some() {
            depth += 1;
        } else if matches_line(node, &DETAILS_CLOSE) {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}

fn extract_summary_and_body(inner: &[NodeRef]) -> (Option<NodeRef>, Vec<NodeRef>) {
    let Some(first) = inner.first() else {
        return (None, vec![]);
    };

    if let Some(text) = inline_summary_text(first) {
        let summary = Node::with_range(
            NodeKind::Summary {
                children: summary_children(&text),
            },
            first.range(),
        );
        return (Some(summary), rewrite_siblings(&inner[1..]));
    }

    if matches_line(first, &SUMMARY_OPEN) {
        if let Some(close) = (1..inner.len()).find(|&j| matches_line(&inner[j], &SUMMARY_CLOSE)) {
            let raw = &inner[1..close];
            let children = match raw {
                [only] if matches!(only.kind(), NodeKind::Paragraph { .. }) => {
                    rewrite_siblings(only.children())
                }
                _ => rewrite_siblings(raw),
            };
            let summary = Node::with_range(NodeKind::Summary { children }, first.range());
            return (Some(summary), rewrite_siblings(&inner[close + 1..]));
        }
    }

    (None, rewrite_siblings(inner))
}

fn inline_summary_text(node: &Node) -> Option<String> {
    let text = raw_line(node)?;
    let captures = SUMMARY_INLINE.captures(&text)?;
    Some(captures.get(1)?.as_str().to_string())
}

fn summary_children(text: &str) -> Vec<NodeRef> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return vec![];
    }
    vec![Node::text(html_escape::decode_html_entities(trimmed))]
}
