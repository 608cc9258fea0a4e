use crate::nodes::{Node, NodeKind, SourceRange};

/// Panics if `doc` breaks a structural invariant of trees built from
/// `source`.
pub fn check(source: &str, doc: &Node) {
    check_node(source.len(), doc, None);
}

/// Panics if more than `max_depth` containers are nested below `doc`.
pub fn check_depth(doc: &Node, max_depth: usize) {
    // the innermost level may be a leaf
    assert!(
        doc.depth() <= max_depth + 1,
        "tree depth {} exceeds clamp {}",
        doc.depth(),
        max_depth
    );
}

fn check_node(len: usize, node: &Node, parent: Option<SourceRange>) {
    if let Some(range) = node.range() {
        assert!(
            range.start <= range.end && range.end <= len,
            "{} range out of bounds: {:?} (source len: {})",
            node.kind_name(),
            range,
            len
        );
        if let Some(outer) = parent {
            assert!(
                range.start >= outer.start && range.end <= outer.end,
                "{} range {:?} not contained in parent range {:?}",
                node.kind_name(),
                range,
                outer
            );
        }
    }

    if node.is_leaf() {
        assert!(node.children().is_empty(), "leaf {} has children", node.kind_name());
    }

    match node.kind() {
        NodeKind::List { children, .. } => {
            for child in children {
                assert!(
                    matches!(child.kind(), NodeKind::ListItem { .. }),
                    "List holds a {}",
                    child.kind_name()
                );
            }
        }
        NodeKind::Table { children, .. } => {
            for child in children {
                assert!(
                    matches!(
                        child.kind(),
                        NodeKind::TableHead { .. } | NodeKind::TableBody { .. }
                    ),
                    "Table holds a {}",
                    child.kind_name()
                );
            }
        }
        NodeKind::Details {
            summary: Some(summary),
            ..
        } => {
            assert!(
                matches!(summary.kind(), NodeKind::Summary { .. }),
                "Details summary is a {}",
                summary.kind_name()
            );
        }
        _ => {}
    }

    let scope = node.range().or(parent);
    if let Some(summary) = node.summary() {
        check_node(len, summary, scope);
    }
    for child in node.children() {
        check_node(len, child, scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_document;

    #[test]
    fn parsed_documents_hold_invariants() {
        let source = "# T\n\n> quote\n> - a\n> - b\n\n| x |\n|---|\n| 1 |\n\n```js\nx\n```\n";
        let doc = parse_document(source, &[]);
        check(source, &doc);
        check_depth(&doc, 50);
    }

    #[test]
    #[should_panic(expected = "List holds a Paragraph")]
    fn list_of_paragraphs_is_rejected() {
        let list = Node::new(NodeKind::List {
            is_ordered: false,
            children: vec![Node::paragraph(vec![])],
        });
        check("", &list);
    }
}
