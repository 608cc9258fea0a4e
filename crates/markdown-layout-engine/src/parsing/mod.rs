//! # Parser facade
//!
//! Turns Markdown source into a [`Node`] tree in two stages:
//!
//! 1. **Tree building** (`builder`): pulldown-cmark's CommonMark/GFM event
//!    stream is folded into nodes on a frame stack, with a nesting clamp so
//!    pathological input cannot produce an unbounded tree.
//! 2. **Plugins**: each [`AstPlugin`] rewrites the document's top-level
//!    sibling list in caller order. See [`crate::plugins`].
//!
//! Parsing is total: every input string yields a document.

pub mod builder;
pub mod snapshot;

use crate::nodes::{Node, NodeKind, NodeRef, SourceRange};
use crate::plugins::{AstPlugin, apply_plugins};
use crate::profiler::{self, Metric};

pub use builder::TreeBuilder;

/// Default nesting clamp for recursive constructs such as block quotes.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Parser with an owned plugin pipeline.
pub struct MarkdownParser {
    plugins: Vec<Box<dyn AstPlugin>>,
    max_depth: usize,
}

impl MarkdownParser {
    pub fn new(plugins: Vec<Box<dyn AstPlugin>>) -> Self {
        Self {
            plugins,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Overrides the nesting clamp. A clamp of zero builds no containers.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn plugins(&self) -> &[Box<dyn AstPlugin>] {
        &self.plugins
    }

    pub fn parse(&self, text: &str) -> NodeRef {
        parse_with_depth(text, &self.plugins, self.max_depth)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(vec![])
    }
}

/// Parses `text` with the default nesting clamp and runs `plugins` over the
/// top-level children in order.
pub fn parse_document(text: &str, plugins: &[Box<dyn AstPlugin>]) -> NodeRef {
    parse_with_depth(text, plugins, DEFAULT_MAX_DEPTH)
}

fn parse_with_depth(text: &str, plugins: &[Box<dyn AstPlugin>], max_depth: usize) -> NodeRef {
    let children = profiler::measure(Metric::AstParsing, || {
        TreeBuilder::build(text, max_depth)
    });
    let children = apply_plugins(plugins, children);
    let range = SourceRange {
        start: 0,
        end: text.len(),
        line: 1,
    };
    Node::with_range(NodeKind::Document { children }, Some(range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::CheckboxState;
    use crate::parsing::snapshot::normalize;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> NodeRef {
        parse_document(text, &[])
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        let doc = parse("");
        assert!(matches!(doc.kind(), NodeKind::Document { .. }));
        assert!(doc.children().is_empty());
    }

    #[test]
    fn headings_keep_their_level() {
        let doc = parse("# One\n\n#### Four");
        let levels: Vec<_> = doc
            .children()
            .iter()
            .map(|c| match c.kind() {
                NodeKind::Header { level, .. } => *level,
                _ => 0,
            })
            .collect();
        assert_eq!(levels, vec![1, 4]);
    }

    #[test]
    fn fenced_code_language_is_first_info_word() {
        let doc = parse("```rust ignore\nfn main() {}\n```\n\n```\nplain\n```");
        match doc.children()[0].kind() {
            NodeKind::CodeBlock { language, code } => {
                assert_eq!(language.as_deref(), Some("rust"));
                assert_eq!(code, "fn main() {}\n");
            }
            other => panic!("expected code block, got {other:?}"),
        }
        assert!(matches!(
            doc.children()[1].kind(),
            NodeKind::CodeBlock { language: None, .. }
        ));
    }

    #[test]
    fn task_list_items_carry_checkbox_state() {
        let doc = parse("- [x] done\n- [ ] todo\n- plain");
        let list = &doc.children()[0];
        let states: Vec<_> = list
            .children()
            .iter()
            .map(|item| match item.kind() {
                NodeKind::ListItem { checkbox, .. } => *checkbox,
                _ => CheckboxState::None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                CheckboxState::Checked,
                CheckboxState::Unchecked,
                CheckboxState::None
            ]
        );
    }

    #[test]
    fn tight_list_items_get_a_paragraph() {
        let doc = parse("1. first\n2. second");
        let list = &doc.children()[0];
        assert!(matches!(list.kind(), NodeKind::List { is_ordered: true, .. }));
        for item in list.children() {
            assert!(matches!(
                item.children()[0].kind(),
                NodeKind::Paragraph { .. }
            ));
        }
    }

    #[test]
    fn html_blocks_become_raw_text() {
        let doc = parse("<div>\nhello\n</div>");
        assert_eq!(doc.children().len(), 1);
        assert_eq!(doc.children()[0].as_text(), Some("<div>\nhello\n</div>"));
    }

    #[test]
    fn images_collect_alt_text() {
        let doc = parse("![a *cat*](cat.png \"Cat\")");
        let image = &doc.children()[0].children()[0];
        match image.kind() {
            NodeKind::Image {
                source,
                alt_text,
                title,
            } => {
                assert_eq!(source.as_deref(), Some("cat.png"));
                assert_eq!(alt_text.as_deref(), Some("a cat"));
                assert_eq!(title.as_deref(), Some("Cat"));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn tables_have_head_and_body_sections() {
        let doc = parse("| a | b |\n|---|:-:|\n| 1 | 2 |\n| 3 | 4 |");
        let outline = normalize(&doc).to_string();
        assert_eq!(
            outline,
            [
                "Document",
                "  Table [-, center]",
                "    TableHead",
                "      TableRow",
                "        TableCell",
                "          Text \"a\"",
                "        TableCell",
                "          Text \"b\"",
                "    TableBody",
                "      TableRow",
                "        TableCell",
                "          Text \"1\"",
                "        TableCell",
                "          Text \"2\"",
                "      TableRow",
                "        TableCell",
                "          Text \"3\"",
                "        TableCell",
                "          Text \"4\"",
            ]
            .join("\n")
        );
    }

    #[test]
    fn deep_block_quotes_are_clamped() {
        let input = format!("{}Hello", "> ".repeat(2000));
        let doc = parse(&input);

        let mut quotes = 0;
        let mut node = doc.clone();
        while let Some(first) = node.children().first().cloned() {
            if matches!(first.kind(), NodeKind::BlockQuote { .. }) {
                quotes += 1;
            }
            node = first;
        }
        assert!(quotes <= DEFAULT_MAX_DEPTH, "{quotes} nested quotes");
        assert_eq!(doc.plain_text(), "Hello");
    }

    #[test]
    fn custom_depth_clamp() {
        let parser = MarkdownParser::default().with_max_depth(3);
        let doc = parser.parse("> > > > > deep");
        assert!(doc.depth() <= 4);
        assert_eq!(doc.plain_text(), "deep");
    }
}
