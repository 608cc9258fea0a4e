use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};

use crate::nodes::{CheckboxState, Node, NodeKind, NodeRef, SourceRange, TableAlignment};

/// What an open frame will become once its end event arrives.
#[derive(Debug)]
enum FrameKind {
    Document,
    Header(u8),
    Paragraph,
    CodeBlock { language: Option<String> },
    HtmlBlock,
    Image { source: String, title: String },
    Link { destination: String, title: String },
    List { is_ordered: bool },
    ListItem { checkbox: CheckboxState },
    Table { alignments: Vec<Option<TableAlignment>> },
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    BlockQuote,
    /// A construct the node model has no variant for (footnote definitions,
    /// superscript, ...). Its children are spliced into the parent.
    Passthrough,
    /// A container opened beyond the nesting clamp. Never constructed; its
    /// children are spliced into the parent.
    Clamped,
}

impl FrameKind {
    /// Frames whose text events are raw content rather than inline text.
    fn collects_raw_text(&self) -> bool {
        matches!(self, FrameKind::CodeBlock { .. } | FrameKind::HtmlBlock)
    }

    /// Frames that count toward the nesting clamp.
    fn is_constructed(&self) -> bool {
        !matches!(
            self,
            FrameKind::Document | FrameKind::Passthrough | FrameKind::Clamped
        )
    }
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    start: usize,
    children: Vec<NodeRef>,
    /// Raw content for code and HTML blocks.
    raw: String,
    /// Adjacent text events waiting to be merged into one Text node.
    pending: Option<(String, Range<usize>)>,
}

impl Frame {
    fn new(kind: FrameKind, start: usize) -> Self {
        Self {
            kind,
            start,
            children: vec![],
            raw: String::new(),
            pending: None,
        }
    }
}

/// Maps byte offsets to 1-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// Folds a pulldown-cmark event stream into [`Node`]s.
///
/// Containers are tracked on a frame stack, so arbitrarily deep input never
/// recurses. Containers that would nest deeper than `max_depth` are not
/// constructed: their content is attached to the deepest constructed
/// ancestor instead.
pub struct TreeBuilder<'a> {
    source: &'a str,
    lines: LineIndex,
    stack: Vec<Frame>,
    max_depth: usize,
    depth: usize,
    clamped: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(source: &'a str, max_depth: usize) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            stack: vec![Frame::new(FrameKind::Document, 0)],
            max_depth,
            depth: 0,
            clamped: 0,
        }
    }

    pub fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options
    }

    /// Parses `source` and returns the document's top-level children.
    pub fn build(source: &'a str, max_depth: usize) -> Vec<NodeRef> {
        let mut builder = Self::new(source, max_depth);
        for (event, range) in Parser::new_ext(source, Self::options()).into_offset_iter() {
            builder.push(event, range);
        }
        builder.finish()
    }

    pub fn push(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.open(tag, range.start),
            Event::End(_) => self.close(range.end),
            Event::Text(text) => self.push_text(&text, range),
            Event::Code(code) => self.push_node(
                NodeKind::InlineCode {
                    code: code.to_string(),
                },
                range,
            ),
            Event::Html(html) => {
                if self.top().kind.collects_raw_text() {
                    self.top_mut().raw.push_str(&html);
                } else {
                    self.push_node(NodeKind::Text { text: html.to_string() }, range);
                }
            }
            Event::InlineHtml(html) => {
                self.push_node(NodeKind::Text { text: html.to_string() }, range)
            }
            Event::InlineMath(math) => {
                self.push_node(NodeKind::Text { text: format!("${math}$") }, range)
            }
            Event::DisplayMath(math) => {
                self.push_node(NodeKind::Text { text: format!("$${math}$$") }, range)
            }
            Event::FootnoteReference(label) => {
                self.push_node(NodeKind::Text { text: format!("[^{label}]") }, range)
            }
            Event::SoftBreak => self.push_node(NodeKind::Text { text: " ".into() }, range),
            Event::HardBreak => self.push_node(NodeKind::Text { text: "\n".into() }, range),
            Event::Rule => self.push_node(NodeKind::ThematicBreak, range),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    pub fn finish(mut self) -> Vec<NodeRef> {
        // Unbalanced input cannot come out of pulldown-cmark, but close
        // anything left open rather than losing it.
        let end = self.source.len();
        while self.stack.len() > 1 {
            self.close(end);
        }
        if self.clamped > 0 {
            log::debug!(
                "nesting clamp at depth {} dropped {} container(s)",
                self.max_depth,
                self.clamped
            );
        }
        let mut root = self.stack.pop().unwrap_or_else(|| Frame::new(FrameKind::Document, 0));
        Self::flush_text(&self.lines, &mut root);
        root.children
    }

    fn top(&self) -> &Frame {
        // The document frame is never popped while events arrive.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, tag: Tag<'_>, start: usize) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Header(level as u8),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => FrameKind::CodeBlock {
                language: info.split_whitespace().next().map(str::to_string),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => FrameKind::CodeBlock { language: None },
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::List(first) => FrameKind::List {
                is_ordered: first.is_some(),
            },
            Tag::Item => FrameKind::ListItem {
                checkbox: CheckboxState::None,
            },
            Tag::Table(alignments) => FrameKind::Table {
                alignments: alignments.into_iter().map(table_alignment).collect(),
            },
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => FrameKind::TableRow,
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                destination: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                source: dest_url.to_string(),
                title: title.to_string(),
            },
            _ => FrameKind::Passthrough,
        };

        let kind = if kind.is_constructed() && self.depth >= self.max_depth {
            self.clamped += 1;
            FrameKind::Clamped
        } else {
            kind
        };
        if kind.is_constructed() {
            self.depth += 1;
        }

        self.flush_top();
        self.stack.push(Frame::new(kind, start));
    }

    fn close(&mut self, end: usize) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        Self::flush_text(&self.lines, &mut frame);
        if frame.kind.is_constructed() {
            self.depth -= 1;
        }

        let range = Some(SourceRange {
            start: frame.start,
            end,
            line: self.lines.line_of(frame.start),
        });
        let children = std::mem::take(&mut frame.children);

        let kind = match frame.kind {
            FrameKind::Passthrough | FrameKind::Clamped | FrameKind::Document => {
                self.top_mut().children.extend(children);
                return;
            }
            FrameKind::Header(level) => NodeKind::Header { level, children },
            FrameKind::Paragraph => NodeKind::Paragraph { children },
            FrameKind::CodeBlock { language } => NodeKind::CodeBlock {
                language,
                code: frame.raw,
            },
            FrameKind::HtmlBlock => NodeKind::Text { text: frame.raw },
            FrameKind::Image { source, title } => {
                let alt: String = children.iter().map(|c| c.plain_text()).collect();
                NodeKind::Image {
                    source: non_empty(source),
                    alt_text: non_empty(alt),
                    title: non_empty(title),
                }
            }
            FrameKind::Link { destination, title } => NodeKind::Link {
                destination: non_empty(destination),
                title: non_empty(title),
                children,
            },
            FrameKind::List { is_ordered } => NodeKind::List {
                is_ordered,
                children: wrap_list_items(children),
            },
            FrameKind::ListItem { checkbox } => NodeKind::ListItem {
                checkbox,
                children: wrap_inline_runs(children),
            },
            FrameKind::Table { alignments } => NodeKind::Table {
                alignments,
                children: table_sections(children),
            },
            FrameKind::TableHead => NodeKind::TableHead {
                children: head_rows(children),
            },
            FrameKind::TableRow => NodeKind::TableRow { children },
            FrameKind::TableCell => NodeKind::TableCell { children },
            FrameKind::Emphasis => NodeKind::Emphasis { children },
            FrameKind::Strong => NodeKind::Strong { children },
            FrameKind::Strikethrough => NodeKind::Strikethrough { children },
            FrameKind::BlockQuote => NodeKind::BlockQuote { children },
        };
        self.top_mut().children.push(Node::with_range(kind, range));
    }

    fn push_text(&mut self, text: &str, range: Range<usize>) {
        let top = self.top_mut();
        if top.kind.collects_raw_text() {
            top.raw.push_str(text);
            return;
        }
        let Some(escaped) = escaped_dollars(self.source, text, &range) else {
            self.append_pending(text, range);
            return;
        };

        // An escaped `$` becomes a Text node of its own so no math scan can
        // pair it with a neighbouring dollar.
        let mut rest = 0;
        for ((at, _), escaped) in text.match_indices('$').zip(escaped) {
            if !escaped {
                continue;
            }
            self.append_pending(&text[rest..at], range.clone());
            self.push_node(NodeKind::Text { text: "$".into() }, range.clone());
            rest = at + 1;
        }
        self.append_pending(&text[rest..], range);
    }

    fn append_pending(&mut self, text: &str, range: Range<usize>) {
        if text.is_empty() {
            return;
        }
        let top = self.top_mut();
        match &mut top.pending {
            Some((buffer, span)) => {
                buffer.push_str(text);
                span.end = range.end;
            }
            None => top.pending = Some((text.to_string(), range)),
        }
    }

    fn push_node(&mut self, kind: NodeKind, range: Range<usize>) {
        let source_range = Some(SourceRange {
            start: range.start,
            end: range.end,
            line: self.lines.line_of(range.start),
        });
        self.flush_top();
        self.top_mut()
            .children
            .push(Node::with_range(kind, source_range));
    }

    fn flush_top(&mut self) {
        let last = self.stack.len() - 1;
        Self::flush_text(&self.lines, &mut self.stack[last]);
    }

    fn flush_text(lines: &LineIndex, frame: &mut Frame) {
        if let Some((text, span)) = frame.pending.take() {
            let range = Some(SourceRange {
                start: span.start,
                end: span.end,
                line: lines.line_of(span.start),
            });
            frame
                .children
                .push(Node::with_range(NodeKind::Text { text }, range));
        }
    }

    fn mark_task(&mut self, checked: bool) {
        let state = if checked {
            CheckboxState::Checked
        } else {
            CheckboxState::Unchecked
        };
        if let Some(frame) = self
            .stack
            .iter_mut()
            .rev()
            .find(|f| matches!(f.kind, FrameKind::ListItem { .. }))
        {
            frame.kind = FrameKind::ListItem { checkbox: state };
        }
    }
}

fn table_alignment(alignment: Alignment) -> Option<TableAlignment> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some(TableAlignment::Left),
        Alignment::Center => Some(TableAlignment::Center),
        Alignment::Right => Some(TableAlignment::Right),
    }
}

/// For each `$` in `text`, whether the source spelled it `\$`. `None` when
/// nothing was escaped or the dollars cannot be lined up with the source.
fn escaped_dollars(source: &str, text: &str, range: &Range<usize>) -> Option<Vec<bool>> {
    let slice = source.get(range.clone())?;
    let bytes = source.as_bytes();
    let flags: Vec<bool> = slice
        .match_indices('$')
        .map(|(offset, _)| {
            let before = &bytes[..range.start + offset];
            before.iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
        })
        .collect();
    (flags.len() == text.matches('$').count() && flags.contains(&true)).then_some(flags)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn is_inline(node: &Node) -> bool {
    matches!(
        node.kind(),
        NodeKind::Text { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::Image { .. }
            | NodeKind::Link { .. }
            | NodeKind::Emphasis { .. }
            | NodeKind::Strong { .. }
            | NodeKind::Strikethrough { .. }
    )
}

/// Tight list items carry bare inline content; give it the paragraph
/// wrapper loose items have so every item reads the same downstream.
fn wrap_inline_runs(children: Vec<NodeRef>) -> Vec<NodeRef> {
    let mut out = Vec::with_capacity(children.len());
    let mut run: Vec<NodeRef> = vec![];
    for child in children {
        if is_inline(&child) {
            run.push(child);
        } else {
            if !run.is_empty() {
                out.push(Node::paragraph(std::mem::take(&mut run)));
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        out.push(Node::paragraph(run));
    }
    out
}

/// A list only ever holds items. Content spliced in by the clamp gets an
/// item of its own.
fn wrap_list_items(children: Vec<NodeRef>) -> Vec<NodeRef> {
    children
        .into_iter()
        .map(|child| match child.kind() {
            NodeKind::ListItem { .. } => child,
            _ => Node::new(NodeKind::ListItem {
                checkbox: CheckboxState::None,
                children: wrap_inline_runs(vec![child]),
            }),
        })
        .collect()
}

/// pulldown-cmark emits the head followed by bare rows; regroup the rows
/// into a body section.
fn table_sections(children: Vec<NodeRef>) -> Vec<NodeRef> {
    let mut sections = vec![];
    let mut rows = vec![];
    for child in children {
        match child.kind() {
            NodeKind::TableHead { .. } => sections.push(child),
            NodeKind::TableRow { .. } => rows.push(child),
            _ => {}
        }
    }
    if !rows.is_empty() {
        sections.push(Node::new(NodeKind::TableBody { children: rows }));
    }
    sections
}

/// Head cells arrive without a row; give them one.
fn head_rows(children: Vec<NodeRef>) -> Vec<NodeRef> {
    if children
        .iter()
        .all(|c| matches!(c.kind(), NodeKind::TableRow { .. }))
    {
        return children;
    }
    let cells = children
        .into_iter()
        .filter(|c| matches!(c.kind(), NodeKind::TableCell { .. }))
        .collect();
    vec![Node::new(NodeKind::TableRow { children: cells })]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let idx = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(6), 3);
        assert_eq!(idx.line_of(7), 4);
    }

    #[test]
    fn adjacent_text_events_merge() {
        let nodes = TreeBuilder::build(r"a \* b", 50);
        assert_eq!(nodes.len(), 1);
        let para = &nodes[0];
        assert_eq!(para.children().len(), 1);
        assert_eq!(para.children()[0].as_text(), Some("a * b"));
    }

    fn texts(node: &Node) -> Vec<String> {
        node.children()
            .iter()
            .map(|c| c.as_text().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn escaped_dollars_become_their_own_text_nodes() {
        let nodes = TreeBuilder::build(r"I paid \$5 and \$10 today", 50);
        assert_eq!(
            texts(&nodes[0]),
            vec!["I paid ", "$", "5 and ", "$", "10 today"]
        );
        assert_eq!(nodes[0].plain_text(), "I paid $5 and $10 today");
    }

    #[test]
    fn escaped_backslash_leaves_the_dollar_alone() {
        let nodes = TreeBuilder::build(r"cost \\$5 and $6", 50);
        assert_eq!(texts(&nodes[0]), vec![r"cost \$5 and $6"]);
    }

    #[test]
    fn dollars_in_code_blocks_are_raw() {
        let nodes = TreeBuilder::build("```\n\\$x\n```", 50);
        assert!(matches!(
            nodes[0].kind(),
            NodeKind::CodeBlock { code, .. } if code == "\\$x\n"
        ));
    }

    #[test]
    fn breaks_stay_separate_text_nodes() {
        let nodes = TreeBuilder::build("one\ntwo  \nthree", 50);
        let texts: Vec<_> = nodes[0]
            .children()
            .iter()
            .map(|c| c.as_text().unwrap_or_default().to_string())
            .collect();
        assert_eq!(texts, vec!["one", " ", "two", "\n", "three"]);
    }

    #[test]
    fn source_ranges_carry_lines() {
        let nodes = TreeBuilder::build("# Title\n\nBody", 50);
        assert_eq!(nodes[0].range().map(|r| r.line), Some(1));
        assert_eq!(nodes[1].range().map(|r| r.line), Some(3));
        assert_eq!(nodes[1].range().map(|r| r.start), Some(9));
    }

    #[test]
    fn clamp_splices_content_into_deepest_ancestor() {
        let nodes = TreeBuilder::build("> > > deep", 2);
        let outer = &nodes[0];
        assert!(matches!(outer.kind(), NodeKind::BlockQuote { .. }));
        let inner = &outer.children()[0];
        assert!(matches!(inner.kind(), NodeKind::BlockQuote { .. }));
        // third quote and its paragraph are beyond the clamp
        assert_eq!(inner.children().len(), 1);
        assert_eq!(inner.children()[0].as_text(), Some("deep"));
    }
}
