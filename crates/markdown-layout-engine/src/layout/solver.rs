//! # Layout solver
//!
//! Turns a node into [`StyledText`] with the theme, measures it at a width,
//! and memoizes the result in a [`LayoutCache`]. Documents additionally
//! solve each top-level block in source order so a host can size blocks
//! independently.
//!
//! Solving never fails: equations and diagrams that cannot be rendered
//! degrade to their source text, and kinds with nothing to show at block
//! level produce empty text.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::nodes::{CheckboxState, MathStyle, Node, NodeKind, NodeRef};
use crate::profiler::{self, Metric};

use super::cache::LayoutCache;
use super::diagram::DiagramAdapterRegistry;
use super::highlight::{BasicHighlighter, SyntaxHighlighter};
use super::math::{MathRenderer, NoMathRenderer};
use super::measure::{MonospaceMeasurer, TextMeasurer};
use super::result::LayoutResult;
use super::styled::{StyledText, TextStyle};
use super::table::layout_table;
use super::theme::Theme;

pub const QUOTE_BAR: &str = "┃ ";
pub const RULE_GLYPH: char = '─';
pub const RULE_LENGTH: usize = 40;
pub const DETAILS_OPEN_GLYPH: &str = "▼ ";
pub const DETAILS_CLOSED_GLYPH: &str = "▶ ";
pub const DETAILS_PLACEHOLDER: &str = "Details";

#[derive(Clone)]
pub struct LayoutSolver {
    pub(super) theme: Arc<Theme>,
    cache: Arc<LayoutCache>,
    measurer: Arc<dyn TextMeasurer>,
    highlighter: Arc<dyn SyntaxHighlighter>,
    pub(super) math: Arc<dyn MathRenderer>,
    diagrams: Arc<DiagramAdapterRegistry>,
}

impl LayoutSolver {
    /// A solver with its own cache and the built-in collaborators.
    pub fn new(theme: Theme) -> Self {
        Self {
            highlighter: Arc::new(BasicHighlighter::new(&theme)),
            theme: Arc::new(theme),
            cache: Arc::new(LayoutCache::default()),
            measurer: Arc::new(MonospaceMeasurer),
            math: Arc::new(NoMathRenderer),
            diagrams: Arc::new(DiagramAdapterRegistry::new()),
        }
    }

    pub fn with_cache(mut self, cache: Arc<LayoutCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn SyntaxHighlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    pub fn with_math_renderer(mut self, renderer: Arc<dyn MathRenderer>) -> Self {
        self.math = renderer;
        self
    }

    pub fn with_diagram_registry(mut self, registry: DiagramAdapterRegistry) -> Self {
        self.diagrams = Arc::new(registry);
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn cache(&self) -> &Arc<LayoutCache> {
        &self.cache
    }

    /// Lays `node` out at `max_width`, reusing a cached result for the same
    /// node and width.
    ///
    /// The result is only cached once complete, so dropping the future
    /// part-way leaves the cache untouched.
    pub async fn solve(&self, node: &NodeRef, max_width: f64) -> Arc<LayoutResult> {
        if matches!(node.kind(), NodeKind::Document { .. }) {
            profiler::measure_async(Metric::LayoutCalculation, self.solve_node(node, max_width))
                .await
        } else {
            self.solve_node(node, max_width).await
        }
    }

    fn solve_node<'a>(
        &'a self,
        node: &'a NodeRef,
        max_width: f64,
    ) -> BoxFuture<'a, Arc<LayoutResult>> {
        Box::pin(async move {
            tokio::task::yield_now().await;

            if let Some(hit) = self.cache.get(node.id(), max_width) {
                return hit;
            }

            let styled_text = self.styled_text(node).await;
            let size = self.measurer.measure(&styled_text, max_width);

            let mut children = Vec::new();
            if let NodeKind::Document { children: blocks } = node.kind() {
                for block in blocks {
                    children.push(self.solve_node(block, max_width).await);
                }
            }

            let result = Arc::new(LayoutResult {
                node: node.clone(),
                size,
                styled_text,
                children,
            });
            self.cache.set(result.clone(), max_width);
            result
        })
    }

    /// Block-level styled text for one node.
    pub fn styled_text<'a>(&'a self, node: &'a Node) -> BoxFuture<'a, StyledText> {
        Box::pin(async move {
            let theme = &*self.theme;
            match node.kind() {
                NodeKind::Header { level, children } => {
                    self.inline_text(children, theme.style(theme.header(*level)))
                        .await
                }
                NodeKind::Paragraph { children } => {
                    self.inline_text(children, theme.paragraph_style()).await
                }
                NodeKind::Text { text } => StyledText::plain(text.clone(), theme.paragraph_style()),
                NodeKind::Summary { children } => {
                    self.inline_text(children, self.summary_style()).await
                }
                NodeKind::CodeBlock { language, code } => {
                    self.code_block(language.as_deref(), code)
                }
                NodeKind::Math { style, equation } => self.block_math(*style, equation).await,
                NodeKind::List { .. } => self.list_text(node, 0.0).await,
                NodeKind::BlockQuote { children } => self.quote_text(children).await,
                NodeKind::ThematicBreak => StyledText::plain(
                    RULE_GLYPH.to_string().repeat(RULE_LENGTH),
                    TextStyle {
                        foreground: theme.rule_color,
                        ..theme.paragraph_style()
                    },
                ),
                NodeKind::Table { .. } => layout_table(node, theme),
                NodeKind::Diagram { language, source } => {
                    if let Some(adapter) = self.diagrams.adapter(*language)
                        && let Some(rendered) = adapter.render(source, *language).await
                    {
                        return rendered;
                    }
                    log::debug!("no diagram output for {language}, showing source");
                    self.code_block(Some(language.as_str()), source)
                }
                NodeKind::Details {
                    is_open,
                    summary,
                    children,
                } => self.details_text(*is_open, summary.as_ref(), children).await,
                // Containers laid out by their parents, the document itself
                // (its blocks become child results), and inline-only kinds.
                NodeKind::Document { .. }
                | NodeKind::ListItem { .. }
                | NodeKind::TableHead { .. }
                | NodeKind::TableBody { .. }
                | NodeKind::TableRow { .. }
                | NodeKind::TableCell { .. }
                | NodeKind::InlineCode { .. }
                | NodeKind::Image { .. }
                | NodeKind::Link { .. }
                | NodeKind::Emphasis { .. }
                | NodeKind::Strong { .. }
                | NodeKind::Strikethrough { .. } => StyledText::new(),
            }
        })
    }

    pub(super) fn summary_style(&self) -> TextStyle {
        let mut style = self.theme.paragraph_style();
        style.font = style.font.bold();
        style
    }

    fn code_block(&self, language: Option<&str>, code: &str) -> StyledText {
        let mut out = StyledText::new();
        if let Some(label) = language.map(str::trim).filter(|l| !l.is_empty()) {
            out.push_text(
                format!("{}\n", label.to_uppercase()),
                self.theme.code_label_style(),
            );
        }
        out.append(self.highlighter.highlight(code, language));
        out
    }

    async fn block_math(&self, style: MathStyle, equation: &str) -> StyledText {
        let font = self.theme.paragraph.font;
        let base = self.theme.paragraph_style();
        if let Some(text) = self.render_math(style, equation, &base, font).await {
            return text;
        }
        StyledText::plain(equation, self.theme.style(&self.theme.code_block))
    }

    fn list_style(&self, indent: f64) -> TextStyle {
        let mut style = self.theme.paragraph_style();
        style.paragraph.paragraph_spacing = self.theme.list_spacing;
        style.paragraph.head_indent = indent;
        style
    }

    /// Nested lists render `list_indent` further in than their parent.
    fn list_text<'a>(&'a self, list: &'a Node, indent: f64) -> BoxFuture<'a, StyledText> {
        Box::pin(async move {
            let is_ordered = matches!(list.kind(), NodeKind::List { is_ordered: true, .. });
            let style = self.list_style(indent);
            let mut out = StyledText::new();

            for (index, item) in list.children().iter().enumerate() {
                let NodeKind::ListItem { checkbox, children } = item.kind() else {
                    continue;
                };
                if !out.is_empty() {
                    out.push_text("\n", style.clone());
                }
                let prefix = match checkbox {
                    CheckboxState::Checked => "☑ ".to_string(),
                    CheckboxState::Unchecked => "☐ ".to_string(),
                    CheckboxState::None if is_ordered => format!("{}. ", index + 1),
                    CheckboxState::None => "• ".to_string(),
                };
                out.push_text(prefix, style.clone());

                let mut wrote_block = false;
                for child in children {
                    match child.kind() {
                        NodeKind::List { .. } => {
                            out.push_text("\n", style.clone());
                            let nested = indent + self.theme.list_indent;
                            out.append(self.list_text(child, nested).await);
                        }
                        NodeKind::Paragraph { children } => {
                            if wrote_block {
                                out.push_text("\n", style.clone());
                            }
                            out.append(self.inline_text(children, style.clone()).await);
                            wrote_block = true;
                        }
                        _ => {
                            if wrote_block {
                                out.push_text("\n", style.clone());
                            }
                            out.append(self.styled_text(child).await);
                            wrote_block = true;
                        }
                    }
                }
            }
            out
        })
    }

    async fn quote_text(&self, children: &[NodeRef]) -> StyledText {
        let theme = &*self.theme;
        let mut quote = theme.paragraph_style();
        quote.paragraph.head_indent = theme.quote_indent;
        quote.foreground = theme.quote_text_color;
        let bar = TextStyle {
            foreground: theme.quote_bar_color,
            ..quote.clone()
        };

        let mut out = StyledText::new();
        for child in children {
            let piece = match child.kind() {
                NodeKind::Paragraph { children } => {
                    let mut piece = StyledText::plain(QUOTE_BAR, bar.clone());
                    piece.append(self.inline_text(children, quote.clone()).await);
                    piece
                }
                _ => self.styled_text(child).await,
            };
            if piece.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push_text("\n", quote.clone());
            }
            out.append(piece);
        }
        out
    }

    async fn details_text(
        &self,
        is_open: bool,
        summary: Option<&NodeRef>,
        body: &[NodeRef],
    ) -> StyledText {
        let style = self.summary_style();
        let glyph = if is_open {
            DETAILS_OPEN_GLYPH
        } else {
            DETAILS_CLOSED_GLYPH
        };
        let mut out = StyledText::plain(glyph, style.clone());

        match summary.map(|s| s.children()).filter(|c| !c.is_empty()) {
            Some(children) => out.append(self.inline_text(children, style.clone()).await),
            None => out.push_text(DETAILS_PLACEHOLDER, style.clone()),
        }
        if !is_open {
            return out;
        }

        for child in body {
            let piece = self.styled_text(child).await;
            if piece.is_empty() {
                continue;
            }
            out.push_text("\n", self.theme.paragraph_style());
            out.append(piece);
        }
        out
    }
}

impl Default for LayoutSolver {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl std::fmt::Debug for LayoutSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutSolver")
            .field("cache", &self.cache)
            .field("diagrams", &self.diagrams)
            .finish_non_exhaustive()
    }
}
