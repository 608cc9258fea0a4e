//! Inline runs: the shared builder for everything that renders running
//! text (headers, paragraphs, list items, quotes, summaries).

use futures::future::BoxFuture;

use crate::nodes::{MathStyle, NodeKind, NodeRef};

use super::result::Rect;
use super::sanitize::sanitize_url;
use super::solver::LayoutSolver;
use super::styled::{Attachment, Font, StyledText, TextStyle};

impl LayoutSolver {
    /// Styles `children` on top of `base`. Formatting nodes refine the style
    /// of everything below them.
    pub fn inline_text<'a>(
        &'a self,
        children: &'a [NodeRef],
        base: TextStyle,
    ) -> BoxFuture<'a, StyledText> {
        Box::pin(async move {
            let theme = &*self.theme;
            let mut out = StyledText::new();
            for child in children {
                match child.kind() {
                    NodeKind::Text { text } => out.push_text(text.clone(), base.clone()),
                    NodeKind::InlineCode { code } => {
                        let style = TextStyle {
                            font: theme.code_block.font,
                            background: theme.code_color.background,
                            ..base.clone()
                        };
                        out.push_text(code.clone(), style);
                    }
                    NodeKind::Link {
                        destination,
                        children,
                        ..
                    } => {
                        let style = TextStyle {
                            foreground: theme.link_color,
                            underline: true,
                            link: destination.as_deref().and_then(sanitize_url),
                            ..base.clone()
                        };
                        out.append(self.inline_text(children, style).await);
                    }
                    NodeKind::Image {
                        source, alt_text, ..
                    } => {
                        let label = alt_text
                            .as_deref()
                            .or(source.as_deref())
                            .filter(|s| !s.is_empty())
                            .unwrap_or("image");
                        let style = TextStyle {
                            foreground: theme.muted_color,
                            ..base.clone()
                        };
                        out.push_text(format!("[{label}]"), style);
                    }
                    NodeKind::Math { style, equation } => {
                        out.append(self.inline_math(*style, equation, &base).await);
                    }
                    NodeKind::Emphasis { children } => {
                        let style = TextStyle {
                            font: base.font.italic(),
                            ..base.clone()
                        };
                        out.append(self.inline_text(children, style).await);
                    }
                    NodeKind::Strong { children } => {
                        let style = TextStyle {
                            font: base.font.bold(),
                            ..base.clone()
                        };
                        out.append(self.inline_text(children, style).await);
                    }
                    NodeKind::Strikethrough { children } => {
                        let style = TextStyle {
                            strikethrough: true,
                            ..base.clone()
                        };
                        out.append(self.inline_text(children, style).await);
                    }
                    _ => out.append(self.inline_text(child.children(), base.clone()).await),
                }
            }
            out
        })
    }

    async fn inline_math(&self, style: MathStyle, equation: &str, base: &TextStyle) -> StyledText {
        if let Some(text) = self.render_math(style, equation, base, base.font).await {
            return text;
        }
        let fallback = TextStyle {
            font: self.theme.code_block.font,
            foreground: self.theme.math_color,
            ..base.clone()
        };
        match style {
            MathStyle::Inline => StyledText::plain(equation, fallback),
            MathStyle::Block => StyledText::plain(format!("\n{equation}\n"), fallback),
        }
    }

    /// Renders an equation to an attachment, centred on `font`'s midline
    /// when inline. `None` when the renderer declines.
    pub(super) async fn render_math(
        &self,
        style: MathStyle,
        equation: &str,
        base: &TextStyle,
        font: Font,
    ) -> Option<StyledText> {
        let Some(image) = self.math.render(equation, style == MathStyle::Block).await else {
            log::debug!("math renderer declined {equation:?}, showing source");
            return None;
        };
        let bounds = attachment_bounds(&image.size, style, &font);
        let mut out = StyledText::new();
        out.push_attachment(Attachment { image, bounds }, base.clone());
        Some(out)
    }
}

fn attachment_bounds(size: &super::result::Size, style: MathStyle, font: &Font) -> Rect {
    match style {
        MathStyle::Block => Rect::new(0.0, 0.0, size.width, size.height),
        MathStyle::Inline => {
            let midline = (font.ascender() + font.descender()) / 2.0;
            Rect::new(0.0, midline - size.height / 2.0, size.width, size.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use pretty_assertions::assert_eq;

    #[test]
    fn inline_attachments_centre_on_the_midline() {
        let font = Font::proportional(20.0);
        // ascender 16, descender -4: midline 6.
        let bounds = attachment_bounds(&Size::new(30.0, 10.0), MathStyle::Inline, &font);
        assert_eq!(bounds, Rect::new(0.0, 1.0, 30.0, 10.0));
    }

    #[test]
    fn block_attachments_keep_natural_size() {
        let bounds =
            attachment_bounds(&Size::new(30.0, 10.0), MathStyle::Block, &Font::default());
        assert_eq!(bounds, Rect::new(0.0, 0.0, 30.0, 10.0));
    }
}
