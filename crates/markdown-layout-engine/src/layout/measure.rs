//! Width-constrained measurement of styled text.
//!
//! [`MonospaceMeasurer`] is a platform-free stand-in for a real text system:
//! every grapheme advances by a fixed fraction of its font size times its
//! terminal cell width, lines wrap greedily at whitespace and fall back to
//! grapheme breaks for words wider than the line.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::result::Size;
use super::styled::{RunContent, StyledText, TextStyle};

/// Measures styled text against a maximum width.
///
/// Implementations must be deterministic, return [`Size::ZERO`] for empty
/// text, round up to whole points and never report a width above a finite
/// `max_width`.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &StyledText, max_width: f64) -> Size;
}

/// Horizontal advance of one cell, in ems.
pub const ADVANCE_EM: f64 = 0.6;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasurer;

impl MonospaceMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Advance of `grapheme` in `style`'s font.
    pub fn advance(grapheme: &str, style: &TextStyle) -> f64 {
        grapheme.width() as f64 * style.font.size * ADVANCE_EM
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &StyledText, max_width: f64) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let limit = if max_width.is_finite() {
            max_width.max(0.0)
        } else {
            f64::INFINITY
        };

        let mut lines = LineBreaker::new(limit);
        for run in text.runs() {
            match &run.content {
                RunContent::Text(s) => {
                    for g in s.graphemes(true) {
                        if g == "\n" || g == "\r\n" {
                            lines.paragraph_break(&run.style);
                        } else if g.chars().all(char::is_whitespace) {
                            lines.space(Self::advance(g, &run.style), &run.style);
                        } else {
                            lines.glyph(
                                Self::advance(g, &run.style),
                                line_height(&run.style),
                                &run.style,
                            );
                        }
                    }
                }
                RunContent::Attachment(a) => {
                    lines.glyph(
                        a.bounds.width,
                        a.bounds.height.max(line_height(&run.style)),
                        &run.style,
                    );
                }
            }
        }
        let (width, height) = lines.finish();
        Size::new(round_up(width).min(limit), round_up(height))
    }
}

fn line_height(style: &TextStyle) -> f64 {
    style.font.size * style.paragraph.line_height_multiple
}

// Summed advances carry float noise; don't let it cost a whole point.
fn round_up(v: f64) -> f64 {
    (v - EPSILON).ceil().max(0.0)
}

#[derive(Debug, Clone, Copy)]
struct Paragraph {
    indent: f64,
    spacing: f64,
    empty_line_height: f64,
}

#[derive(Debug, Default)]
struct Line {
    width: f64,
    trailing: f64,
    height: f64,
    glyphs: usize,
}

/// Greedy line breaker over a stream of glyphs, spaces and paragraph breaks.
struct LineBreaker {
    limit: f64,
    widest: f64,
    height: f64,
    paragraph: Option<Paragraph>,
    line: Line,
    word: Vec<(f64, f64)>,
    word_width: f64,
}

impl LineBreaker {
    fn new(limit: f64) -> Self {
        Self {
            limit,
            widest: 0.0,
            height: 0.0,
            paragraph: None,
            line: Line::default(),
            word: Vec::new(),
            word_width: 0.0,
        }
    }

    fn begin_paragraph(&mut self, style: &TextStyle) -> Paragraph {
        *self.paragraph.get_or_insert_with(|| Paragraph {
            indent: style.paragraph.head_indent.max(0.0),
            spacing: style.paragraph.paragraph_spacing.max(0.0),
            empty_line_height: line_height(style),
        })
    }

    fn available(&self, paragraph: &Paragraph) -> f64 {
        self.limit - paragraph.indent
    }

    fn glyph(&mut self, width: f64, height: f64, style: &TextStyle) {
        self.begin_paragraph(style);
        self.word.push((width, height));
        self.word_width += width;
    }

    fn space(&mut self, width: f64, style: &TextStyle) {
        let paragraph = self.begin_paragraph(style);
        self.flush_word();
        if self.line.width + width <= self.available(&paragraph) + EPSILON {
            self.line.width += width;
            self.line.trailing += width;
        } else {
            self.end_line();
        }
    }

    fn paragraph_break(&mut self, style: &TextStyle) {
        let paragraph = self.begin_paragraph(style);
        self.flush_word();
        self.end_line();
        self.height += paragraph.spacing;
        self.paragraph = None;
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let Some(paragraph) = self.paragraph else {
            return;
        };
        let available = self.available(&paragraph);
        let word = std::mem::take(&mut self.word);
        let word_width = std::mem::replace(&mut self.word_width, 0.0);

        if self.line.width + word_width > available + EPSILON && self.line.glyphs > 0 {
            self.end_line();
        }
        if self.line.width + word_width <= available + EPSILON {
            for (w, h) in word {
                self.place(w, h);
            }
            return;
        }
        // Wider than a whole line: break between graphemes.
        for (w, h) in word {
            if self.line.glyphs > 0 && self.line.width + w > available + EPSILON {
                self.end_line();
            }
            self.place(w, h);
        }
    }

    fn place(&mut self, width: f64, height: f64) {
        self.line.width += width;
        self.line.trailing = 0.0;
        self.line.height = self.line.height.max(height);
        self.line.glyphs += 1;
    }

    fn end_line(&mut self) {
        let Some(paragraph) = self.paragraph else {
            return;
        };
        let line = std::mem::take(&mut self.line);
        let visible = line.width - line.trailing;
        if line.glyphs > 0 {
            self.widest = self.widest.max(visible + paragraph.indent);
        }
        self.height += if line.height > 0.0 {
            line.height
        } else {
            paragraph.empty_line_height
        };
    }

    fn finish(mut self) -> (f64, f64) {
        if self.paragraph.is_some() {
            self.flush_word();
            self.end_line();
        }
        (self.widest, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Font, ParagraphStyle};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    // 10pt with unit line height: one cell is 6pt wide, one line 10pt tall.
    fn style() -> TextStyle {
        TextStyle {
            font: Font::proportional(10.0),
            paragraph: ParagraphStyle {
                line_height_multiple: 1.0,
                paragraph_spacing: 0.0,
                head_indent: 0.0,
            },
            ..TextStyle::default()
        }
    }

    fn measure(text: &str, width: f64) -> Size {
        MonospaceMeasurer.measure(&StyledText::plain(text, style()), width)
    }

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(MonospaceMeasurer.measure(&StyledText::new(), 100.0), Size::ZERO);
    }

    #[test]
    fn single_line() {
        assert_eq!(measure("hello", 1000.0), Size::new(30.0, 10.0));
    }

    #[test]
    fn default_style_rounds_up() {
        let text = StyledText::plain("hello", TextStyle::default());
        assert_eq!(MonospaceMeasurer.measure(&text, 1000.0), Size::new(48.0, 20.0));
    }

    #[rstest]
    #[case("aaa bbb ccc", 41.0, 3)]
    #[case("aaa bbb ccc", 48.0, 2)]
    #[case("aaa bbb ccc", 66.0, 1)]
    #[case("aaaaaaaaaa", 30.0, 2)]
    #[case("aaaaaaaaaa", 12.0, 5)]
    fn wraps_to_line_count(#[case] text: &str, #[case] width: f64, #[case] lines: usize) {
        let size = measure(text, width);
        assert_eq!(size.height, 10.0 * lines as f64);
        assert!(size.width <= width);
    }

    #[test]
    fn never_exceeds_max_width() {
        for width in [0.0, 1.0, 5.0, 7.5, 13.0] {
            assert!(measure("wide words everywhere", width).width <= width);
        }
    }

    #[test]
    fn narrower_is_never_shorter() {
        let text = "x".repeat(200);
        let mut last = 0.0;
        for width in [400.0, 300.0, 120.0, 60.0, 10.0] {
            let height = measure(&text, width).height;
            assert!(height >= last);
            last = height;
        }
    }

    #[test]
    fn infinite_width_is_unbounded() {
        assert_eq!(measure(&"a".repeat(100), f64::INFINITY).width, 600.0);
    }

    #[test]
    fn paragraph_breaks_add_lines_and_spacing() {
        let spaced = TextStyle {
            paragraph: ParagraphStyle {
                paragraph_spacing: 4.0,
                ..style().paragraph
            },
            ..style()
        };
        let text = StyledText::plain("a\n\nb", spaced);
        assert_eq!(MonospaceMeasurer.measure(&text, 100.0), Size::new(6.0, 38.0));
    }

    #[test]
    fn wide_graphemes_take_two_cells() {
        assert_eq!(measure("漢字", 1000.0).width, 24.0);
    }

    #[test]
    fn head_indent_narrows_lines() {
        let indented = TextStyle {
            paragraph: ParagraphStyle {
                head_indent: 12.0,
                ..style().paragraph
            },
            ..style()
        };
        let text = StyledText::plain("aaa bbb", indented);
        assert_eq!(MonospaceMeasurer.measure(&text, 42.0), Size::new(30.0, 20.0));
    }
}
