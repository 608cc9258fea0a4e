//! Attributed text: runs of text (or inline images) carrying a [`TextStyle`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::result::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Proportional,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    pub family: FontFamily,
    /// Point size.
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self::proportional(16.0)
    }
}

impl Font {
    pub fn proportional(size: f64) -> Self {
        Self {
            family: FontFamily::Proportional,
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn monospace(size: f64) -> Self {
        Self {
            family: FontFamily::Monospace,
            ..Self::proportional(size)
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    /// Distance from baseline to the top of tall glyphs.
    pub fn ascender(&self) -> f64 {
        self.size * 0.8
    }

    /// Distance from baseline to the bottom of descenders; negative.
    pub fn descender(&self) -> f64 {
        -self.size * 0.2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub line_height_multiple: f64,
    /// Extra space after each paragraph break.
    pub paragraph_spacing: f64,
    /// Indent applied to every line of the paragraph.
    pub head_indent: f64,
}

impl Default for ParagraphStyle {
    fn default() -> Self {
        Self {
            line_height_multiple: 1.2,
            paragraph_spacing: 16.0,
            head_indent: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub foreground: Color,
    pub background: Option<Color>,
    pub underline: bool,
    pub strikethrough: bool,
    /// Destination of a link run, already sanitized.
    pub link: Option<String>,
    pub paragraph: ParagraphStyle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: Font::default(),
            foreground: Color::rgb(0, 0, 0),
            background: None,
            underline: false,
            strikethrough: false,
            link: None,
            paragraph: ParagraphStyle::default(),
        }
    }
}

/// Encoded image bytes with their natural size in points.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub size: Size,
    pub data: Arc<[u8]>,
}

/// An image placed inline; `bounds` is relative to the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub image: RasterImage,
    pub bounds: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    Attachment(Attachment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub content: RunContent,
    pub style: TextStyle,
}

/// Placeholder character standing in for an attachment in plain text.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledText {
    runs: Vec<StyledRun>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>, style: TextStyle) -> Self {
        let mut out = Self::new();
        out.push_text(text, style);
        out
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Appends text, merging into the last run when the styles match.
    /// Empty text is ignored.
    pub fn push_text(&mut self, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(StyledRun {
            content: RunContent::Text(last),
            style: last_style,
        }) = self.runs.last_mut()
            && *last_style == style
        {
            last.push_str(&text);
            return;
        }
        self.runs.push(StyledRun {
            content: RunContent::Text(text),
            style,
        });
    }

    pub fn push_attachment(&mut self, attachment: Attachment, style: TextStyle) {
        self.runs.push(StyledRun {
            content: RunContent::Attachment(attachment),
            style,
        });
    }

    pub fn append(&mut self, other: StyledText) {
        for run in other.runs {
            match run.content {
                RunContent::Text(text) => self.push_text(text, run.style),
                RunContent::Attachment(a) => self.push_attachment(a, run.style),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Length in chars, attachments counting as one.
    pub fn len(&self) -> usize {
        self.runs
            .iter()
            .map(|run| match &run.content {
                RunContent::Text(t) => t.chars().count(),
                RunContent::Attachment(_) => 1,
            })
            .sum()
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            match &run.content {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Attachment(_) => out.push(OBJECT_REPLACEMENT),
            }
        }
        out
    }

    /// Rewrites the style of every run.
    pub fn map_styles(mut self, mut f: impl FnMut(&mut TextStyle)) -> Self {
        for run in &mut self.runs {
            f(&mut run.style);
        }
        self
    }

    /// Number of attachment runs.
    pub fn attachment_count(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r.content, RunContent::Attachment(_)))
            .count()
    }
}
