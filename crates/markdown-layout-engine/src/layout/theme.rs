//! Typographic and colour tokens the solver styles nodes with.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::styled::{Font, ParagraphStyle, TextStyle};

/// Font plus paragraph metrics for one kind of block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyToken {
    pub font: Font,
    pub line_height_multiple: f64,
    pub paragraph_spacing: f64,
}

impl TypographyToken {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            ..Self::default()
        }
    }

    pub fn paragraph_style(&self) -> ParagraphStyle {
        ParagraphStyle {
            line_height_multiple: self.line_height_multiple,
            paragraph_spacing: self.paragraph_spacing,
            head_indent: 0.0,
        }
    }
}

impl Default for TypographyToken {
    fn default() -> Self {
        Self {
            font: Font::default(),
            line_height_multiple: 1.2,
            paragraph_spacing: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorToken {
    pub foreground: Color,
    pub background: Option<Color>,
}

impl Default for ColorToken {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(0x1F, 0x23, 0x28),
            background: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub header1: TypographyToken,
    pub header2: TypographyToken,
    pub header3: TypographyToken,
    pub paragraph: TypographyToken,
    pub code_block: TypographyToken,
    /// Uppercased language line above fenced code.
    pub code_label: TypographyToken,

    pub text_color: ColorToken,
    pub code_color: ColorToken,
    pub table_color: ColorToken,
    pub link_color: Color,
    pub quote_bar_color: Color,
    pub quote_text_color: Color,
    pub muted_color: Color,
    pub math_color: Color,
    /// Thematic break line.
    pub rule_color: Color,

    pub list_spacing: f64,
    pub list_indent: f64,
    pub quote_indent: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header1: TypographyToken::new(Font::proportional(32.0).bold()),
            header2: TypographyToken::new(Font::proportional(24.0).bold()),
            header3: TypographyToken::new(Font::proportional(20.0).bold()),
            paragraph: TypographyToken::new(Font::proportional(16.0)),
            code_block: TypographyToken::new(Font::monospace(14.0)),
            code_label: TypographyToken {
                font: Font::monospace(11.0).bold(),
                line_height_multiple: 1.0,
                paragraph_spacing: 6.0,
            },
            text_color: ColorToken::default(),
            code_color: ColorToken {
                background: Some(Color::rgb(0xF6, 0xF8, 0xFA)),
                ..ColorToken::default()
            },
            table_color: ColorToken {
                foreground: Color::rgb(0xD0, 0xD7, 0xDE),
                background: Some(Color::rgb(0xF6, 0xF8, 0xFA)),
            },
            link_color: Color::rgb(0x09, 0x69, 0xDA),
            quote_bar_color: Color::rgb(0x09, 0x69, 0xDA),
            quote_text_color: Color::rgb(0x80, 0x80, 0x80),
            muted_color: Color::rgb(0x59, 0x63, 0x6E),
            math_color: Color::rgb(0x82, 0x50, 0xDF),
            rule_color: Color::rgb(0x80, 0x80, 0x80),
            list_spacing: 4.0,
            list_indent: 20.0,
            quote_indent: 16.0,
        }
    }
}

impl Theme {
    /// Levels past three share the level-three token.
    pub fn header(&self, level: u8) -> &TypographyToken {
        match level {
            0 | 1 => &self.header1,
            2 => &self.header2,
            _ => &self.header3,
        }
    }

    /// Body-coloured style for a typography token.
    pub fn style(&self, token: &TypographyToken) -> TextStyle {
        TextStyle {
            font: token.font,
            foreground: self.text_color.foreground,
            background: self.text_color.background,
            paragraph: token.paragraph_style(),
            ..TextStyle::default()
        }
    }

    pub fn paragraph_style(&self) -> TextStyle {
        self.style(&self.paragraph)
    }

    /// Monospace style with the code tint, as used for code spans.
    pub fn code_style(&self) -> TextStyle {
        TextStyle {
            foreground: self.code_color.foreground,
            background: self.code_color.background,
            ..self.style(&self.code_block)
        }
    }

    pub fn code_label_style(&self) -> TextStyle {
        TextStyle {
            foreground: self.muted_color,
            ..self.style(&self.code_label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1, 32.0)]
    #[case(2, 24.0)]
    #[case(3, 20.0)]
    #[case(4, 20.0)]
    #[case(6, 20.0)]
    fn header_sizes(#[case] level: u8, #[case] size: f64) {
        assert_eq!(Theme::default().header(level).font.size, size);
    }

    #[test]
    fn code_style_is_tinted_monospace() {
        let theme = Theme::default();
        let style = theme.code_style();
        assert_eq!(style.font.family, crate::layout::FontFamily::Monospace);
        assert_eq!(style.background, Some(Color::rgb(0xF6, 0xF8, 0xFA)));
    }
}
