//! Syntax colouring for fenced code.

use std::sync::LazyLock;

use regex::Regex;

use super::color::Color;
use super::styled::{StyledText, TextStyle};
use super::theme::Theme;

/// Colours code for display. Unknown or absent languages still get the
/// generic C-family treatment.
pub trait SyntaxHighlighter: Send + Sync {
    fn highlight(&self, code: &str, language: Option<&str>) -> StyledText;
}

/// Token colours.
pub mod palette {
    use super::Color;

    pub const KEYWORD: Color = Color::rgb(0xCC, 0x1A, 0x80);
    pub const STRING: Color = Color::rgb(0xE6, 0x4D, 0x4D);
    pub const TYPE: Color = Color::rgb(0x1A, 0x99, 0xB3);
    pub const CALL: Color = Color::rgb(0x33, 0x80, 0xE6);
    pub const NUMBER: Color = Color::rgb(0x99, 0x66, 0xE6);
    pub const COMMENT: Color = Color::rgb(0x80, 0x80, 0x80);
    pub const PREPROCESSING: Color = Color::rgb(0x99, 0x66, 0x1A);
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "def",
    "default", "defer", "do", "elif", "else", "enum", "export", "extension", "extern", "false",
    "fn", "for", "from", "func", "function", "go", "guard", "if", "impl", "import", "in",
    "interface", "let", "loop", "match", "mod", "mut", "new", "nil", "null", "package", "private",
    "protocol", "pub", "public", "return", "self", "Self", "static", "struct", "super", "switch",
    "this", "throw", "throws", "trait", "true", "try", "type", "typeof", "use", "var", "void",
    "where", "while", "yield",
];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          (?P<comment>//[^\n]*|/\*(?s:.*?)(?:\*/|\z))
        | (?P<string>"(?s:[^"\\]|\\.)*"|'(?:[^'\\\n]|\\.){0,8}')
        | (?P<number>\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?[A-Za-z0-9_]*)
        | (?P<ident>[\p{L}_][\p{L}\p{N}_]*)
        | (?P<hash>\#)
        "#,
    )
    .expect("valid token regex")
});

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z]+").expect("valid directive regex"));

/// What a `#` starts in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashRule {
    Comment,
    Directive,
    Plain,
}

impl HashRule {
    fn for_language(language: Option<&str>) -> Self {
        let Some(lang) = language.map(|l| l.trim().to_ascii_lowercase()) else {
            return HashRule::Plain;
        };
        match lang.as_str() {
            "python" | "py" | "ruby" | "rb" | "sh" | "bash" | "zsh" | "shell" | "yaml" | "yml"
            | "toml" | "perl" | "r" | "makefile" | "dockerfile" | "elixir" | "powershell" => {
                HashRule::Comment
            }
            "c" | "h" | "cpp" | "c++" | "cc" | "hpp" | "objc" | "objective-c" | "cs" | "csharp"
            | "swift" => HashRule::Directive,
            _ => HashRule::Plain,
        }
    }
}

/// Regex lexer with a fixed palette over the theme's code style.
#[derive(Debug, Clone)]
pub struct BasicHighlighter {
    base: TextStyle,
}

impl BasicHighlighter {
    pub fn new(theme: &Theme) -> Self {
        let mut base = theme.code_style();
        // Code lines pack tightly; the block itself carries the spacing.
        base.paragraph.paragraph_spacing = 0.0;
        Self { base }
    }

    fn colored(&self, color: Color) -> TextStyle {
        TextStyle {
            foreground: color,
            ..self.base.clone()
        }
    }
}

impl Default for BasicHighlighter {
    fn default() -> Self {
        Self::new(&Theme::default())
    }
}

impl SyntaxHighlighter for BasicHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> StyledText {
        let hash_rule = HashRule::for_language(language);
        let mut out = StyledText::new();
        let mut pos = 0;

        while let Some(caps) = TOKEN.captures_at(code, pos) {
            let Some(whole) = caps.get(0) else { break };
            out.push_text(&code[pos..whole.start()], self.base.clone());
            let mut end = whole.end();

            let color = if caps.name("comment").is_some() {
                Some(palette::COMMENT)
            } else if caps.name("string").is_some() {
                Some(palette::STRING)
            } else if caps.name("number").is_some() {
                Some(palette::NUMBER)
            } else if let Some(ident) = caps.name("ident") {
                classify_ident(code, ident.start(), ident.as_str(), end)
            } else {
                match hash_rule {
                    HashRule::Comment => {
                        end = code[end..].find('\n').map_or(code.len(), |i| end + i);
                        Some(palette::COMMENT)
                    }
                    HashRule::Directive => {
                        if let Some(m) = DIRECTIVE.find(&code[end..]) {
                            end += m.end();
                        }
                        Some(palette::PREPROCESSING)
                    }
                    HashRule::Plain => None,
                }
            };

            let style = color.map_or_else(|| self.base.clone(), |c| self.colored(c));
            out.push_text(&code[whole.start()..end], style);
            pos = end;
        }
        out.push_text(&code[pos..], self.base.clone());
        out
    }
}

fn classify_ident(code: &str, start: usize, ident: &str, end: usize) -> Option<Color> {
    if KEYWORDS.contains(&ident) {
        return Some(palette::KEYWORD);
    }
    let called = code[end..].trim_start_matches([' ', '\t']).starts_with('(');
    let dotted = code[..start].ends_with('.');
    if called || dotted {
        Some(palette::CALL)
    } else if ident.starts_with(|c: char| c.is_uppercase()) {
        Some(palette::TYPE)
    } else {
        None
    }
}
