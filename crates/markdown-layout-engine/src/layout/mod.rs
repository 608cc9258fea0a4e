//! # Layout
//!
//! Styling and measurement of nodes at a container width.
//!
//! - **`solver`** / **`inline`**: node → [`StyledText`] → [`LayoutResult`]
//! - **`cache`**: bounded, thread-safe memo keyed by node id and width
//! - **`measure`**, **`highlight`**, **`math`**, **`diagram`**: collaborator
//!   traits with the built-in implementations
//! - **`theme`**, **`styled`**, **`color`**: the styling vocabulary

pub mod cache;
pub mod color;
pub mod diagram;
pub mod highlight;
mod inline;
pub mod math;
pub mod measure;
pub mod result;
pub mod sanitize;
pub mod solver;
pub mod styled;
mod table;
pub mod theme;

pub use cache::{CacheStats, DEFAULT_CACHE_CAPACITY, LayoutCache};
pub use color::{Color, ColorParseError};
pub use diagram::{DiagramAdapterRegistry, DiagramRenderingAdapter};
pub use highlight::{BasicHighlighter, SyntaxHighlighter};
pub use math::{MathRenderer, NoMathRenderer};
pub use measure::{MonospaceMeasurer, TextMeasurer};
pub use result::{LayoutResult, Rect, Size};
pub use sanitize::{sanitize_url, sanitize_url_with};
pub use solver::LayoutSolver;
pub use styled::{
    Attachment, Font, FontFamily, ParagraphStyle, RasterImage, RunContent, StyledRun, StyledText,
    TextStyle,
};
pub use theme::{ColorToken, Theme, TypographyToken};
