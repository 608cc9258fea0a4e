use async_trait::async_trait;

use super::styled::RasterImage;

/// Renders a LaTeX equation to an image.
///
/// Returns `None` for anything it cannot render; the solver then shows the
/// equation source instead.
#[async_trait]
pub trait MathRenderer: Send + Sync {
    async fn render(&self, latex: &str, display_mode: bool) -> Option<RasterImage>;
}

/// Renders nothing, so every equation falls back to its source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMathRenderer;

#[async_trait]
impl MathRenderer for NoMathRenderer {
    async fn render(&self, _latex: &str, _display_mode: bool) -> Option<RasterImage> {
        None
    }
}
