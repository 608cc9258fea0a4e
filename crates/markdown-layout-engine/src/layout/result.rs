use std::sync::Arc;

use crate::nodes::NodeRef;

use super::styled::StyledText;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A node measured at one container width.
///
/// Only document results have `children`; every other kind folds its
/// descendants into `styled_text`.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub node: NodeRef,
    pub size: Size,
    pub styled_text: StyledText,
    pub children: Vec<Arc<LayoutResult>>,
}

impl LayoutResult {
    /// Total height of the child results, or this result's own height for
    /// leaves.
    pub fn content_height(&self) -> f64 {
        if self.children.is_empty() {
            self.size.height
        } else {
            self.children.iter().map(|c| c.size.height).sum()
        }
    }
}
