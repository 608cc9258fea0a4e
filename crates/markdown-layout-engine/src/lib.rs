pub mod layout;
pub mod nodes;
pub mod parsing;
pub mod plugins;
pub mod profiler;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use layout::{LayoutCache, LayoutResult, LayoutSolver, Size, StyledText, Theme};
pub use nodes::{Node, NodeId, NodeKind, NodeRef};
pub use parsing::{MarkdownParser, parse_document};
pub use plugins::{AstPlugin, default_plugins};
