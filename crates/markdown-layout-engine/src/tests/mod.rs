use std::sync::Arc;

use crate::layout::{LayoutCache, LayoutSolver, Theme};
use crate::nodes::NodeRef;
use crate::parsing::parse_document;
use crate::plugins::default_plugins;


/// Routes `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parses `markdown` with the default plugin order.
pub fn parse(markdown: &str) -> NodeRef {
    parse_document(markdown, &default_plugins())
}

/// A default-theme solver with a private cache.
pub fn solver() -> LayoutSolver {
    LayoutSolver::new(Theme::default()).with_cache(Arc::new(LayoutCache::default()))
}
