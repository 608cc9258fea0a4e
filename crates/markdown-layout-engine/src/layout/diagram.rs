use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::nodes::DiagramLanguage;

use super::styled::StyledText;

/// Host-supplied renderer for one diagram language.
///
/// Returning `None` makes the solver lay the diagram out as a code block.
#[async_trait]
pub trait DiagramRenderingAdapter: Send + Sync {
    async fn render(&self, source: &str, language: DiagramLanguage) -> Option<StyledText>;
}

/// Adapters by language. Configure before solving; the solver only reads it.
#[derive(Clone, Default)]
pub struct DiagramAdapterRegistry {
    adapters: HashMap<DiagramLanguage, Arc<dyn DiagramRenderingAdapter>>,
}

impl DiagramAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapters(
        adapters: impl IntoIterator<Item = (DiagramLanguage, Arc<dyn DiagramRenderingAdapter>)>,
    ) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
        }
    }

    /// Registers `adapter` for `language`, replacing any previous one.
    pub fn register(
        &mut self,
        language: DiagramLanguage,
        adapter: Arc<dyn DiagramRenderingAdapter>,
    ) {
        self.adapters.insert(language, adapter);
    }

    pub fn adapter(&self, language: DiagramLanguage) -> Option<&Arc<dyn DiagramRenderingAdapter>> {
        self.adapters.get(&language)
    }

    pub fn languages(&self) -> impl Iterator<Item = DiagramLanguage> + '_ {
        self.adapters.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for DiagramAdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut languages: Vec<_> = self.languages().map(|l| l.as_str()).collect();
        languages.sort_unstable();
        f.debug_struct("DiagramAdapterRegistry")
            .field("languages", &languages)
            .finish()
    }
}
