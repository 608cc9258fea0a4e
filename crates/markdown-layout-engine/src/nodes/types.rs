use std::{fmt, str::FromStr};

use uuid::Uuid;

/// Process-unique identity of a [`Node`](super::Node).
///
/// Assigned once at construction and never derived from content, so two
/// structurally identical nodes still compare unequal. Layout caching and UI
/// diffing both key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Byte span (and starting line) of the markup a node was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line of `start`.
    pub line: usize,
}

impl SourceRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// GFM task-list state of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckboxState {
    Checked,
    Unchecked,
    #[default]
    None,
}

/// Whether a math node is set as its own block or inside running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathStyle {
    Block,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAlignment {
    Left,
    Center,
    Right,
}

/// Fence languages that are lifted into diagram nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramLanguage {
    Mermaid,
    GeoJson,
    TopoJson,
    Stl,
}

impl DiagramLanguage {
    pub const ALL: [DiagramLanguage; 4] = [
        DiagramLanguage::Mermaid,
        DiagramLanguage::GeoJson,
        DiagramLanguage::TopoJson,
        DiagramLanguage::Stl,
    ];

    /// Lowercase fence tag, also used as the code-block fallback label.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramLanguage::Mermaid => "mermaid",
            DiagramLanguage::GeoJson => "geojson",
            DiagramLanguage::TopoJson => "topojson",
            DiagramLanguage::Stl => "stl",
        }
    }
}

impl fmt::Display for DiagramLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown diagram language: {0}")]
pub struct UnknownDiagramLanguage(pub String);

impl FromStr for DiagramLanguage {
    type Err = UnknownDiagramLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        DiagramLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str() == normalized)
            .ok_or_else(|| UnknownDiagramLanguage(s.to_string()))
    }
}
