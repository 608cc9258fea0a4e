//! # Node Model
//!
//! The immutable, identity-bearing tree that parsing produces, plugins
//! rewrite and the layout solver measures.
//!
//! - **`types`**: identity, source ranges and the small payload enums
//! - **`node`**: [`Node`] / [`NodeKind`] and tree traversal helpers

pub mod node;
pub mod types;

pub use node::{Node, NodeKind, NodeRef};
pub use types::{
    CheckboxState, DiagramLanguage, MathStyle, NodeId, SourceRange, TableAlignment,
    UnknownDiagramLanguage,
};
