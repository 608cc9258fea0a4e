//! # Snapshot testing support
//!
//! - **`normalize`**: converts a node tree to a stable [`NodeSnap`] outline
//!   without node ids, for `insta` snapshots and plain string comparisons.
//! - **`invariants`**: structural checks every parsed tree must satisfy
//!   (ranges in bounds and nested, lists hold items, tables hold sections).

pub mod invariants;
pub mod normalize;

pub use invariants::{check as invariants, check_depth};
pub use normalize::{NodeSnap, normalize};
