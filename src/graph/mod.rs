//! Order maintenance over the cover relation.
//!
//! Edges are directed from general to specific: `x → y` means
//! `y ∈ x.lower_covers` (and, symmetrically, `x ∈ y.upper_covers`).
//!
//! - [`cycle`]: reachability and cycle detection
//! - [`reduce`]: transitive reduction (keeps the edge set a Hasse diagram)
//! - [`reconcile`]: one-sided cover edits made symmetric and safe
//! - [`traverse`]: ancestor/descendant closures and category roots
//! - [`integrity`]: full invariant audit

pub mod cycle;
pub mod integrity;
pub mod reconcile;
pub mod reduce;
pub mod traverse;

use serde::{Deserialize, Serialize};

use crate::entry::WordId;

/// A directed cover edge, `upper → lower`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub upper: WordId,
    pub lower: WordId,
}

impl Edge {
    pub fn new(upper: WordId, lower: WordId) -> Self {
        Self { upper, lower }
    }
}

impl From<(WordId, WordId)> for Edge {
    fn from((upper, lower): (WordId, WordId)) -> Self {
        Self { upper, lower }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.upper, self.lower)
    }
}
