//! Transitive reduction of the cover relation.
//!
//! An edge `x → y` is redundant iff `y` is still reachable from `x` once the
//! direct edge is ignored. For a DAG the set of redundant edges is fixed by
//! the reachability order alone: dropping one redundant edge never changes
//! whether another edge is redundant. The reducer therefore tests every
//! candidate against the graph as it stands and prunes the redundant ones
//! together, which makes the outcome independent of the order in which
//! candidates are visited.
//!
//! Pruning goes through [`NodeStore::unlink`], so both endpoints stay in
//! agreement and untouched entries stay shared with earlier snapshots.

use std::collections::BTreeSet;

use crate::entry::WordId;
use crate::store::NodeStore;

use super::Edge;
use super::cycle::reaches;
use super::traverse::{ancestors_or_self, descendants_or_self};

/// Whether the listed edge `upper → lower` is implied by a longer path.
pub fn is_redundant(store: &NodeStore, upper: WordId, lower: WordId) -> bool {
    let Some(entry) = store.live(upper) else {
        return false;
    };
    reaches(
        store,
        entry.lower_covers.iter().copied().filter(|&next| next != lower),
        lower,
    )
}

/// Reduce the whole graph. Returns the pruned edges in ascending order.
pub fn reduce_all(store: &mut NodeStore) -> Vec<Edge> {
    let candidates: Vec<Edge> = store.edges().map(Edge::from).collect();
    prune(store, candidates)
}

/// Reduce only where the freshly added `new_edges` can have made an edge
/// redundant.
///
/// A new edge `p → c` can only shortcut an existing edge `a → d` when `a` is
/// at or above `p` and `d` is at or below `c`; the new edge itself is a
/// candidate too, since a longer path `p → … → c` may already exist.
pub fn reduce_around(store: &mut NodeStore, new_edges: &[Edge]) -> Vec<Edge> {
    let mut candidates: BTreeSet<Edge> = BTreeSet::new();

    for edge in new_edges {
        let above = ancestors_or_self(store, edge.upper);
        let below = descendants_or_self(store, edge.lower);
        for &a in &above {
            let Some(entry) = store.live(a) else {
                continue;
            };
            candidates.extend(
                entry
                    .lower_covers
                    .iter()
                    .copied()
                    .filter(|d| below.contains(d))
                    .map(|d| Edge::new(a, d)),
            );
        }
    }

    tracing::trace!(
        new_edges = new_edges.len(),
        candidates = candidates.len(),
        "reducing around new edges"
    );
    prune(store, candidates)
}

fn prune(store: &mut NodeStore, candidates: impl IntoIterator<Item = Edge>) -> Vec<Edge> {
    let redundant: Vec<Edge> = candidates
        .into_iter()
        .filter(|e| is_redundant(store, e.upper, e.lower))
        .collect();

    for edge in &redundant {
        store.unlink(edge.upper, edge.lower);
        tracing::trace!(%edge, "pruned redundant edge");
    }
    redundant
}
