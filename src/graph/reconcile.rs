//! Link reconciliation: turn a one-sided cover edit into a consistent graph.
//!
//! A caller edits one side of one entry (its upper or its lower covers). The
//! reconciler diffs the desired set against the stored one and then:
//!
//! 1. drops desired ids that are missing, deleted, or the entry itself;
//! 2. unlinks every removed partner on both endpoints;
//! 3. links every new partner on both endpoints, unless the edge would close
//!    a cycle, in which case only that edge is dropped;
//! 4. prunes whatever the new edges made redundant.
//!
//! Every dropped piece is reported. If nothing could be applied and something
//! was dropped, the whole edit is a [`Rejection`].

use std::collections::BTreeSet;

use crate::entry::{CoverSide, WordId};
use crate::error::{CycleError, EditError, IntegrityWarning, Rejection, ValidationError};
use crate::store::NodeStore;

use super::Edge;
use super::cycle::would_create_cycle;
use super::reduce::reduce_around;

/// Result of a reconciled cover edit.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// The store after the edit.
    pub store: NodeStore,
    /// Edges unlinked because the partner left the edited side.
    pub removed: Vec<Edge>,
    /// Edges linked because the partner joined the edited side.
    pub added: Vec<Edge>,
    /// Pieces of the edit that were dropped.
    pub rejected: Vec<EditError>,
    /// Repairs applied after linking.
    pub warnings: Vec<IntegrityWarning>,
}

impl Reconciled {
    /// Whether the edit touched any link.
    pub fn changed(&self) -> bool {
        !self.removed.is_empty() || !self.added.is_empty()
    }
}

/// Replace `id`'s cover set on `side` with `desired`, keeping the graph
/// symmetric, acyclic, and minimal.
///
/// `store` is not modified; the reconciled copy is returned.
pub fn reconcile(
    store: &NodeStore,
    id: WordId,
    side: CoverSide,
    desired: impl IntoIterator<Item = WordId>,
) -> Result<Reconciled, Rejection> {
    let current = store.get(id).map_err(Rejection::single)?.covers(side).clone();

    let mut rejected: Vec<EditError> = Vec::new();
    let mut wanted: BTreeSet<WordId> = BTreeSet::new();
    for partner in desired {
        if partner == id {
            rejected.push(ValidationError::SelfReference { id }.into());
            continue;
        }
        match store.get(partner) {
            Ok(_) => {
                wanted.insert(partner);
            }
            Err(e) => rejected.push(e.into()),
        }
    }

    let mut next = store.clone();

    let removed: Vec<Edge> = current
        .difference(&wanted)
        .map(|&partner| Edge::from(side.orient(id, partner)))
        .collect();
    for edge in &removed {
        next.unlink(edge.upper, edge.lower);
    }

    let mut added: Vec<Edge> = Vec::new();
    for &partner in wanted.difference(&current) {
        let edge = Edge::from(side.orient(id, partner));
        if would_create_cycle(&next, edge.upper, edge.lower) {
            tracing::warn!(%edge, "rejected cover edge: would create a cycle");
            rejected.push(
                CycleError {
                    upper: edge.upper,
                    lower: edge.lower,
                }
                .into(),
            );
            continue;
        }
        next.link(edge.upper, edge.lower).map_err(Rejection::single)?;
        added.push(edge);
    }

    if removed.is_empty() && added.is_empty() && !rejected.is_empty() {
        return Err(Rejection::new(rejected));
    }

    let warnings = reduce_around(&mut next, &added)
        .into_iter()
        .map(|e| IntegrityWarning::RedundantEdgePruned {
            upper: e.upper,
            lower: e.lower,
        })
        .collect();

    Ok(Reconciled {
        store: next,
        removed,
        added,
        rejected,
        warnings,
    })
}
