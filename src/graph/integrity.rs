//! Full invariant audit of a store.
//!
//! The audit builds a `petgraph` view of the cover relation (union of both
//! sides) and checks every invariant independently of the incremental
//! machinery: cycles via Tarjan's SCC, plus symmetry, minimality, tombstone
//! closure, and self edges by direct inspection.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::entry::{CoverSide, WordId};
use crate::store::NodeStore;

use super::Edge;
use super::reduce::is_redundant;

/// A cover reference to an id that is not live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingRef {
    pub from: WordId,
    pub target: WordId,
    pub side: CoverSide,
}

/// Everything the audit found. Empty means every invariant holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// Strongly connected components of size > 1, each sorted.
    pub cycles: Vec<Vec<WordId>>,
    /// Edges listed on only one endpoint.
    pub asymmetric: Vec<Edge>,
    /// Edges implied by a longer path.
    pub redundant: Vec<Edge>,
    /// Cover references to tombstoned or missing ids.
    pub dangling: Vec<DanglingRef>,
    /// Entries listing themselves as a cover.
    pub self_edges: Vec<WordId>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.cycles.is_empty()
            && self.asymmetric.is_empty()
            && self.redundant.is_empty()
            && self.dangling.is_empty()
            && self.self_edges.is_empty()
    }

    /// Total number of problems found.
    pub fn problem_count(&self) -> usize {
        self.cycles.len()
            + self.asymmetric.len()
            + self.redundant.len()
            + self.dangling.len()
            + self.self_edges.len()
    }
}

/// Audit every invariant of `store`.
pub fn verify(store: &NodeStore) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    let mut edges: BTreeSet<Edge> = BTreeSet::new();

    for entry in store.iter() {
        for side in [CoverSide::Upper, CoverSide::Lower] {
            for &partner in entry.covers(side) {
                if partner == entry.id {
                    report.self_edges.push(entry.id);
                    continue;
                }
                let Some(other) = store.live(partner) else {
                    report.dangling.push(DanglingRef {
                        from: entry.id,
                        target: partner,
                        side,
                    });
                    continue;
                };
                let edge = Edge::from(side.orient(entry.id, partner));
                if !other.covers(side.opposite()).contains(&entry.id) {
                    report.asymmetric.push(edge);
                }
                edges.insert(edge);
            }
        }
    }
    report.self_edges.dedup();

    let graph = build_graph(store, &edges);
    if is_cyclic_directed(&graph) {
        report.cycles = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut ids: Vec<WordId> = scc.into_iter().map(|ix| graph[ix]).collect();
                ids.sort();
                ids
            })
            .collect();
        report.cycles.sort();
    } else {
        report.redundant = edges
            .iter()
            .copied()
            .filter(|e| store.has_edge(e.upper, e.lower) && is_redundant(store, e.upper, e.lower))
            .collect();
    }

    if !report.is_consistent() {
        tracing::debug!(problems = report.problem_count(), "integrity audit found problems");
    }
    report
}

fn build_graph(store: &NodeStore, edges: &BTreeSet<Edge>) -> DiGraph<WordId, ()> {
    let mut graph = DiGraph::new();
    let mut index: HashMap<WordId, NodeIndex> = HashMap::new();
    for id in store.live_ids() {
        index.insert(id, graph.add_node(id));
    }
    for edge in edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.upper), index.get(&edge.lower)) {
            graph.add_edge(a, b, ());
        }
    }
    graph
}
