//! Reachability and cycle detection over `lower_covers`.
//!
//! All searches are iterative depth-first walks with a per-call visited set,
//! so shared sub-DAGs are explored once per query. Tombstoned or
//! out-of-range ids are never followed.

use std::collections::HashSet;

use crate::entry::WordId;
use crate::store::NodeStore;

/// True iff `target` is reachable from `start` in one or more
/// `lower_covers` hops.
pub fn is_descendant(store: &NodeStore, start: WordId, target: WordId) -> bool {
    let Some(entry) = store.live(start) else {
        return false;
    };
    reaches(store, entry.lower_covers.iter().copied(), target)
}

/// True iff `target` is reachable (in zero or more hops) from any of `from`.
pub(crate) fn reaches(
    store: &NodeStore,
    from: impl IntoIterator<Item = WordId>,
    target: WordId,
) -> bool {
    let mut visited: HashSet<WordId> = HashSet::new();
    let mut stack: Vec<WordId> = from.into_iter().collect();

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(entry) = store.live(current) {
            stack.extend(
                entry
                    .lower_covers
                    .iter()
                    .copied()
                    .filter(|next| !visited.contains(next)),
            );
        }
    }

    false
}

/// Whether any live entry is its own descendant.
///
/// Every cycle passes through at least one node, and that node tests
/// positive, so checking each node once is sufficient.
pub fn has_cycle(store: &NodeStore) -> bool {
    store.live_ids().any(|v| is_descendant(store, v, v))
}

/// Whether adding `upper → lower` would break acyclicity.
///
/// Unsafe when the edge is a self loop or when `upper` is already below
/// `lower`.
pub fn would_create_cycle(store: &NodeStore, upper: WordId, lower: WordId) -> bool {
    upper == lower || is_descendant(store, lower, upper)
}

/// Find one cycle, returned as the ids along it in edge order. The closing
/// edge runs from the last id back to the first.
pub fn find_cycle(store: &NodeStore) -> Option<Vec<WordId>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; store.len()];

    for root in store.live_ids() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        // Explicit stack of (node, remaining children) to avoid recursion.
        let mut path: Vec<WordId> = Vec::new();
        let mut frames: Vec<(WordId, Vec<WordId>)> = Vec::new();
        marks[root.index()] = Mark::OnStack;
        path.push(root);
        frames.push((root, children(store, root)));

        while let Some((node, pending)) = frames.last_mut() {
            let Some(next) = pending.pop() else {
                marks[node.index()] = Mark::Done;
                frames.pop();
                path.pop();
                continue;
            };
            if next.index() >= marks.len() {
                continue;
            }
            match marks[next.index()] {
                Mark::OnStack => {
                    let start = path.iter().position(|&p| p == next).unwrap_or(0);
                    return Some(path[start..].to_vec());
                }
                Mark::Done => {}
                Mark::Unvisited => {
                    marks[next.index()] = Mark::OnStack;
                    path.push(next);
                    frames.push((next, children(store, next)));
                }
            }
        }
    }

    None
}

fn children(store: &NodeStore, id: WordId) -> Vec<WordId> {
    store
        .live(id)
        .map(|e| e.lower_covers.iter().rev().copied().collect())
        .unwrap_or_default()
}
