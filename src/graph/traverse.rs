//! Closures over the cover relation and category roots.

use std::collections::HashSet;

use crate::entry::{Entry, WordId};
use crate::store::NodeStore;

/// The entry itself followed by every upper-cover ancestor, depth first,
/// each id once.
///
/// This is the order a tree view needs to expand the path(s) leading to
/// `id`. Returns an empty list for a dead id.
pub fn ancestors_of(store: &NodeStore, id: WordId) -> Vec<WordId> {
    walk(store, id, |e| e.upper_covers.iter())
}

/// The entry itself followed by every lower-cover descendant, depth first,
/// each id once.
pub fn descendants_of(store: &NodeStore, id: WordId) -> Vec<WordId> {
    walk(store, id, |e| e.lower_covers.iter())
}

/// Set form of [`ancestors_of`].
pub fn ancestors_or_self(store: &NodeStore, id: WordId) -> HashSet<WordId> {
    ancestors_of(store, id).into_iter().collect()
}

/// Set form of [`descendants_of`].
pub fn descendants_or_self(store: &NodeStore, id: WordId) -> HashSet<WordId> {
    descendants_of(store, id).into_iter().collect()
}

/// Live entries whose category equals `marker`, in id order.
pub fn list_roots(store: &NodeStore, marker: &str) -> Vec<WordId> {
    store
        .iter()
        .filter(|e| e.is_category_root(marker))
        .map(|e| e.id)
        .collect()
}

fn walk<'a, F, I>(store: &'a NodeStore, id: WordId, next: F) -> Vec<WordId>
where
    F: Fn(&'a Entry) -> I,
    I: DoubleEndedIterator<Item = &'a WordId>,
{
    let mut order = Vec::new();
    let mut seen: HashSet<WordId> = HashSet::new();
    let mut stack = vec![id];

    while let Some(current) = stack.pop() {
        let Some(entry) = store.live(current) else {
            continue;
        };
        if !seen.insert(current) {
            continue;
        }
        order.push(current);
        // Reversed so the smallest neighbor is visited first.
        stack.extend(next(entry).rev().copied().filter(|n| !seen.contains(n)));
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{id, store};

    #[test]
    fn ancestors_start_with_self_and_visit_each_once() {
        // 0 and 1 are both above 2; 0 is above 1; 2 is above 3.
        let s = store(4, &[(0, 1), (0, 2), (1, 2), (2, 3)]);
        let anc = ancestors_of(&s, id(3));
        assert_eq!(anc[0], id(3));
        assert_eq!(anc.len(), 4);
        assert_eq!(anc, vec![id(3), id(2), id(0), id(1)]);
    }

    #[test]
    fn descendants_depth_first() {
        let s = store(5, &[(0, 1), (0, 2), (1, 3), (2, 4)]);
        assert_eq!(
            descendants_of(&s, id(0)),
            vec![id(0), id(1), id(3), id(2), id(4)]
        );
        assert_eq!(descendants_of(&s, id(4)), vec![id(4)]);
    }

    #[test]
    fn dead_id_has_no_closure() {
        let mut s = store(2, &[(0, 1)]);
        s.tombstone(id(1));
        assert!(ancestors_of(&s, id(1)).is_empty());
        assert!(descendants_of(&s, id(9)).is_empty());
        assert_eq!(descendants_of(&s, id(0)), vec![id(0)]);
    }

    #[test]
    fn roots_match_category_marker() {
        let mut s = store(3, &[(0, 2)]);
        s.entry_mut(id(0)).unwrap().category = "カテゴリ".into();
        s.entry_mut(id(1)).unwrap().category = "カテゴリ".into();
        s.entry_mut(id(2)).unwrap().category = "動物".into();
        assert_eq!(list_roots(&s, "カテゴリ"), vec![id(0), id(1)]);
        assert!(list_roots(&s, "none").is_empty());
    }
}
