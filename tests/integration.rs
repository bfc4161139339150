//! End-to-end tests for the lexicon engine.
//!
//! These tests drive the public API the way an editor would: build a small
//! taxonomy, edit it through the mutation engine, and check the resulting
//! snapshots against the order invariants.

use hasse_lexicon::engine::{Commit, Lexicon, MutationEngine};
use hasse_lexicon::entry::{CoverSide, FieldUpdate, WordId};
use hasse_lexicon::error::{CycleError, EditError, IntegrityWarning};
use hasse_lexicon::history::History;

/// 動物 (root) -> 哺乳類 -> {ねこ, いぬ}
struct Taxonomy {
    engine: MutationEngine,
    lex: Lexicon,
    root: WordId,
    mammal: WordId,
    cat: WordId,
    dog: WordId,
}

fn named(engine: &MutationEngine, commit: Commit, headword: &str) -> (Lexicon, WordId) {
    let id = commit.created.unwrap();
    let c = engine
        .update_field(&commit.lexicon, id, FieldUpdate::Entry(headword.into()))
        .unwrap();
    (c.lexicon, id)
}

fn taxonomy() -> Taxonomy {
    let engine = MutationEngine::default();
    let c = engine.add_root(&Lexicon::new(), "動物").unwrap();
    let (lex, root) = (c.lexicon, c.created.unwrap());
    let (lex, mammal) = named(&engine, engine.add_word(&lex, root).unwrap(), "哺乳類");
    let (lex, cat) = named(&engine, engine.add_word(&lex, mammal).unwrap(), "ねこ");
    let (lex, dog) = named(&engine, engine.add_word(&lex, mammal).unwrap(), "いぬ");
    Taxonomy {
        engine,
        lex,
        root,
        mammal,
        cat,
        dog,
    }
}

fn uppers(lex: &Lexicon, id: WordId) -> Vec<WordId> {
    lex.get_entry(id).unwrap().upper_covers.iter().copied().collect()
}

fn lowers(lex: &Lexicon, id: WordId) -> Vec<WordId> {
    lex.get_entry(id).unwrap().lower_covers.iter().copied().collect()
}

#[test]
fn taxonomy_is_consistent_and_categorized() {
    let t = taxonomy();
    assert!(t.engine.verify(&t.lex).is_consistent());
    assert_eq!(t.lex.list_roots("カテゴリ"), vec![t.root]);
    assert_eq!(t.lex.get_entry(t.mammal).unwrap().category, "動物");
    assert_eq!(t.lex.get_entry(t.cat).unwrap().category, "動物");
    assert_eq!(t.lex.ancestors_of(t.cat), vec![t.cat, t.mammal, t.root]);
    assert_eq!(
        t.lex.descendants_of(t.root),
        vec![t.root, t.mammal, t.cat, t.dog]
    );
}

#[test]
fn add_then_delete_restores_parent_covers() {
    let t = taxonomy();
    let added = t.engine.add_word(&t.lex, t.mammal).unwrap();
    let n = added.created.unwrap();
    assert_eq!(lowers(&added.lexicon, t.mammal), vec![t.cat, t.dog, n]);

    let deleted = t.engine.delete_word(&added.lexicon, n, None).unwrap();
    assert_eq!(lowers(&deleted.lexicon, t.mammal), vec![t.cat, t.dog]);
}

#[test]
fn cycle_edge_is_rejected_and_snapshot_unchanged() {
    let t = taxonomy();
    // cat is below root; making cat a parent of root closes a cycle.
    let err = t
        .engine
        .relink_covers(&t.lex, t.cat, CoverSide::Lower, [t.root])
        .unwrap_err();
    assert_eq!(
        err.errors,
        vec![EditError::Cycle(CycleError {
            upper: t.cat,
            lower: t.root,
        })]
    );
    assert!(lowers(&t.lex, t.cat).is_empty());
    assert!(uppers(&t.lex, t.root).is_empty());
}

#[test]
fn redundant_upper_cover_is_pruned() {
    // A = cat, B = mammal, C = root. Setting A.upper = {B, C} yields {B}.
    let t = taxonomy();
    let c = t
        .engine
        .update_field(
            &t.lex,
            t.cat,
            FieldUpdate::UpperCovers(vec![t.mammal, t.root]),
        )
        .unwrap();
    assert_eq!(uppers(&c.lexicon, t.cat), vec![t.mammal]);
    assert_eq!(lowers(&c.lexicon, t.root), vec![t.mammal]);
    assert_eq!(
        c.warnings,
        vec![IntegrityWarning::RedundantEdgePruned {
            upper: t.root,
            lower: t.cat,
        }]
    );
    assert!(t.engine.verify(&c.lexicon).is_consistent());
}

#[test]
fn delete_with_reattach_moves_children_to_grandparent() {
    let t = taxonomy();
    let c = t.engine.delete_word(&t.lex, t.mammal, Some(t.root)).unwrap();
    assert!(c.is_clean());
    assert_eq!(lowers(&c.lexicon, t.root), vec![t.cat, t.dog]);
    assert_eq!(uppers(&c.lexicon, t.cat), vec![t.root]);
    assert_eq!(uppers(&c.lexicon, t.dog), vec![t.root]);
    assert!(c.lexicon.get_entry(t.mammal).is_err());
    assert!(t.engine.verify(&c.lexicon).is_consistent());
}

#[test]
fn delete_without_reattach_removes_subtree() {
    let t = taxonomy();
    let c = t.engine.delete_word(&t.lex, t.mammal, None).unwrap();
    for gone in [t.mammal, t.cat, t.dog] {
        assert!(c.lexicon.get_entry(gone).is_err());
    }
    assert!(lowers(&c.lexicon, t.root).is_empty());
    assert_eq!(c.focus, Some(t.root));
    assert_eq!(c.lexicon.store().len(), 4);
    assert!(t.engine.verify(&c.lexicon).is_consistent());
}

#[test]
fn deleted_ids_are_not_reused() {
    let t = taxonomy();
    let c = t.engine.delete_word(&t.lex, t.dog, None).unwrap();
    let c = t.engine.add_word(&c.lexicon, t.mammal).unwrap();
    assert_eq!(c.created, Some(WordId::new(4)));
}

#[test]
fn multiple_inheritance_is_kept() {
    // A pet category under root; cat is both a mammal and a pet.
    let t = taxonomy();
    let (lex, pet) = named(&t.engine, t.engine.add_word(&t.lex, t.root).unwrap(), "ペット");
    let c = t
        .engine
        .relink_covers(&lex, t.cat, CoverSide::Upper, [t.mammal, pet])
        .unwrap();
    assert!(c.is_clean());
    assert_eq!(uppers(&c.lexicon, t.cat), vec![t.mammal, pet]);
    // Ancestors list the shared root once.
    assert_eq!(
        c.lexicon.ancestors_of(t.cat),
        vec![t.cat, t.mammal, t.root, pet]
    );
}

#[test]
fn mutations_leave_earlier_snapshots_intact() {
    let t = taxonomy();
    let before = t.lex.clone();
    let c = t.engine.delete_word(&t.lex, t.mammal, None).unwrap();
    assert_eq!(t.lex, before);
    assert_eq!(t.lex.live_count(), 4);
    assert_eq!(c.lexicon.live_count(), 1);
}

#[test]
fn history_tracks_engine_commits() {
    let t = taxonomy();
    let mut history = History::new(t.lex.clone());

    let c = t.engine.delete_word(history.current(), t.cat, None).unwrap();
    history.commit(c).unwrap();
    assert!(history.current().get_entry(t.cat).is_err());

    assert!(history.undo());
    assert_eq!(history.current(), &t.lex);

    // A commit computed from the undone snapshot is stale after redo.
    let stale = t.engine.add_word(history.current(), t.root).unwrap();
    assert!(history.redo());
    assert!(history.commit(stale).is_err());
}
