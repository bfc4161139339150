//! Engine facade: snapshots and the mutation operations over them.
//!
//! A [`Lexicon`] is an immutable snapshot of the dictionary. The
//! [`MutationEngine`] never modifies the snapshot it is given: every
//! operation builds a new store (sharing untouched entries with the old one)
//! and hands it back inside a [`Commit`], or returns a [`Rejection`] when
//! nothing could be applied.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::entry::{CoverSide, Entry, FieldUpdate, WordId};
use crate::error::{CycleError, EditError, IntegrityWarning, Rejection, ValidationError};
use crate::graph::Edge;
use crate::graph::cycle::would_create_cycle;
use crate::graph::integrity::{self, IntegrityReport};
use crate::graph::reconcile::reconcile;
use crate::graph::reduce::reduce_around;
use crate::graph::traverse;
use crate::store::NodeStore;

/// Category value that marks a root entry unless configured otherwise.
pub const DEFAULT_CATEGORY_MARKER: &str = "カテゴリ";

/// What `delete_word` does when relinking a child under the reattachment
/// target would close a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReattachPolicy {
    /// Skip the offending relink, report it, and delete anyway.
    #[default]
    SkipConflicting,
    /// Reject the whole delete.
    Abort,
}

impl std::fmt::Display for ReattachPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReattachPolicy::SkipConflicting => f.write_str("skip-conflicting"),
            ReattachPolicy::Abort => f.write_str("abort"),
        }
    }
}

/// Configuration for the mutation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Category value marking a root entry.
    pub category_marker: String,
    /// Conflict handling for `delete_word` with a reattachment target.
    pub reattach_policy: ReattachPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            category_marker: DEFAULT_CATEGORY_MARKER.to_string(),
            reattach_policy: ReattachPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable dictionary snapshot with its version stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    store: NodeStore,
    version: u64,
}

impl Lexicon {
    /// An empty dictionary at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store as version 0.
    pub fn from_store(store: NodeStore) -> Self {
        Self { store, version: 0 }
    }

    fn successor(&self, store: NodeStore) -> Self {
        Self {
            store,
            version: self.version + 1,
        }
    }

    /// The same snapshot under a different version stamp.
    pub(crate) fn restamped(self, version: u64) -> Self {
        Self { version, ..self }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Look up a live entry.
    pub fn get_entry(&self, id: WordId) -> Result<&Entry, ValidationError> {
        self.store.get(id)
    }

    /// Live entries whose category is `marker`, in id order.
    pub fn list_roots(&self, marker: &str) -> Vec<WordId> {
        traverse::list_roots(&self.store, marker)
    }

    /// `id` followed by all of its ancestors, depth first, each once.
    pub fn ancestors_of(&self, id: WordId) -> Vec<WordId> {
        traverse::ancestors_of(&self.store, id)
    }

    /// `id` followed by all of its descendants, depth first, each once.
    pub fn descendants_of(&self, id: WordId) -> Vec<WordId> {
        traverse::descendants_of(&self.store, id)
    }

    pub fn live_count(&self) -> usize {
        self.store.live_count()
    }

    /// Summary counts for display.
    pub fn info(&self) -> LexiconInfo {
        LexiconInfo {
            version: self.version,
            slots: self.store.len(),
            live: self.store.live_count(),
            edges: self.store.edges().count(),
        }
    }
}

/// Summary information about a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconInfo {
    pub version: u64,
    pub slots: usize,
    pub live: usize,
    pub edges: usize,
}

impl std::fmt::Display for LexiconInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "lexicon info")?;
        writeln!(f, "  version:     {}", self.version)?;
        writeln!(f, "  entries:     {}", self.live)?;
        writeln!(f, "  tombstones:  {}", self.slots - self.live)?;
        writeln!(f, "  edges:       {}", self.edges)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// The outcome of a successful mutation.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The new snapshot.
    pub lexicon: Lexicon,
    /// Version of the snapshot the mutation was applied to.
    pub base_version: u64,
    /// Entry a view should move to, if any.
    pub focus: Option<WordId>,
    /// Entry created by the mutation, if any.
    pub created: Option<WordId>,
    /// Repairs applied while committing.
    pub warnings: Vec<IntegrityWarning>,
    /// Parts of the edit that were dropped.
    pub rejected: Vec<EditError>,
}

impl Commit {
    /// Whether the edit applied in full with no repairs.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.rejected.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Mutation engine
// ---------------------------------------------------------------------------

/// Applies edits to snapshots.
#[derive(Debug, Clone, Default)]
pub struct MutationEngine {
    config: EngineConfig,
}

impl MutationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a category root with the given headword.
    ///
    /// Roots have no upper covers; their category is the configured marker.
    pub fn add_root(&self, lex: &Lexicon, headword: &str) -> Result<Commit, Rejection> {
        let mut store = lex.store.clone();
        let id = store.allocate().map_err(Rejection::single)?;
        let entry = Entry::blank(id)
            .with_headword(headword)
            .with_category(self.config.category_marker.as_str());
        store.put(entry).map_err(Rejection::single)?;

        tracing::debug!(%id, headword, "added category root");
        Ok(self.finish(lex, store, Some(id), Some(id), Vec::new(), Vec::new()))
    }

    /// Create a blank entry directly below `parent`.
    ///
    /// The child inherits the parent's category, except under a category
    /// root, where the child's category becomes the root's headword.
    pub fn add_word(&self, lex: &Lexicon, parent: WordId) -> Result<Commit, Rejection> {
        let parent_entry = lex.store.get(parent).map_err(Rejection::single)?;
        let category = if parent_entry.is_category_root(&self.config.category_marker) {
            parent_entry.entry.clone()
        } else {
            parent_entry.category.clone()
        };

        let mut store = lex.store.clone();
        let id = store.allocate().map_err(Rejection::single)?;
        store
            .put(Entry::blank(id).with_category(category))
            .map_err(Rejection::single)?;
        store.link(parent, id).map_err(Rejection::single)?;

        tracing::debug!(%id, %parent, "added word");
        Ok(self.finish(lex, store, Some(id), Some(id), Vec::new(), Vec::new()))
    }

    /// Delete `id`.
    ///
    /// With `reattach_to`, the deleted entry's children move under that
    /// entry. Without it, the entry and every descendant are deleted.
    pub fn delete_word(
        &self,
        lex: &Lexicon,
        id: WordId,
        reattach_to: Option<WordId>,
    ) -> Result<Commit, Rejection> {
        let target = lex.store.get(id).map_err(Rejection::single)?;
        let parents: Vec<WordId> = target.upper_covers.iter().copied().collect();

        let mut store = lex.store.clone();
        let (warnings, rejected) = match reattach_to {
            Some(anchor) => self.delete_and_reattach(&mut store, id, anchor)?,
            None => (delete_subtree(&mut store, id), Vec::new()),
        };

        let focus = reattach_to
            .or_else(|| parents.into_iter().find(|&p| store.is_live(p)))
            .or_else(|| {
                traverse::list_roots(&store, &self.config.category_marker)
                    .first()
                    .copied()
            });

        tracing::debug!(
            %id,
            reattach_to = ?reattach_to,
            removed = lex.store.live_count() - store.live_count(),
            "deleted word"
        );
        Ok(self.finish(lex, store, focus, None, warnings, rejected))
    }

    fn delete_and_reattach(
        &self,
        store: &mut NodeStore,
        id: WordId,
        anchor: WordId,
    ) -> Result<(Vec<IntegrityWarning>, Vec<EditError>), Rejection> {
        if anchor == id {
            return Err(Rejection::single(ValidationError::SelfReference { id }));
        }
        store.get(anchor).map_err(Rejection::single)?;

        let target = store.get(id).map_err(Rejection::single)?;
        let parents: Vec<WordId> = target.upper_covers.iter().copied().collect();
        let children: Vec<WordId> = target.lower_covers.iter().copied().collect();

        for &p in &parents {
            store.unlink(p, id);
        }
        for &c in &children {
            store.unlink(id, c);
        }
        store.tombstone(id);

        let mut rejected: Vec<EditError> = Vec::new();
        let mut added: Vec<Edge> = Vec::new();
        for c in children {
            if would_create_cycle(store, anchor, c) {
                tracing::warn!(%anchor, child = %c, "skipping reattachment: would create a cycle");
                rejected.push(CycleError { upper: anchor, lower: c }.into());
                continue;
            }
            if store.link(anchor, c).map_err(Rejection::single)? {
                added.push(Edge::new(anchor, c));
            }
        }

        if self.config.reattach_policy == ReattachPolicy::Abort && !rejected.is_empty() {
            return Err(Rejection::new(rejected));
        }

        let warnings = pruned_warnings(reduce_around(store, &added));
        Ok((warnings, rejected))
    }

    /// Replace one field of `id`.
    ///
    /// Cover fields go through the link reconciler. Invalid argument ids are
    /// dropped and reported.
    pub fn update_field(
        &self,
        lex: &Lexicon,
        id: WordId,
        update: FieldUpdate,
    ) -> Result<Commit, Rejection> {
        lex.store.get(id).map_err(Rejection::single)?;
        let field = update.field_name();

        let mut rejected: Vec<EditError> = Vec::new();
        let update = match update {
            FieldUpdate::UpperCovers(ids) => {
                return self.relink_covers(lex, id, CoverSide::Upper, ids);
            }
            FieldUpdate::LowerCovers(ids) => {
                return self.relink_covers(lex, id, CoverSide::Lower, ids);
            }
            FieldUpdate::Arguments(ids) => {
                let mut kept = Vec::with_capacity(ids.len());
                for arg in ids {
                    match lex.store.get(arg) {
                        Ok(_) => kept.push(arg),
                        Err(e) => rejected.push(e.into()),
                    }
                }
                FieldUpdate::Arguments(kept)
            }
            other => other,
        };

        let mut store = lex.store.clone();
        let entry = store.entry_mut(id).map_err(Rejection::single)?;
        if let Err((side, desired)) = update.apply_payload(entry) {
            return self.relink_covers(lex, id, side, desired);
        }

        tracing::debug!(%id, field, "updated field");
        Ok(self.finish(lex, store, Some(id), None, Vec::new(), rejected))
    }

    /// Replace `id`'s cover set on `side` with `desired`.
    pub fn relink_covers(
        &self,
        lex: &Lexicon,
        id: WordId,
        side: CoverSide,
        desired: impl IntoIterator<Item = WordId>,
    ) -> Result<Commit, Rejection> {
        let reconciled = reconcile(&lex.store, id, side, desired)?;
        tracing::debug!(
            %id,
            %side,
            added = reconciled.added.len(),
            removed = reconciled.removed.len(),
            pruned = reconciled.warnings.len(),
            rejected = reconciled.rejected.len(),
            "relinked covers"
        );
        Ok(self.finish(
            lex,
            reconciled.store,
            Some(id),
            None,
            reconciled.warnings,
            reconciled.rejected,
        ))
    }

    /// Audit every invariant of `lex`.
    pub fn verify(&self, lex: &Lexicon) -> IntegrityReport {
        integrity::verify(&lex.store)
    }

    fn finish(
        &self,
        base: &Lexicon,
        store: NodeStore,
        focus: Option<WordId>,
        created: Option<WordId>,
        warnings: Vec<IntegrityWarning>,
        rejected: Vec<EditError>,
    ) -> Commit {
        Commit {
            lexicon: base.successor(store),
            base_version: base.version,
            focus,
            created,
            warnings,
            rejected,
        }
    }
}

/// Tombstone `id` and its whole descendant closure, detaching every link from
/// a surviving entry into the closure.
fn delete_subtree(store: &mut NodeStore, id: WordId) -> Vec<IntegrityWarning> {
    let closure = traverse::descendants_of(store, id);
    let doomed: HashSet<WordId> = closure.iter().copied().collect();
    let mut warnings = Vec::new();

    for &member in &closure {
        let survivors: Vec<WordId> = store
            .live(member)
            .map(|e| {
                e.upper_covers
                    .iter()
                    .copied()
                    .filter(|u| !doomed.contains(u))
                    .collect()
            })
            .unwrap_or_default();
        for &u in &survivors {
            store.detach(u, CoverSide::Lower, member);
        }
        if member != id && !survivors.is_empty() {
            tracing::warn!(%member, "deleting descendant that still had other parents");
            warnings.push(IntegrityWarning::SharedDescendantRemoved { id: member, survivors });
        }
    }

    for &member in &closure {
        store.tombstone(member);
    }
    warnings
}

fn pruned_warnings(pruned: Vec<Edge>) -> Vec<IntegrityWarning> {
    pruned
        .into_iter()
        .map(|e| IntegrityWarning::RedundantEdgePruned {
            upper: e.upper,
            lower: e.lower,
        })
        .collect()
}
