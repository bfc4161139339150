//! Sparse, append-only entry table.
//!
//! The [`NodeStore`] maps each [`WordId`] to its slot: a live [`Entry`] or a
//! tombstone. Slots hold `Arc<Entry>`, so cloning a store shares every entry
//! and writing through [`NodeStore::entry_mut`] copies only the entry being
//! touched. A previous snapshot therefore stays valid and unchanged after an
//! edit.
//!
//! The table never shrinks and never reassigns an id.

use std::sync::Arc;

use crate::entry::{CoverSide, Entry, WordId};
use crate::error::{StoreError, ValidationError};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Copy-on-write table of entries indexed by id.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    slots: Vec<Option<Arc<Entry>>>,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw slots. Slot `i` must hold an entry with id `i`
    /// or nothing.
    pub(crate) fn from_slots(slots: Vec<Option<Entry>>) -> Self {
        Self {
            slots: slots.into_iter().map(|s| s.map(Arc::new)).collect(),
        }
    }

    /// Look up a live entry.
    pub fn get(&self, id: WordId) -> Result<&Entry, ValidationError> {
        match self.slots.get(id.index()) {
            None => Err(ValidationError::OutOfRange {
                id,
                len: self.slots.len(),
            }),
            Some(None) => Err(ValidationError::Tombstoned { id }),
            Some(Some(entry)) => Ok(entry),
        }
    }

    /// Look up a live entry, ignoring why a miss happened.
    pub fn live(&self, id: WordId) -> Option<&Entry> {
        self.slots.get(id.index()).and_then(|s| s.as_deref())
    }

    pub fn is_live(&self, id: WordId) -> bool {
        self.live(id).is_some()
    }

    /// Reserve the next id. The new slot is a tombstone until [`put`](Self::put).
    pub fn allocate(&mut self) -> StoreResult<WordId> {
        let len = self.slots.len();
        let id = WordId::from_index(len).ok_or(StoreError::Exhausted { len })?;
        self.slots.push(None);
        Ok(id)
    }

    /// Write `entry` into its slot, replacing whatever was there.
    pub fn put(&mut self, entry: Entry) -> StoreResult<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(entry.id.index())
            .ok_or(StoreError::NotAllocated { id: entry.id, len })?;
        *slot = Some(Arc::new(entry));
        Ok(())
    }

    /// Mutable access to a live entry, copying it first if another snapshot
    /// shares it.
    pub fn entry_mut(&mut self, id: WordId) -> Result<&mut Entry, ValidationError> {
        let len = self.slots.len();
        match self.slots.get_mut(id.index()) {
            None => Err(ValidationError::OutOfRange { id, len }),
            Some(None) => Err(ValidationError::Tombstoned { id }),
            Some(Some(entry)) => Ok(Arc::make_mut(entry)),
        }
    }

    /// Mark a slot as deleted. Returns the entry that was there, if any.
    pub fn tombstone(&mut self, id: WordId) -> Option<Arc<Entry>> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    /// Add the edge `upper → lower` on both endpoints.
    ///
    /// Both ids must be live. Returns whether the edge was new.
    pub fn link(&mut self, upper: WordId, lower: WordId) -> Result<bool, ValidationError> {
        self.get(upper)?;
        self.get(lower)?;
        let added = self.entry_mut(upper)?.lower_covers.insert(lower);
        self.entry_mut(lower)?.upper_covers.insert(upper);
        Ok(added)
    }

    /// Remove the edge `upper → lower` from whichever endpoints are live.
    ///
    /// Only entries that actually list the edge are copied. Returns whether
    /// either endpoint listed it.
    pub fn unlink(&mut self, upper: WordId, lower: WordId) -> bool {
        let from_upper = self.detach(upper, CoverSide::Lower, lower);
        let from_lower = self.detach(lower, CoverSide::Upper, upper);
        from_upper || from_lower
    }

    /// Remove `partner` from `id`'s cover set on `side`, if present.
    pub(crate) fn detach(&mut self, id: WordId, side: CoverSide, partner: WordId) -> bool {
        let listed = self
            .live(id)
            .is_some_and(|e| e.covers(side).contains(&partner));
        if !listed {
            return false;
        }
        match self.entry_mut(id) {
            Ok(entry) => entry.covers_mut(side).remove(&partner),
            Err(_) => false,
        }
    }

    /// Whether the edge `upper → lower` is listed by `upper`.
    pub fn has_edge(&self, upper: WordId, lower: WordId) -> bool {
        self.live(upper)
            .is_some_and(|e| e.lower_covers.contains(&lower))
    }

    /// Iterate all live entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }

    /// Iterate all live ids in ascending order.
    pub fn live_ids(&self) -> impl Iterator<Item = WordId> + '_ {
        self.iter().map(|e| e.id)
    }

    /// Iterate every edge `(upper, lower)` as listed by the upper endpoint.
    pub fn edges(&self) -> impl Iterator<Item = (WordId, WordId)> + '_ {
        self.iter()
            .flat_map(|e| e.lower_covers.iter().map(move |&lower| (e.id, lower)))
    }

    /// Raw slots, tombstones included, in id order.
    pub fn slots(&self) -> impl Iterator<Item = Option<&Entry>> {
        self.slots.iter().map(|s| s.as_deref())
    }

    /// Total number of slots, tombstones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of live entries.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether two stores hold the very same entry allocation for `id`.
    ///
    /// Used to check that an edit left untouched entries shared.
    pub fn shares_entry(&self, other: &NodeStore, id: WordId) -> bool {
        match (self.slots.get(id.index()), other.slots.get(id.index())) {
            (Some(Some(a)), Some(Some(b))) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for NodeStore {
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|(a, b)| a.as_deref() == b.as_deref())
    }
}

impl Eq for NodeStore {}
