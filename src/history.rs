//! Bounded undo/redo over lexicon snapshots.
//!
//! Snapshots share every entry an edit did not touch, so keeping a hundred of
//! them costs little more than the edits themselves.
//!
//! Every snapshot the history accepts is stamped from a single counter, so
//! no two snapshots it has held ever share a version, even after an undo.

use std::collections::VecDeque;

use crate::config::LexiconConfig;
use crate::engine::{Commit, Lexicon};
use crate::error::HistoryError;

/// Default number of snapshots kept on the undo stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// The current snapshot plus the snapshots around it.
#[derive(Debug, Clone)]
pub struct History {
    current: Lexicon,
    undo: VecDeque<Lexicon>,
    redo: Vec<Lexicon>,
    limit: usize,
    next_version: u64,
}

impl History {
    pub fn new(initial: Lexicon) -> Self {
        Self::with_limit(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Keep at most `limit` undo steps. A limit of zero disables undo.
    pub fn with_limit(initial: Lexicon, limit: usize) -> Self {
        let next_version = initial.version() + 1;
        Self {
            current: initial,
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
            next_version,
        }
    }

    /// Start a history sized by `config.history_limit`.
    pub fn from_config(initial: Lexicon, config: &LexiconConfig) -> Self {
        Self::with_limit(initial, config.history_limit)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current(&self) -> &Lexicon {
        &self.current
    }

    /// Make `commit` the current snapshot.
    ///
    /// The commit must have been computed from the current snapshot; a commit
    /// based on any other version is rejected and nothing changes. The
    /// accepted snapshot is restamped with the next unused version.
    pub fn commit(&mut self, commit: Commit) -> Result<&Lexicon, HistoryError> {
        let current = self.current.version();
        if commit.base_version != current {
            return Err(HistoryError::StaleCommit {
                base: commit.base_version,
                current,
            });
        }

        let stamped = commit.lexicon.restamped(self.next_version);
        self.next_version += 1;
        let previous = std::mem::replace(&mut self.current, stamped);
        if self.limit > 0 {
            self.undo.push_back(previous);
            while self.undo.len() > self.limit {
                self.undo.pop_front();
            }
        }
        self.redo.clear();
        Ok(&self.current)
    }

    /// Step back one snapshot. Returns whether anything moved.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        let undone = std::mem::replace(&mut self.current, previous);
        self.redo.push(undone);
        true
    }

    /// Re-apply the last undone snapshot. Returns whether anything moved.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push_back(previous);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Give up the history and keep the current snapshot.
    pub fn into_current(self) -> Lexicon {
        self.current
    }
}
