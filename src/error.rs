//! Rich diagnostic error types for the lexicon engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Edit rejections are values, never panics:
//! an operation that cannot commit anything returns a [`Rejection`] listing every
//! problem it found, and an operation that commits part of an edit carries the
//! dropped pieces alongside its [`IntegrityWarning`]s.

use miette::Diagnostic;
use thiserror::Error;

use crate::entry::WordId;

/// Top-level error type for the lexicon engine.
#[derive(Debug, Error, Diagnostic)]
pub enum LexiconError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] crate::config::ConfigError),
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("entry {id} does not exist (store holds {len} slots)")]
    #[diagnostic(
        code(lexicon::validation::out_of_range),
        help("Ids are slot indices. Use an id below {len}, or add the entry first.")
    )]
    OutOfRange { id: WordId, len: usize },

    #[error("entry {id} has been deleted")]
    #[diagnostic(
        code(lexicon::validation::tombstoned),
        help("Deleted ids are never reused. Link to a live entry instead.")
    )]
    Tombstoned { id: WordId },

    #[error("entry {id} cannot cover itself")]
    #[diagnostic(
        code(lexicon::validation::self_reference),
        help("Remove {id} from its own cover list.")
    )]
    SelfReference { id: WordId },
}

impl ValidationError {
    /// The offending id.
    pub fn id(&self) -> WordId {
        match self {
            ValidationError::OutOfRange { id, .. }
            | ValidationError::Tombstoned { id }
            | ValidationError::SelfReference { id } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle errors
// ---------------------------------------------------------------------------

/// A proposed edge `upper → lower` would make the order cyclic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("linking {upper} above {lower} would create a cycle")]
#[diagnostic(
    code(lexicon::cycle),
    help(
        "{upper} is already a specialization of {lower}. \
         Unlink the existing path first, or pick a different cover."
    )
)]
pub struct CycleError {
    pub upper: WordId,
    pub lower: WordId,
}

// ---------------------------------------------------------------------------
// Edit rejections
// ---------------------------------------------------------------------------

/// A single rejected piece of an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EditError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

impl EditError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, EditError::Cycle(_))
    }
}

/// An operation that committed nothing. The input snapshot is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("edit rejected: {} problem(s)", .errors.len())]
#[diagnostic(
    code(lexicon::rejected),
    help("The snapshot was left untouched. See the related diagnostics for each problem.")
)]
pub struct Rejection {
    #[related]
    pub errors: Vec<EditError>,
}

impl Rejection {
    pub fn new(errors: Vec<EditError>) -> Self {
        Self { errors }
    }

    pub fn single(error: impl Into<EditError>) -> Self {
        Self {
            errors: vec![error.into()],
        }
    }

    /// Whether any rejected piece was a cycle.
    pub fn has_cycle(&self) -> bool {
        self.errors.iter().any(EditError::is_cycle)
    }
}

// ---------------------------------------------------------------------------
// Integrity warnings
// ---------------------------------------------------------------------------

/// Non-fatal repair applied automatically while committing or importing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum IntegrityWarning {
    #[error("pruned redundant edge {upper} -> {lower}")]
    #[diagnostic(
        code(lexicon::integrity::redundant_edge),
        severity(Warning),
        help("{lower} is already below {upper} through another path.")
    )]
    RedundantEdgePruned { upper: WordId, lower: WordId },

    #[error("dropped reference from {from} to missing entry {target} in {field}")]
    #[diagnostic(
        code(lexicon::integrity::dangling_reference),
        severity(Warning)
    )]
    DanglingReferenceDropped {
        from: WordId,
        target: WordId,
        field: &'static str,
    },

    #[error("completed one-sided link {upper} -> {lower}")]
    #[diagnostic(
        code(lexicon::integrity::asymmetric_link),
        severity(Warning),
        help("Only one endpoint listed the link; the other endpoint now lists it too.")
    )]
    AsymmetricLinkRepaired { upper: WordId, lower: WordId },

    #[error("deleted {id} although {} surviving entr(ies) still covered it", .survivors.len())]
    #[diagnostic(
        code(lexicon::integrity::shared_descendant),
        severity(Warning),
        help("Delete with a reattachment target to keep shared descendants alive.")
    )]
    SharedDescendantRemoved { id: WordId, survivors: Vec<WordId> },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum StoreError {
    #[error("slot {id} has not been allocated (store holds {len} slots)")]
    #[diagnostic(
        code(lexicon::store::not_allocated),
        help("Call `allocate()` to reserve the slot before writing an entry into it.")
    )]
    NotAllocated { id: WordId, len: usize },

    #[error("store is full: no id left after {len} slots")]
    #[diagnostic(code(lexicon::store::exhausted))]
    Exhausted { len: usize },
}

// ---------------------------------------------------------------------------
// Exchange errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExchangeError {
    #[error("I/O error on {path}")]
    #[diagnostic(
        code(lexicon::exchange::io),
        help("Check that the file exists and that you have read/write permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dictionary JSON: {message}")]
    #[diagnostic(
        code(lexicon::exchange::json),
        help("The file must be an object of the form {{\"words\": [entry | null, ...]}}.")
    )]
    Json { message: String },

    #[error("entry at index {index} carries id {id}")]
    #[diagnostic(
        code(lexicon::exchange::id_mismatch),
        help("An entry's id must equal its position in the `words` array.")
    )]
    IdMismatch { index: usize, id: WordId },

    #[error("dictionary has more entries than ids: {len}")]
    #[diagnostic(code(lexicon::exchange::too_large))]
    TooLarge { len: usize },

    #[error("cover relation is cyclic: {cycle:?}")]
    #[diagnostic(
        code(lexicon::exchange::cyclic),
        help("Break the cycle in the source file by removing one of the listed links.")
    )]
    Cyclic { cycle: Vec<WordId> },
}

impl From<serde_json::Error> for ExchangeError {
    fn from(e: serde_json::Error) -> Self {
        ExchangeError::Json {
            message: e.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// History errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum HistoryError {
    #[error("commit is based on version {base} but the current version is {current}")]
    #[diagnostic(
        code(lexicon::history::stale_commit),
        help("Re-run the edit against the current snapshot.")
    )]
    StaleCommit { base: u64, current: u64 },
}

/// Convenience alias for functions returning lexicon results.
pub type LexiconResult<T> = std::result::Result<T, LexiconError>;
