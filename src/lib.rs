// Field references in thiserror format strings trip a false positive in the
// compiler's assignment analysis.
#![allow(unused_assignments)]

//! # hasse-lexicon
//!
//! A dictionary whose entries form a partially ordered set, stored as its
//! Hasse diagram: every entry lists only its immediate generalizations
//! (`upper_covers`) and immediate specializations (`lower_covers`).
//!
//! Every committed edit leaves the diagram acyclic, symmetric (each link is
//! listed on both endpoints), and minimal (no link implied by a longer
//! path). Edits that would break an invariant are rejected as values, never
//! applied halfway.
//!
//! ## Architecture
//!
//! - **Entries** (`entry`): ids, payload fields, field updates
//! - **Node store** (`store`): copy-on-write entry table with tombstones
//! - **Order maintenance** (`graph`): cycle detection, transitive reduction,
//!   link reconciliation, traversal, integrity audit
//! - **Engine** (`engine`): immutable snapshots and the mutation operations
//! - **History** (`history`): bounded undo/redo with stale-commit detection
//! - **Exchange** (`export`): `{"words": [...]}` JSON with repair on import
//! - **Config** (`config`): TOML settings
//!
//! ## Library usage
//!
//! ```
//! use hasse_lexicon::engine::{Lexicon, MutationEngine};
//! use hasse_lexicon::entry::FieldUpdate;
//!
//! let engine = MutationEngine::default();
//! let root = engine.add_root(&Lexicon::new(), "動物").unwrap();
//! let animals = root.created.unwrap();
//!
//! let cat = engine.add_word(&root.lexicon, animals).unwrap();
//! let id = cat.created.unwrap();
//! let named = engine
//!     .update_field(&cat.lexicon, id, FieldUpdate::Entry("ねこ".into()))
//!     .unwrap();
//!
//! assert_eq!(named.lexicon.ancestors_of(id), vec![id, animals]);
//! assert!(engine.verify(&named.lexicon).is_consistent());
//! ```

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod export;
pub mod graph;
pub mod history;
pub mod store;
