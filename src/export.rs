//! JSON exchange format for whole dictionaries.
//!
//! A dictionary file is `{"words": [entry | null, ...]}`: the array index is
//! the entry id and `null` marks a deleted slot. Import accepts files written
//! by hand or by older tools and repairs what it can: dangling and self
//! references are dropped, one-sided links are completed, and shortcut edges
//! are pruned. A cyclic cover relation cannot be repaired without guessing
//! and rejects the import.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Lexicon;
use crate::entry::{CoverSide, Entry, WordId};
use crate::error::{ExchangeError, IntegrityWarning};
use crate::graph::cycle::find_cycle;
use crate::graph::reduce::reduce_all;
use crate::store::NodeStore;

/// Serialized form of a dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryFile {
    pub words: Vec<Option<Entry>>,
}

/// A successfully imported dictionary and the repairs applied to it.
#[derive(Debug, Clone)]
pub struct Imported {
    pub lexicon: Lexicon,
    pub warnings: Vec<IntegrityWarning>,
}

/// Snapshot `lex` into its exchange form.
pub fn export(lex: &Lexicon) -> DictionaryFile {
    DictionaryFile {
        words: lex.store().slots().map(|s| s.cloned()).collect(),
    }
}

/// Serialize `lex` as JSON.
pub fn to_json(lex: &Lexicon, pretty: bool) -> Result<String, ExchangeError> {
    let file = export(lex);
    let json = if pretty {
        serde_json::to_string_pretty(&file)?
    } else {
        serde_json::to_string(&file)?
    };
    Ok(json)
}

/// Parse and import a JSON dictionary.
pub fn from_json(text: &str) -> Result<Imported, ExchangeError> {
    let file: DictionaryFile = serde_json::from_str(text)?;
    import(file)
}

/// Build a consistent lexicon from `file`, repairing what can be repaired.
pub fn import(file: DictionaryFile) -> Result<Imported, ExchangeError> {
    let mut words = file.words;
    if let Some(last) = words.len().checked_sub(1) {
        if WordId::from_index(last).is_none() {
            return Err(ExchangeError::TooLarge { len: words.len() });
        }
    }
    for (index, slot) in words.iter().enumerate() {
        if let Some(entry) = slot {
            if entry.id.index() != index {
                return Err(ExchangeError::IdMismatch {
                    index,
                    id: entry.id,
                });
            }
        }
    }

    let mut warnings = drop_dangling(&mut words);
    warnings.extend(complete_links(&mut words));

    let mut store = NodeStore::from_slots(words);
    if let Some(cycle) = find_cycle(&store) {
        return Err(ExchangeError::Cyclic { cycle });
    }

    warnings.extend(
        reduce_all(&mut store)
            .into_iter()
            .map(|e| IntegrityWarning::RedundantEdgePruned {
                upper: e.upper,
                lower: e.lower,
            }),
    );

    for warning in &warnings {
        tracing::warn!(%warning, "repaired on import");
    }
    tracing::debug!(
        slots = store.len(),
        live = store.live_count(),
        repairs = warnings.len(),
        "imported dictionary"
    );

    Ok(Imported {
        lexicon: Lexicon::from_store(store),
        warnings,
    })
}

/// Read and import a dictionary file.
pub fn read_file(path: &Path) -> Result<Imported, ExchangeError> {
    let text = std::fs::read_to_string(path).map_err(|e| ExchangeError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    from_json(&text)
}

/// Write `lex` to a dictionary file.
pub fn write_file(path: &Path, lex: &Lexicon, pretty: bool) -> Result<(), ExchangeError> {
    let json = to_json(lex, pretty)?;
    std::fs::write(path, json).map_err(|e| ExchangeError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Remove cover references to missing slots, tombstones, and the entry itself.
fn drop_dangling(words: &mut [Option<Entry>]) -> Vec<IntegrityWarning> {
    let live: Vec<bool> = words.iter().map(Option::is_some).collect();
    let is_live = |id: WordId| live.get(id.index()).copied().unwrap_or(false);

    let mut warnings = Vec::new();
    for entry in words.iter_mut().flatten() {
        let from = entry.id;
        for side in [CoverSide::Upper, CoverSide::Lower] {
            entry.covers_mut(side).retain(|&target| {
                let keep = target != from && is_live(target);
                if !keep {
                    warnings.push(IntegrityWarning::DanglingReferenceDropped {
                        from,
                        target,
                        field: side.field_name(),
                    });
                }
                keep
            });
        }
    }
    warnings
}

/// Add the missing half of every link listed by only one endpoint.
///
/// Runs after [`drop_dangling`], so every listed partner is live.
fn complete_links(words: &mut [Option<Entry>]) -> Vec<IntegrityWarning> {
    let mut missing: Vec<(WordId, CoverSide, WordId)> = Vec::new();
    for entry in words.iter().flatten() {
        for side in [CoverSide::Upper, CoverSide::Lower] {
            for &partner in entry.covers(side) {
                let listed_back = words
                    .get(partner.index())
                    .and_then(Option::as_ref)
                    .is_some_and(|p| p.covers(side.opposite()).contains(&entry.id));
                if !listed_back {
                    missing.push((partner, side.opposite(), entry.id));
                }
            }
        }
    }

    let mut warnings = Vec::with_capacity(missing.len());
    for (holder, side, partner) in missing {
        if let Some(Some(entry)) = words.get_mut(holder.index()) {
            entry.covers_mut(side).insert(partner);
            let (upper, lower) = side.orient(holder, partner);
            warnings.push(IntegrityWarning::AsymmetricLinkRepaired { upper, lower });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MutationEngine;
    use serde_json::json;

    fn id(raw: u32) -> WordId {
        WordId::new(raw)
    }

    fn sample() -> Lexicon {
        let engine = MutationEngine::default();
        let c = engine.add_root(&Lexicon::new(), "動物").unwrap();
        let root = c.created.unwrap();
        let c = engine.add_word(&c.lexicon, root).unwrap();
        let cat = c.created.unwrap();
        let c = engine.add_word(&c.lexicon, root).unwrap();
        let dog = c.created.unwrap();
        let c = engine.delete_word(&c.lexicon, dog, None).unwrap();
        let c = engine.add_word(&c.lexicon, cat).unwrap();
        c.lexicon
    }

    #[test]
    fn export_keeps_tombstones_as_null() {
        let file = export(&sample());
        assert_eq!(file.words.len(), 4);
        assert!(file.words[2].is_none());
        let value = serde_json::to_value(&file).unwrap();
        assert!(value["words"][2].is_null());
        assert_eq!(value["words"][1]["lower_covers"], json!([3]));
    }

    #[test]
    fn round_trip_is_exact_and_silent() {
        let lex = sample();
        for pretty in [false, true] {
            let imported = from_json(&to_json(&lex, pretty).unwrap()).unwrap();
            assert!(imported.warnings.is_empty());
            assert_eq!(imported.lexicon.store(), lex.store());
        }
    }

    #[test]
    fn id_must_match_index() {
        let text = json!({"words": [{"id": 0}, {"id": 5}]}).to_string();
        assert!(matches!(
            from_json(&text),
            Err(ExchangeError::IdMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(from_json("{\"words\": 3}"), Err(ExchangeError::Json { .. })));
    }

    #[test]
    fn dangling_and_self_references_are_dropped() {
        let text = json!({"words": [
            {"id": 0, "lower_covers": [0, 1, 2, 9]},
            {"id": 1, "upper_covers": [0]},
            null
        ]})
        .to_string();
        let imported = from_json(&text).unwrap();
        let root = imported.lexicon.get_entry(id(0)).unwrap();
        assert_eq!(root.lower_covers.iter().copied().collect::<Vec<_>>(), vec![id(1)]);
        assert_eq!(imported.warnings.len(), 3);
        assert!(imported.warnings.contains(&IntegrityWarning::DanglingReferenceDropped {
            from: id(0),
            target: id(9),
            field: "lower_covers",
        }));
    }

    #[test]
    fn one_sided_links_are_completed() {
        let text = json!({"words": [
            {"id": 0, "lower_covers": [1]},
            {"id": 1}
        ]})
        .to_string();
        let imported = from_json(&text).unwrap();
        assert!(
            imported
                .lexicon
                .get_entry(id(1))
                .unwrap()
                .upper_covers
                .contains(&id(0))
        );
        assert_eq!(
            imported.warnings,
            vec![IntegrityWarning::AsymmetricLinkRepaired {
                upper: id(0),
                lower: id(1),
            }]
        );
    }

    #[test]
    fn cyclic_relation_is_rejected() {
        let text = json!({"words": [
            {"id": 0, "lower_covers": [1], "upper_covers": [1]},
            {"id": 1, "lower_covers": [0], "upper_covers": [0]}
        ]})
        .to_string();
        match from_json(&text) {
            Err(ExchangeError::Cyclic { cycle }) => assert_eq!(cycle.len(), 2),
            other => panic!("expected cyclic error, got {other:?}"),
        }
    }

    #[test]
    fn shortcut_edges_are_pruned() {
        let text = json!({"words": [
            {"id": 0, "lower_covers": [1, 2]},
            {"id": 1, "upper_covers": [0], "lower_covers": [2]},
            {"id": 2, "upper_covers": [0, 1]}
        ]})
        .to_string();
        let imported = from_json(&text).unwrap();
        assert_eq!(
            imported.warnings,
            vec![IntegrityWarning::RedundantEdgePruned {
                upper: id(0),
                lower: id(2),
            }]
        );
        assert!(imported.lexicon.store().has_edge(id(1), id(2)));
        assert!(!imported.lexicon.store().has_edge(id(0), id(2)));
    }
}
