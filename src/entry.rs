//! Core entry types for the dictionary.
//!
//! Every headword in the dictionary is an [`Entry`] identified by a
//! [`WordId`]. The id doubles as the entry's slot index in the
//! [`NodeStore`](crate::store::NodeStore), so it is assigned once and never
//! reused, even after the entry is deleted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of a dictionary entry.
///
/// Serialized as a bare integer so that exported files keep the
/// `"upper_covers": [3, 17]` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordId(u32);

impl WordId {
    /// Create a `WordId` from a raw integer.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the underlying integer value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Slot index of this id in the node store.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Build an id from a slot index.
    ///
    /// Returns `None` if the index does not fit the id space.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for WordId {
    type Err = std::num::ParseIntError;

    /// Accepts `17` as well as the display form `#17`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix('#').unwrap_or(s).parse().map(Self)
    }
}

impl From<u32> for WordId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// A titled block of free text (used for `contents` and `variations`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Heading, or the kind of variation.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub text: String,
}

impl ContentBlock {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A single dictionary entry: one element of the poset.
///
/// `upper_covers` and `lower_covers` define the order. All other fields are
/// payload the engine never inspects, except `category` and `entry` when a
/// child is created under a category root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Immutable identity, equal to the slot index.
    pub id: WordId,
    /// Headword text.
    #[serde(default)]
    pub entry: String,
    #[serde(default)]
    pub translations: Vec<String>,
    #[serde(default)]
    pub simple_translations: Vec<String>,
    #[serde(default)]
    pub category: String,
    /// Immediate generalizations.
    #[serde(default)]
    pub upper_covers: BTreeSet<WordId>,
    /// Immediate specializations.
    #[serde(default)]
    pub lower_covers: BTreeSet<WordId>,
    /// Cross references to argument entries. Not part of the order.
    #[serde(default)]
    pub arguments: Vec<WordId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
    #[serde(default)]
    pub variations: Vec<ContentBlock>,
    #[serde(default)]
    pub is_function: bool,
}

impl Entry {
    /// Create an entry with blank fields and no links.
    pub fn blank(id: WordId) -> Self {
        Self {
            id,
            entry: String::new(),
            translations: Vec::new(),
            simple_translations: Vec::new(),
            category: String::new(),
            upper_covers: BTreeSet::new(),
            lower_covers: BTreeSet::new(),
            arguments: Vec::new(),
            tags: Vec::new(),
            contents: Vec::new(),
            variations: Vec::new(),
            is_function: false,
        }
    }

    /// Set the headword.
    pub fn with_headword(mut self, headword: impl Into<String>) -> Self {
        self.entry = headword.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// The cover set on the given side.
    pub fn covers(&self, side: CoverSide) -> &BTreeSet<WordId> {
        match side {
            CoverSide::Upper => &self.upper_covers,
            CoverSide::Lower => &self.lower_covers,
        }
    }

    /// Mutable access to the cover set on the given side.
    pub fn covers_mut(&mut self, side: CoverSide) -> &mut BTreeSet<WordId> {
        match side {
            CoverSide::Upper => &mut self.upper_covers,
            CoverSide::Lower => &mut self.lower_covers,
        }
    }

    /// Whether this entry is a root under the given category marker.
    pub fn is_category_root(&self, marker: &str) -> bool {
        self.category == marker
    }
}

/// One side of an entry's cover relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverSide {
    /// `upper_covers`: immediate generalizations.
    Upper,
    /// `lower_covers`: immediate specializations.
    Lower,
}

impl CoverSide {
    /// The side that holds the reciprocal id on the neighbor.
    pub fn opposite(self) -> Self {
        match self {
            CoverSide::Upper => CoverSide::Lower,
            CoverSide::Lower => CoverSide::Upper,
        }
    }

    /// Orient an edge between `this` entry and a `partner` listed on this side
    /// as `(upper, lower)`.
    pub fn orient(self, this: WordId, partner: WordId) -> (WordId, WordId) {
        match self {
            CoverSide::Upper => (partner, this),
            CoverSide::Lower => (this, partner),
        }
    }

    /// Field name as it appears in the exchange format.
    pub fn field_name(self) -> &'static str {
        match self {
            CoverSide::Upper => "upper_covers",
            CoverSide::Lower => "lower_covers",
        }
    }
}

impl std::fmt::Display for CoverSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl std::str::FromStr for CoverSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" | "upper_covers" => Ok(CoverSide::Upper),
            "lower" | "lower_covers" => Ok(CoverSide::Lower),
            other => Err(format!("unknown cover side: {other}")),
        }
    }
}

/// A replacement value for one entry field.
///
/// The cover variants are routed through the link reconciler; every other
/// variant is a plain field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Entry(String),
    Translations(Vec<String>),
    SimpleTranslations(Vec<String>),
    Category(String),
    Tags(Vec<String>),
    Contents(Vec<ContentBlock>),
    Variations(Vec<ContentBlock>),
    Arguments(Vec<WordId>),
    IsFunction(bool),
    UpperCovers(Vec<WordId>),
    LowerCovers(Vec<WordId>),
}

impl FieldUpdate {
    /// Field name as it appears in the exchange format.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Entry(_) => "entry",
            FieldUpdate::Translations(_) => "translations",
            FieldUpdate::SimpleTranslations(_) => "simple_translations",
            FieldUpdate::Category(_) => "category",
            FieldUpdate::Tags(_) => "tags",
            FieldUpdate::Contents(_) => "contents",
            FieldUpdate::Variations(_) => "variations",
            FieldUpdate::Arguments(_) => "arguments",
            FieldUpdate::IsFunction(_) => "is_function",
            FieldUpdate::UpperCovers(_) => "upper_covers",
            FieldUpdate::LowerCovers(_) => "lower_covers",
        }
    }

    /// The cover side this update edits, if it is an order update.
    pub fn cover_side(&self) -> Option<CoverSide> {
        match self {
            FieldUpdate::UpperCovers(_) => Some(CoverSide::Upper),
            FieldUpdate::LowerCovers(_) => Some(CoverSide::Lower),
            _ => None,
        }
    }

    /// Write a non-order value into `entry`.
    ///
    /// A cover update is not applied; its side and desired ids come back as
    /// the error, for the caller to hand to the reconciler.
    pub(crate) fn apply_payload(self, entry: &mut Entry) -> Result<(), (CoverSide, Vec<WordId>)> {
        match self {
            FieldUpdate::Entry(v) => entry.entry = v,
            FieldUpdate::Translations(v) => entry.translations = v,
            FieldUpdate::SimpleTranslations(v) => entry.simple_translations = v,
            FieldUpdate::Category(v) => entry.category = v,
            FieldUpdate::Tags(v) => entry.tags = v,
            FieldUpdate::Contents(v) => entry.contents = v,
            FieldUpdate::Variations(v) => entry.variations = v,
            FieldUpdate::Arguments(v) => entry.arguments = v,
            FieldUpdate::IsFunction(v) => entry.is_function = v,
            FieldUpdate::UpperCovers(ids) => return Err((CoverSide::Upper, ids)),
            FieldUpdate::LowerCovers(ids) => return Err((CoverSide::Lower, ids)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_id_parse_accepts_hash_prefix() {
        assert_eq!("17".parse::<WordId>().unwrap(), WordId::new(17));
        assert_eq!("#17".parse::<WordId>().unwrap(), WordId::new(17));
        assert_eq!(" 4 ".parse::<WordId>().unwrap(), WordId::new(4));
        assert!("x".parse::<WordId>().is_err());
        assert!("".parse::<WordId>().is_err());
    }

    #[test]
    fn word_id_display() {
        assert_eq!(WordId::new(42).to_string(), "#42");
    }

    #[test]
    fn entry_deserializes_with_missing_fields() {
        let e: Entry = serde_json::from_str(r#"{"id": 3, "entry": "ねこ", "upper_covers": [1]}"#)
            .unwrap();
        assert_eq!(e.id, WordId::new(3));
        assert_eq!(e.entry, "ねこ");
        assert!(e.upper_covers.contains(&WordId::new(1)));
        assert!(e.lower_covers.is_empty());
        assert!(!e.is_function);
    }

    #[test]
    fn covers_serialize_as_sorted_arrays() {
        let mut e = Entry::blank(WordId::new(0));
        e.lower_covers.insert(WordId::new(9));
        e.lower_covers.insert(WordId::new(2));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["lower_covers"], serde_json::json!([2, 9]));
    }

    #[test]
    fn orient_puts_upper_first() {
        let this = WordId::new(1);
        let partner = WordId::new(2);
        assert_eq!(CoverSide::Upper.orient(this, partner), (partner, this));
        assert_eq!(CoverSide::Lower.orient(this, partner), (this, partner));
    }

    #[test]
    fn cover_side_parse() {
        assert_eq!("upper".parse::<CoverSide>().unwrap(), CoverSide::Upper);
        assert_eq!("lower_covers".parse::<CoverSide>().unwrap(), CoverSide::Lower);
        assert!("sideways".parse::<CoverSide>().is_err());
    }

    #[test]
    fn cover_updates_are_not_applied_as_payload() {
        let mut e = Entry::blank(WordId::new(0));
        let update = FieldUpdate::UpperCovers(vec![WordId::new(1)]);
        assert_eq!(
            update.apply_payload(&mut e),
            Err((CoverSide::Upper, vec![WordId::new(1)]))
        );
        assert!(e.upper_covers.is_empty());

        FieldUpdate::Entry("いぬ".into()).apply_payload(&mut e).unwrap();
        assert_eq!(e.entry, "いぬ");
    }
}
