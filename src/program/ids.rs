//! Category id lists as they arrive from configuration.
//!
//! A list setting may be a delimited string (`"161|193"`), a single integer,
//! or a sequence whose entries are integers, numeric strings, or tables with
//! an `id` key. Parsing is total: any token that is not a positive integer is
//! dropped and the rest of the list survives.
use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Separators accepted inside a delimited list string.
const DELIMITERS: &[char] = &['|', ','];

/// An ordered set of positive category ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIdSet(BTreeSet<i64>);

impl CategoryIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a delimited list string. Malformed tokens are skipped.
    pub fn parse(raw: &str) -> Self {
        raw.split(DELIMITERS).filter_map(parse_token).collect()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for CategoryIdSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|id| *id > 0).collect())
    }
}

fn parse_token(token: &str) -> Option<i64> {
    let id = token.trim().parse::<i64>().ok()?;
    (id > 0).then_some(id)
}

// ============================================================================
// Deserialization
// ============================================================================

// Every enum below ends in an `IgnoredAny` arm so that no input shape can
// make deserialization fail.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Delimited(String),
    Single(i64),
    Sequence(Vec<RawEntry>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Record { id: RawScalar },
    Number(i64),
    Text(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Number(i64),
    Text(String),
    Other(IgnoredAny),
}

impl RawScalar {
    fn id(self) -> Option<i64> {
        match self {
            RawScalar::Number(id) => (id > 0).then_some(id),
            RawScalar::Text(text) => parse_token(&text),
            RawScalar::Other(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for CategoryIdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let set = match RawList::deserialize(deserializer)? {
            RawList::Delimited(raw) => Self::parse(&raw),
            RawList::Single(id) => std::iter::once(id).collect(),
            RawList::Sequence(entries) => entries
                .into_iter()
                .filter_map(|entry| match entry {
                    RawEntry::Record { id } => id.id(),
                    RawEntry::Number(id) => (id > 0).then_some(id),
                    RawEntry::Text(text) => parse_token(&text),
                    RawEntry::Other(_) => None,
                })
                .collect(),
            RawList::Other(_) => {
                tracing::warn!("Unrecognised category list setting, treating it as empty");
                Self::default()
            }
        };
        Ok(set)
    }
}
