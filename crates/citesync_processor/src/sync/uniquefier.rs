/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Letter suffixes that tell apart entries whose markers would otherwise
//! be identical, as in `(Smith, 2005a; Smith, 2005b)`.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::marker::MarkerFormatter;
use crate::resolver::ResolvedEntry;

/// Key to uniquefier suffix. Keys without a clash are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniquefierMap {
    suffixes: IndexMap<String, String>,
}

impl UniquefierMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.suffixes.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.suffixes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One rendered position in a citation after grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedEntry<'e> {
    pub entry: ResolvedEntry<'e>,
    /// Combined suffix, e.g. `a,b` when two entries were folded together.
    pub uniquefier: Option<String>,
}

/// `a`..`z`, then `aa`, `ab`, ...
pub fn letter_suffix(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

pub struct UniquefierAssigner<'f> {
    formatter: &'f MarkerFormatter<'f>,
    separator: &'f str,
}

impl<'f> UniquefierAssigner<'f> {
    pub fn new(formatter: &'f MarkerFormatter<'f>, separator: &'f str) -> Self {
        Self {
            formatter,
            separator,
        }
    }

    /// Assign suffixes over all citations, given in document order.
    ///
    /// Keys are bucketed by their normalized marker; within a bucket of
    /// two or more keys, letters go out in order of first citation.
    pub fn assign<'s, 'e: 's, I>(&self, citations: I) -> UniquefierMap
    where
        I: IntoIterator<Item = &'s [ResolvedEntry<'e>]>,
    {
        let mut buckets: IndexMap<String, Vec<&'e str>> = IndexMap::new();
        let mut seen: HashSet<&'e str> = HashSet::new();
        for entries in citations {
            for entry in entries.iter().filter(|e| e.is_resolved()) {
                if seen.insert(entry.key()) {
                    buckets
                        .entry(self.formatter.normalized(entry))
                        .or_default()
                        .push(entry.key());
                }
            }
        }

        let mut map = UniquefierMap::default();
        for (normalized, keys) in buckets.iter().filter(|(_, keys)| keys.len() > 1) {
            tracing::debug!(marker = %normalized, keys = ?keys, "assigning uniquefiers");
            for (i, key) in keys.iter().enumerate() {
                map.suffixes.insert(key.to_string(), letter_suffix(i));
            }
        }
        map
    }

    /// Fold entries of one citation that share a normalized marker into
    /// the first of them, joining their suffixes.
    pub fn group<'e>(
        &self,
        entries: &[ResolvedEntry<'e>],
        map: &UniquefierMap,
    ) -> Vec<GroupedEntry<'e>> {
        let mut grouped: Vec<GroupedEntry<'e>> = Vec::new();
        let mut normalized: Vec<Option<String>> = Vec::new();

        for entry in entries {
            let Some(suffix) = map.get(entry.key()) else {
                grouped.push(GroupedEntry {
                    entry: *entry,
                    uniquefier: None,
                });
                normalized.push(None);
                continue;
            };
            let marker = self.formatter.normalized(entry);
            let target = normalized
                .iter()
                .position(|n| n.as_deref() == Some(marker.as_str()));
            match target {
                Some(index) => {
                    if let Some(existing) = grouped[index].uniquefier.as_mut() {
                        existing.push_str(self.separator);
                        existing.push_str(suffix);
                    }
                }
                None => {
                    grouped.push(GroupedEntry {
                        entry: *entry,
                        uniquefier: Some(suffix.to_string()),
                    });
                    normalized.push(Some(marker));
                }
            }
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citesync_core::{BibDatabase, BibEntry, BibliographicDatabase, Style};

    use crate::resolver::EntryResolver;

    #[test]
    fn test_letter_suffix() {
        assert_eq!(letter_suffix(0), "a");
        assert_eq!(letter_suffix(1), "b");
        assert_eq!(letter_suffix(25), "z");
        assert_eq!(letter_suffix(26), "aa");
        assert_eq!(letter_suffix(27), "ab");
        assert_eq!(letter_suffix(52), "ba");
    }

    fn db() -> BibDatabase {
        let smith = |key: &str, title: &str| {
            BibEntry::new(key, "article")
                .with_field("author", "Smith, John")
                .with_field("year", "2005")
                .with_field("title", title)
        };
        BibDatabase::new("db")
            .with_entry(smith("SmithX", "X"))
            .with_entry(smith("SmithY", "Y"))
            .with_entry(smith("SmithZ", "Z"))
            .with_entry(
                BibEntry::new("Jones", "article")
                    .with_field("author", "Jones, Ann")
                    .with_field("year", "2005"),
            )
    }

    #[test]
    fn test_assignment_follows_document_order() {
        let style = Style::from_jstyle("NAME\nt\nLAYOUT\ndefault=\\author\n").unwrap();
        let db = db();
        let dbs: Vec<&dyn BibliographicDatabase> = vec![&db];
        let resolver = EntryResolver::new(&dbs);
        let r = |k: &'static str| resolver.resolve_one(k);

        let citations = [
            vec![r("SmithY")],
            vec![r("Jones"), r("missing")],
            vec![r("SmithZ"), r("SmithY")],
        ];
        let formatter = MarkerFormatter::new(&style);
        let assigner = UniquefierAssigner::new(&formatter, ",");
        let map = assigner.assign(citations.iter().map(Vec::as_slice));

        assert_eq!(map.get("SmithY"), Some("a"));
        assert_eq!(map.get("SmithZ"), Some("b"));
        assert_eq!(map.get("SmithX"), None);
        assert_eq!(map.get("Jones"), None);
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_grouping_folds_suffixes() {
        let style = Style::from_jstyle("NAME\nt\nLAYOUT\ndefault=\\author\n").unwrap();
        let db = db();
        let dbs: Vec<&dyn BibliographicDatabase> = vec![&db];
        let resolver = EntryResolver::new(&dbs);
        let entries: Vec<_> = ["SmithX", "Jones", "SmithY"]
            .into_iter()
            .map(|k| resolver.resolve_one(k))
            .collect();

        let formatter = MarkerFormatter::new(&style);
        let assigner = UniquefierAssigner::new(&formatter, ",");
        let map = assigner.assign([entries.as_slice()]);
        let grouped = assigner.group(&entries, &map);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].entry.key(), "SmithX");
        assert_eq!(grouped[0].uniquefier.as_deref(), Some("a,b"));
        assert_eq!(grouped[1].entry.key(), "Jones");
        assert_eq!(grouped[1].uniquefier, None);
    }
}
