/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Citation numbers for numeric styles.

use citesync_core::{CitationProperties, Style, UNDEFINED_CITATION_MARKER};
use indexmap::IndexMap;

use super::sorting::{EntryOrder, Sorter};
use crate::resolver::ResolvedEntry;

/// Number given to keys that could not be resolved.
pub const UNDEFINED_NUMBER: i32 = -1;

/// How numbers are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingOrder {
    /// In order of first citation in the document.
    ByPosition,
    /// In bibliography (author-year-title) order.
    ByBibliographyOrder,
}

impl NumberingOrder {
    pub fn for_style(style: &Style) -> Self {
        if style.is_sort_by_position {
            NumberingOrder::ByPosition
        } else {
            NumberingOrder::ByBibliographyOrder
        }
    }
}

/// Key to citation number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberMap {
    numbers: IndexMap<String, i32>,
}

impl NumberMap {
    /// The number for `key`, or [`UNDEFINED_NUMBER`].
    pub fn get(&self, key: &str) -> i32 {
        self.numbers.get(key).copied().unwrap_or(UNDEFINED_NUMBER)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Keys in number order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.numbers.keys().map(String::as_str)
    }

    fn push(&mut self, key: &str) {
        if !self.numbers.contains_key(key) {
            let next = self.numbers.len() as i32 + 1;
            self.numbers.insert(key.to_string(), next);
        }
    }
}

pub struct NumberAssigner;

impl NumberAssigner {
    /// Number keys in order of first appearance.
    ///
    /// `citations` must already be in document order, each with its entries
    /// in citation order.
    pub fn by_position<'s, 'e: 's, I>(citations: I) -> NumberMap
    where
        I: IntoIterator<Item = &'s [ResolvedEntry<'e>]>,
    {
        let mut map = NumberMap::default();
        for entries in citations {
            for entry in entries.iter().filter(|e| e.is_resolved()) {
                map.push(entry.key());
            }
        }
        map
    }

    /// Number keys by their position in the sorted bibliography.
    pub fn by_bibliography_order(entries: &[ResolvedEntry<'_>], sorter: &Sorter) -> NumberMap {
        let mut resolved: Vec<ResolvedEntry> =
            entries.iter().copied().filter(|e| e.is_resolved()).collect();
        sorter.sort(&mut resolved, EntryOrder::AuthorYearTitle);
        let mut map = NumberMap::default();
        for entry in &resolved {
            map.push(entry.key());
        }
        map
    }
}

/// Render a list of numbers without brackets.
///
/// Numbers are sorted; maximal runs of consecutive numbers at least
/// `MinimumGroupingCount` long collapse to `first<sep>last`. Undefined
/// numbers render as the undefined marker and sort first.
pub fn compress_numbers(numbers: &[i32], props: &CitationProperties) -> String {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let mut parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let first = sorted[i];
        if first <= 0 {
            parts.push(UNDEFINED_CITATION_MARKER.to_string());
            i += 1;
            continue;
        }
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[j] + 1 {
            j += 1;
        }
        let run = (j - i + 1) as i64;
        if run > 1 && props.minimum_grouping_count > 0 && run >= props.minimum_grouping_count {
            parts.push(format!(
                "{first}{}{}",
                props.grouped_numbers_separator, sorted[j]
            ));
        } else {
            parts.extend(sorted[i..=j].iter().map(|n| n.to_string()));
        }
        i = j + 1;
    }
    parts.join(&props.citation_separator)
}
