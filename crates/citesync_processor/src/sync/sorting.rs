/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use citesync_core::latex;
use citesync_core::{AuthorList, Style};

use crate::resolver::ResolvedEntry;

/// Comparator orders used for entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrder {
    AuthorYearTitle,
    YearAuthorTitle,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct SortFields {
    author: String,
    year: String,
    title: String,
}

pub struct Sorter<'a> {
    style: &'a Style,
}

impl<'a> Sorter<'a> {
    pub fn new(style: &'a Style) -> Self {
        Self { style }
    }

    /// Order used inside one multi-entry author-year citation.
    pub fn citation_order(&self) -> EntryOrder {
        if self.style.citation.multi_cite_chronological {
            EntryOrder::YearAuthorTitle
        } else {
            EntryOrder::AuthorYearTitle
        }
    }

    fn fields(&self, entry: &ResolvedEntry) -> SortFields {
        let props = &self.style.citation;
        let author = entry
            .field(&props.author_field)
            .map(|raw| {
                AuthorList::parse(&raw)
                    .iter()
                    .map(|a| latex::to_unicode(&a.last_first(false)).to_lowercase())
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();
        let year = entry
            .field(&props.year_field)
            .map(|y| latex::to_unicode(&y))
            .unwrap_or_default();
        let title = entry
            .field("title")
            .map(|t| latex::to_unicode(&t).to_lowercase())
            .unwrap_or_default();
        SortFields {
            author,
            year,
            title,
        }
    }

    /// The full sort key of `entry`: the two primary fields in `order`,
    /// then title, then citation key.
    fn sort_key(
        &self,
        entry: &ResolvedEntry,
        order: EntryOrder,
    ) -> (String, String, String, String) {
        let SortFields {
            author,
            year,
            title,
        } = self.fields(entry);
        let (first, second) = match order {
            EntryOrder::AuthorYearTitle => (author, year),
            EntryOrder::YearAuthorTitle => (year, author),
        };
        (first, second, title, entry.key().to_string())
    }

    /// Stable sort by the given order. Sort fields are computed once per
    /// entry.
    pub fn sort(&self, entries: &mut [ResolvedEntry<'_>], order: EntryOrder) {
        entries.sort_by_cached_key(|entry| self.sort_key(entry, order));
    }
}
