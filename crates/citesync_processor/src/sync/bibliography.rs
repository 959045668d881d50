/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Building the reference list for the cited entries.

use citesync_core::Style;

use super::marker::MarkerFormatter;
use super::sorting::{EntryOrder, Sorter};
use super::uniquefier::UniquefierMap;
use crate::document::{BibliographyParagraph, BibliographySection};
use crate::resolver::ResolvedEntry;

pub struct BibliographyBuilder<'a> {
    style: &'a Style,
}

impl<'a> BibliographyBuilder<'a> {
    pub fn new(style: &'a Style) -> Self {
        Self { style }
    }

    /// Build the section for `cited`, given in order of first citation.
    ///
    /// Unresolved entries are left out. Numeric styles label entries
    /// `1`, `2`, ... in the order they are listed.
    pub fn build(&self, cited: &[ResolvedEntry], uniquefiers: &UniquefierMap) -> BibliographySection {
        let mut entries: Vec<ResolvedEntry> =
            cited.iter().copied().filter(|e| e.is_resolved()).collect();
        if !self.style.is_sort_by_position {
            Sorter::new(self.style).sort(&mut entries, EntryOrder::AuthorYearTitle);
        }

        let formatter = MarkerFormatter::new(self.style);
        let paragraphs = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = self
                    .style
                    .is_numeric()
                    .then(|| formatter.numeric(&[i as i32 + 1], true));
                BibliographyParagraph {
                    key: entry.key().to_string(),
                    label,
                    text: self.render_entry(entry, uniquefiers.get(entry.key())),
                }
            })
            .collect();

        BibliographySection {
            title: self.style.title.clone(),
            header_format: self.style.reference_header_paragraph_format.clone(),
            paragraph_format: self.style.reference_paragraph_format.clone(),
            entries: paragraphs,
        }
    }

    fn render_entry(&self, entry: &ResolvedEntry, uniquefier: Option<&str>) -> String {
        let entry_type = entry.entry_type().unwrap_or("default");
        let Some(layout) = self.style.layout_for(entry_type) else {
            tracing::warn!(key = entry.key(), entry_type, "no layout for entry type");
            return entry.key().to_string();
        };
        let lookup = |name: &str| -> Option<String> {
            match name.to_lowercase().as_str() {
                "uniq" => uniquefier.map(str::to_string),
                "bibtexkey" | "citationkey" => Some(entry.key().to_string()),
                "entrytype" => Some(entry_type.to_string()),
                field => entry.field(field),
            }
        };
        layout.render(&lookup)
    }
}
