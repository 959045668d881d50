/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Keeping a document's citation marks and bibliography in step with the
//! active style and databases.
//!
//! ## Refresh
//!
//! A refresh reads every citation mark, resolves each cited key once,
//! computes the marker text for every mark and then writes everything back
//! in one pass, followed by the bibliography. Reads and checks all happen
//! before the first write, so a refresh that fails on a missing character
//! format leaves the document as it was.
//!
//! ## Author caps and uniquefiers
//!
//! Entries that share a normalized marker inside one citation are grouped
//! first (`Smith, 2005a,b`). The first-appearance author cap is applied
//! afterwards, to whichever entry survives the grouping.

pub mod bibliography;
pub mod marker;
pub mod merge;
pub mod numbering;
pub mod sorting;
pub mod uniquefier;

#[cfg(test)]
mod tests;

use std::collections::HashSet;

use citesync_core::{CitationType, MarkName, Style};
use indexmap::IndexMap;
use serde::Serialize;

use crate::context::SyncContext;
use crate::document::{BibliographySection, DocumentAnchorStore, MarkAnchor, MarkPosition};
use crate::error::SyncError;
use crate::resolver::ResolvedEntry;
use bibliography::BibliographyBuilder;
use marker::{CitationMode, MarkerFormatter};
use merge::MergeEngine;
use numbering::{NumberAssigner, NumberingOrder};
use sorting::Sorter;
use uniquefier::{UniquefierAssigner, UniquefierMap};

/// Marker inserted for numeric citations until the next refresh numbers it.
pub const PROVISIONAL_NUMERIC_MARKER: &str = "-";

/// A citation mark found in the document, with everything derived from
/// its name.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationMark {
    pub name: String,
    pub mark: MarkName,
    pub position: MarkPosition,
}

/// What a refresh did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RefreshReport {
    /// Keys found in no database, each listed once, in document order.
    pub unresolved_keys: Vec<String>,
    /// Final marker text per mark name, in document order.
    pub markers: IndexMap<String, String>,
    /// Number of entries written to the bibliography.
    pub bibliography_entries: usize,
}

/// What `insert_citation` did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InsertOutcome {
    pub mark_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<RefreshReport>,
}

/// What `merge_citations` did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MergeOutcome {
    /// Number of pairwise merges performed.
    pub merged: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<RefreshReport>,
}

/// Every citation mark in document order.
///
/// Names that don't follow the mark grammar are skipped. Keys repeated
/// within one mark are kept once.
pub fn citation_marks<D>(document: &D) -> Result<Vec<CitationMark>, SyncError>
where
    D: DocumentAnchorStore + ?Sized,
{
    let mut marks = Vec::new();
    for name in document.mark_names()? {
        let mut mark = match MarkName::parse(&name) {
            Ok(mark) => mark,
            Err(err) => {
                tracing::warn!(%err, "skipping mark");
                continue;
            }
        };
        let mut seen = HashSet::new();
        mark.keys.retain(|k| seen.insert(k.clone()));
        let position = document.mark_position(&name)?;
        marks.push(CitationMark {
            name,
            mark,
            position,
        });
    }
    marks.sort_by(|a, b| a.position.cmp(&b.position));
    Ok(marks)
}

/// Distinct keys cited anywhere in the document, in the order the marks
/// are enumerated.
pub fn cited_keys<D>(document: &D) -> Result<Vec<String>, SyncError>
where
    D: DocumentAnchorStore + ?Sized,
{
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for name in document.mark_names()? {
        let Ok(mark) = MarkName::parse(&name) else {
            continue;
        };
        for key in mark.keys {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }
    Ok(keys)
}

/// Fail unless the character format the style wants for citations exists.
pub fn check_character_format<D>(document: &D, style: &Style) -> Result<(), SyncError>
where
    D: DocumentAnchorStore + ?Sized,
{
    let props = &style.citation;
    if props.format_citations && !document.has_character_format(&props.citation_character_format)? {
        return Err(SyncError::UndefinedCharacterFormat(
            props.citation_character_format.clone(),
        ));
    }
    Ok(())
}

/// Resolution results for one pass over the document's marks.
struct Analysis<'m> {
    /// Every cited key, in order of first citation.
    resolved: IndexMap<&'m str, ResolvedEntry<'m>>,
    /// One entry list per mark, parallel to the marks.
    citations: Vec<Vec<ResolvedEntry<'m>>>,
    uniquefiers: UniquefierMap,
}

impl<'m> Analysis<'m> {
    fn new(context: SyncContext<'m>, marks: &'m [CitationMark]) -> Self {
        let style = context.style;
        let resolver = context.resolver();
        let resolved = resolver.resolve(
            marks
                .iter()
                .flat_map(|m| m.mark.keys.iter().map(String::as_str)),
        );

        let mut citations: Vec<Vec<ResolvedEntry<'m>>> = marks
            .iter()
            .map(|m| {
                m.mark
                    .keys
                    .iter()
                    .map(|k| {
                        resolved
                            .get(k.as_str())
                            .copied()
                            .unwrap_or(ResolvedEntry::Undefined(k))
                    })
                    .collect()
            })
            .collect();

        let author_year = !style.is_numeric() && !style.citation.bibtex_key_citations;
        let uniquefiers = if author_year {
            let sorter = Sorter::new(style);
            for entries in &mut citations {
                sorter.sort(entries, sorter.citation_order());
            }
            let formatter = MarkerFormatter::new(style);
            UniquefierAssigner::new(&formatter, &style.citation.uniquefier_separator)
                .assign(citations.iter().map(Vec::as_slice))
        } else {
            UniquefierMap::default()
        };

        Self {
            resolved,
            citations,
            uniquefiers,
        }
    }

    fn unresolved_keys(&self) -> Vec<String> {
        self.resolved
            .values()
            .filter(|e| !e.is_resolved())
            .map(|e| e.key().to_string())
            .collect()
    }

    fn cited_entries(&self) -> Vec<ResolvedEntry<'m>> {
        self.resolved.values().copied().collect()
    }

    /// Raw marker text for every mark, before page info.
    fn markers(&self, style: &Style, marks: &[CitationMark]) -> Vec<String> {
        let formatter = MarkerFormatter::new(style);
        let props = &style.citation;

        if props.bibtex_key_citations {
            return marks
                .iter()
                .map(|m| {
                    let keys: Vec<&str> = m.mark.keys.iter().map(String::as_str).collect();
                    formatter.key_list(&keys)
                })
                .collect();
        }

        if style.is_numeric() {
            let numbers = match NumberingOrder::for_style(style) {
                NumberingOrder::ByPosition => {
                    NumberAssigner::by_position(self.citations.iter().map(Vec::as_slice))
                }
                NumberingOrder::ByBibliographyOrder => NumberAssigner::by_bibliography_order(
                    &self.cited_entries(),
                    &Sorter::new(style),
                ),
            };
            return self
                .citations
                .iter()
                .map(|entries| {
                    let cited: Vec<i32> = entries.iter().map(|e| numbers.get(e.key())).collect();
                    formatter.numeric(&cited, false)
                })
                .collect();
        }

        let assigner = UniquefierAssigner::new(&formatter, &props.uniquefier_separator);
        let mut seen: HashSet<&str> = HashSet::new();
        marks
            .iter()
            .zip(&self.citations)
            .map(|(mark, entries)| {
                let grouped = assigner.group(entries, &self.uniquefiers);
                let caps: Vec<Option<i64>> = grouped
                    .iter()
                    .map(|g| {
                        (props.max_authors_first > 0 && !seen.contains(g.entry.key()))
                            .then_some(props.max_authors_first)
                    })
                    .collect();
                seen.extend(entries.iter().map(|e| e.key()));

                let rendered: Vec<ResolvedEntry> = grouped.iter().map(|g| g.entry).collect();
                let suffixes: Vec<Option<String>> =
                    grouped.into_iter().map(|g| g.uniquefier).collect();
                formatter.format(&rendered, CitationMode::from(mark.mark.kind), &suffixes, &caps)
            })
            .collect()
    }
}

/// Drives refresh, insertion and merging against one document.
pub struct SyncController<'a, D: DocumentAnchorStore + ?Sized> {
    document: &'a mut D,
    context: SyncContext<'a>,
}

impl<'a, D: DocumentAnchorStore + ?Sized> SyncController<'a, D> {
    pub fn new(document: &'a mut D, context: SyncContext<'a>) -> Self {
        Self { document, context }
    }

    /// Recompute every citation marker and rebuild the bibliography.
    pub fn refresh(&mut self) -> Result<RefreshReport, SyncError> {
        let context = self.context;
        let style = context.style;
        let marks = citation_marks(&*self.document)?;
        check_character_format(&*self.document, style)?;

        let analysis = Analysis::new(context, &marks);
        let formatter = MarkerFormatter::new(style);
        let raw = analysis.markers(style, &marks);

        let mut markers: IndexMap<String, String> = IndexMap::new();
        for (mark, marker) in marks.iter().zip(raw) {
            let text = if mark.mark.kind == CitationType::Invisible {
                String::new()
            } else {
                match self.document.page_info(&mark.name)? {
                    Some(info) => formatter.insert_page_info(&marker, &info),
                    None => marker,
                }
            };
            markers.insert(mark.name.clone(), text);
        }

        for (name, text) in &markers {
            self.document
                .set_mark_text(name, &formatter.citation_text(text.clone()))?;
        }

        let section = BibliographyBuilder::new(style)
            .build(&analysis.cited_entries(), &analysis.uniquefiers);
        let bibliography_entries = section.entries.len();
        self.write_bibliography(&section)?;

        let unresolved_keys = analysis.unresolved_keys();
        if !unresolved_keys.is_empty() {
            tracing::warn!(keys = ?unresolved_keys, "cited keys not found in any database");
        }
        tracing::info!(
            marks = markers.len(),
            entries = bibliography_entries,
            "refreshed citations"
        );
        Ok(RefreshReport {
            unresolved_keys,
            markers,
            bibliography_entries,
        })
    }

    /// Rebuild only the bibliography section. Returns the entry count.
    pub fn rebuild_bibliography(&mut self) -> Result<usize, SyncError> {
        let context = self.context;
        let marks = citation_marks(&*self.document)?;
        let analysis = Analysis::new(context, &marks);
        let section = BibliographyBuilder::new(context.style)
            .build(&analysis.cited_entries(), &analysis.uniquefiers);
        self.write_bibliography(&section)?;
        Ok(section.entries.len())
    }

    fn write_bibliography(&mut self, section: &BibliographySection) -> Result<(), SyncError> {
        self.document.clear_bibliography()?;
        self.document.insert_bibliography(section)?;
        Ok(())
    }

    /// Insert a citation of `keys` at the cursor.
    ///
    /// With `sync`, a full refresh follows; otherwise the new mark holds a
    /// provisional marker until the next refresh.
    pub fn insert_citation(
        &mut self,
        keys: &[&str],
        kind: CitationType,
        page_info: Option<&str>,
        sync: bool,
    ) -> Result<InsertOutcome, SyncError> {
        let context = self.context;
        let style = context.style;
        let props = &style.citation;

        let mut seen = HashSet::new();
        let keys: Vec<&str> = keys.iter().copied().filter(|k| seen.insert(*k)).collect();
        if keys.is_empty() {
            return Err(SyncError::EmptyCitation);
        }

        let resolver = context.resolver();
        let mut entries: Vec<ResolvedEntry> = keys.iter().map(|k| resolver.resolve_one(*k)).collect();
        let author_year = !style.is_numeric() && !props.bibtex_key_citations;
        if author_year && entries.len() > 1 {
            let sorter = Sorter::new(style);
            sorter.sort(&mut entries, sorter.citation_order());
        }
        let ordered: Vec<String> = entries.iter().map(|e| e.key().to_string()).collect();

        let taken: HashSet<String> = self.document.mark_names()?.into_iter().collect();
        let name = MarkName::unique(kind, ordered, |n| taken.contains(n)).to_string();

        check_character_format(&*self.document, style)?;

        let formatter = MarkerFormatter::new(style);
        let page_info = page_info.map(str::trim).filter(|p| !p.is_empty());
        let text = if kind == CitationType::Invisible {
            String::new()
        } else {
            let marker = if props.bibtex_key_citations {
                formatter.key_list(&keys)
            } else if style.is_numeric() {
                PROVISIONAL_NUMERIC_MARKER.to_string()
            } else {
                formatter.format(&entries, CitationMode::from(kind), &[], &[])
            };
            match page_info {
                Some(info) => formatter.insert_page_info(&marker, info),
                None => marker,
            }
        };

        self.document
            .create_mark(&name, &formatter.citation_text(text), MarkAnchor::Cursor)?;
        if let Some(info) = page_info {
            self.document.set_page_info(&name, Some(info))?;
        }
        tracing::debug!(mark = %name, "inserted citation");

        let refresh = if sync { Some(self.refresh()?) } else { None };
        Ok(InsertOutcome {
            mark_name: name,
            refresh,
        })
    }

    /// Delete the citation mark `name` along with its page info.
    ///
    /// Remaining numbers and uniquefiers may be stale afterwards; `sync`
    /// runs a refresh.
    pub fn remove_citation(
        &mut self,
        name: &str,
        sync: bool,
    ) -> Result<Option<RefreshReport>, SyncError> {
        self.document.delete_mark(name)?;
        self.document.set_page_info(name, None)?;
        tracing::debug!(mark = %name, "removed citation");
        if sync {
            Ok(Some(self.refresh()?))
        } else {
            Ok(None)
        }
    }

    /// Distinct keys cited anywhere in the document.
    pub fn cited_keys(&self) -> Result<Vec<String>, SyncError> {
        cited_keys(&*self.document)
    }

    /// Merge neighbouring citations separated only by spaces, then refresh
    /// if anything was merged.
    pub fn merge_citations(&mut self) -> Result<MergeOutcome, SyncError> {
        let merged = MergeEngine::new(&mut *self.document, self.context.style).merge()?;
        let refresh = if merged > 0 {
            Some(self.refresh()?)
        } else {
            None
        };
        Ok(MergeOutcome { merged, refresh })
    }
}
