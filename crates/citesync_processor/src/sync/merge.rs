/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Joining neighbouring citations into one.
//!
//! Two marks next to each other in the same text flow, with nothing but
//! spaces between them, become a single mark citing the keys of both.
//! Numbers and uniquefiers are stale afterwards; callers refresh.

use std::collections::HashSet;

use citesync_core::{MarkName, Style};

use super::{check_character_format, citation_marks, CitationMark};
use crate::document::{CitationText, DocumentAnchorStore, MarkAnchor};
use crate::error::SyncError;

pub struct MergeEngine<'d, D: DocumentAnchorStore + ?Sized> {
    document: &'d mut D,
    style: &'d Style,
}

/// Text between two marks that allows merging them.
fn is_mergeable_gap(between: Option<&str>) -> bool {
    between.is_some_and(|text| {
        !text.is_empty() && !text.contains('\n') && text.chars().all(char::is_whitespace)
    })
}

impl<'d, D: DocumentAnchorStore + ?Sized> MergeEngine<'d, D> {
    pub fn new(document: &'d mut D, style: &'d Style) -> Self {
        Self { document, style }
    }

    /// Merge every run of adjacent citations. Returns the number of
    /// pairwise merges.
    pub fn merge(&mut self) -> Result<usize, SyncError> {
        check_character_format(&*self.document, self.style)?;
        let mut marks = citation_marks(&*self.document)?;

        let mut merged = 0;
        let mut i = 0;
        while i + 1 < marks.len() {
            let between = self
                .document
                .text_between(&marks[i].name, &marks[i + 1].name)?;
            if !is_mergeable_gap(between.as_deref()) {
                i += 1;
                continue;
            }
            let replacement = self.merge_pair(&marks[i], &marks[i + 1])?;
            marks[i] = replacement;
            marks.remove(i + 1);
            merged += 1;
        }

        if merged > 0 {
            tracing::info!(merged, "merged adjacent citations");
        }
        Ok(merged)
    }

    fn merge_pair(
        &mut self,
        first: &CitationMark,
        second: &CitationMark,
    ) -> Result<CitationMark, SyncError> {
        let mut keys = first.mark.keys.clone();
        for key in &second.mark.keys {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }

        let taken: HashSet<String> = self.document.mark_names()?.into_iter().collect();
        let mark = MarkName::unique(first.mark.kind, keys, |n| taken.contains(n));
        let name = mark.to_string();

        let page_info = match self.document.page_info(&first.name)? {
            Some(info) => Some(info),
            None => self.document.page_info(&second.name)?,
        };

        tracing::debug!(first = %first.name, second = %second.name, merged = %name, "merging");
        self.document.create_mark(
            &name,
            &CitationText::default(),
            MarkAnchor::Covering {
                first: first.name.clone(),
                last: second.name.clone(),
            },
        )?;
        self.document.set_page_info(&first.name, None)?;
        self.document.set_page_info(&second.name, None)?;
        if let Some(info) = page_info {
            self.document.set_page_info(&name, Some(&info))?;
        }

        Ok(CitationMark {
            name,
            mark,
            position: first.position,
        })
    }
}
