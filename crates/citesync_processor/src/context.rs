/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use citesync_core::{BibliographicDatabase, Style};

use crate::resolver::EntryResolver;

/// The active style and databases for one synchronization session.
///
/// Passed explicitly to every engine call; databases are searched in order.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub style: &'a Style,
    pub databases: &'a [&'a dyn BibliographicDatabase],
}

impl<'a> SyncContext<'a> {
    pub fn new(style: &'a Style, databases: &'a [&'a dyn BibliographicDatabase]) -> Self {
        Self { style, databases }
    }

    pub fn resolver(&self) -> EntryResolver<'a> {
        EntryResolver::new(self.databases)
    }
}
