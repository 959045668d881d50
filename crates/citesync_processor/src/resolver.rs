/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Looking up cited keys across an ordered list of databases.

use std::fmt;

use citesync_core::{BibEntry, BibliographicDatabase};
use indexmap::IndexMap;

/// The outcome of looking up one key.
#[derive(Clone, Copy)]
pub enum ResolvedEntry<'a> {
    Resolved {
        entry: &'a BibEntry,
        database: &'a dyn BibliographicDatabase,
    },
    /// Found in no database; carries the key as written.
    Undefined(&'a str),
}

impl<'a> ResolvedEntry<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            ResolvedEntry::Resolved { entry, .. } => &entry.key,
            ResolvedEntry::Undefined(key) => key,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolvedEntry::Resolved { .. })
    }

    /// A field resolved through its database, following crossrefs and
    /// `/`-separated fallbacks. Always `None` for undefined entries.
    pub fn field(&self, chain: &str) -> Option<String> {
        match self {
            ResolvedEntry::Resolved { entry, database } => {
                database.resolved_field_chain(entry, chain)
            }
            ResolvedEntry::Undefined(_) => None,
        }
    }

    pub fn entry_type(&self) -> Option<&'a str> {
        match self {
            ResolvedEntry::Resolved { entry, .. } => Some(&entry.entry_type),
            ResolvedEntry::Undefined(_) => None,
        }
    }
}

impl fmt::Debug for ResolvedEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedEntry::Resolved { entry, database } => f
                .debug_struct("Resolved")
                .field("key", &entry.key)
                .field("database", &database.name())
                .finish(),
            ResolvedEntry::Undefined(key) => f.debug_tuple("Undefined").field(key).finish(),
        }
    }
}

impl PartialEq for ResolvedEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ResolvedEntry::Resolved { entry: a, database: da },
                ResolvedEntry::Resolved { entry: b, database: db },
            ) => std::ptr::eq(*a, *b) && da.name() == db.name(),
            (ResolvedEntry::Undefined(a), ResolvedEntry::Undefined(b)) => a == b,
            _ => false,
        }
    }
}

/// Resolves keys against databases in priority order; the first database
/// holding a key wins.
pub struct EntryResolver<'a> {
    databases: &'a [&'a dyn BibliographicDatabase],
}

impl<'a> EntryResolver<'a> {
    pub fn new(databases: &'a [&'a dyn BibliographicDatabase]) -> Self {
        Self { databases }
    }

    /// Resolve a single key.
    pub fn resolve_one(&self, key: &'a str) -> ResolvedEntry<'a> {
        self.databases
            .iter()
            .find_map(|db| {
                db.entry(key).map(|entry| ResolvedEntry::Resolved {
                    entry,
                    database: *db,
                })
            })
            .unwrap_or(ResolvedEntry::Undefined(key))
    }

    /// Resolve every key once. Repeated keys reuse the first result.
    pub fn resolve<I>(&self, keys: I) -> IndexMap<&'a str, ResolvedEntry<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolved = IndexMap::new();
        for key in keys {
            if !resolved.contains_key(key) {
                let entry = self.resolve_one(key);
                if !entry.is_resolved() {
                    tracing::debug!(key, "key not found in any database");
                }
                resolved.insert(key, entry);
            }
        }
        resolved
    }
}
