/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use citesync_core::{BibError, StyleError};
use thiserror::Error;

/// Failures reported by a document backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("connection to the document was lost")]
    ConnectionLost,

    #[error("no mark named '{0}'")]
    NoSuchMark(String),

    #[error("a mark named '{0}' already exists")]
    DuplicateMark(String),

    #[error("{0}")]
    Other(String),
}

/// Errors from synchronizing a document.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("character format '{0}' is not defined in the document")]
    UndefinedCharacterFormat(String),

    #[error("connection to the document was lost")]
    ConnectionLost,

    #[error("cannot insert a citation without keys")]
    EmptyCitation,

    #[error("document error: {0}")]
    Document(DocumentError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Bib(#[from] BibError),

    #[error("failed to parse {0}: {1}")]
    ParseError(String, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocumentError> for SyncError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::ConnectionLost => SyncError::ConnectionLost,
            other => SyncError::Document(other),
        }
    }
}
