/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use std::fs;
use std::path::Path;

use citesync_core::{BibDatabase, Style};

use crate::document::MemoryDocument;
use crate::error::SyncError;

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("yaml")
}

/// Load a style from a file given its path.
/// Supports `.jstyle` files and their YAML/JSON equivalents.
pub fn load_style(path: &Path) -> Result<Style, SyncError> {
    let content = fs::read_to_string(path)?;
    let style = match extension(path) {
        "jstyle" => Style::from_jstyle(&content)?,
        "json" => Style::from_json(&content)?,
        _ => Style::from_yaml(&content)?,
    };
    Ok(style)
}

/// Load a database from a file given its path.
/// Supports BibTeX/BibLaTeX `.bib` files and YAML/JSON dumps of a
/// [`BibDatabase`]. The database is named after the file.
pub fn load_database(path: &Path) -> Result<BibDatabase, SyncError> {
    let content = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match extension(path) {
        "bib" => Ok(BibDatabase::from_bibtex(name, &content)?),
        "json" => {
            let mut db: BibDatabase = serde_json::from_str(&content)
                .map_err(|e| SyncError::ParseError("JSON".to_string(), e.to_string()))?;
            if db.name.is_empty() {
                db.name = name;
            }
            Ok(db)
        }
        _ => {
            let mut db: BibDatabase = serde_yaml::from_str(&content)
                .map_err(|e| SyncError::ParseError("YAML".to_string(), e.to_string()))?;
            if db.name.is_empty() {
                db.name = name;
            }
            Ok(db)
        }
    }
}

/// Load a document snapshot (YAML or JSON).
pub fn load_document(path: &Path) -> Result<MemoryDocument, SyncError> {
    let content = fs::read_to_string(path)?;
    match extension(path) {
        "json" => serde_json::from_str(&content)
            .map_err(|e| SyncError::ParseError("JSON".to_string(), e.to_string())),
        _ => serde_yaml::from_str(&content)
            .map_err(|e| SyncError::ParseError("YAML".to_string(), e.to_string())),
    }
}

/// Write a document snapshot, in JSON or YAML by extension.
pub fn save_document(document: &MemoryDocument, path: &Path) -> Result<(), SyncError> {
    let content = match extension(path) {
        "json" => serde_json::to_string_pretty(document)
            .map_err(|e| SyncError::ParseError("JSON".to_string(), e.to_string()))?,
        _ => serde_yaml::to_string(document)
            .map_err(|e| SyncError::ParseError("YAML".to_string(), e.to_string()))?,
    };
    fs::write(path, content)?;
    Ok(())
}
