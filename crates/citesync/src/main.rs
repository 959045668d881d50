/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use citesync_core::{BibDatabase, BibliographicDatabase, CitationType, Style};
use citesync_processor::io::{load_database, load_document, load_style, save_document};
use citesync_processor::{MemoryDocument, RefreshReport, SyncContext, SyncController};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh citation markers and the bibliography of a document
    Refresh {
        #[command(flatten)]
        input: Input,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Join adjacent citations, then refresh
    Merge {
        #[command(flatten)]
        input: Input,
    },
    /// Insert a citation at the document's cursor
    Insert {
        #[command(flatten)]
        input: Input,

        /// Citation keys (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,

        /// How the citation is displayed
        #[arg(long, value_enum, default_value_t = Kind::Parenthetical)]
        kind: Kind,

        /// Page information attached to the citation
        #[arg(long)]
        page_info: Option<String>,

        /// Skip the refresh after inserting
        #[arg(long)]
        no_sync: bool,
    },
    /// Delete a citation mark, then refresh
    Remove {
        #[command(flatten)]
        input: Input,

        /// Name of the mark to delete
        #[arg(short, long)]
        mark: String,

        /// Skip the refresh after removing
        #[arg(long)]
        no_sync: bool,
    },
    /// List the distinct keys cited in a document, body marks before footnotes
    Keys {
        /// Path to the document snapshot (YAML/JSON)
        document: PathBuf,
    },
    /// Validate a style file and print a summary
    Validate {
        /// Path to the style file (jstyle/YAML/JSON)
        path: PathBuf,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Generate JSON schema for styles and databases
    #[cfg(feature = "schema")]
    Schema,
}

#[derive(clap::Args)]
struct Input {
    /// Path to the document snapshot (YAML/JSON)
    #[arg(index = 1)]
    document: PathBuf,

    /// Path to the style file (jstyle/YAML/JSON)
    #[arg(short, long)]
    style: PathBuf,

    /// Bibliographic database (.bib/YAML/JSON); may be repeated
    #[arg(short, long = "bib", required = true)]
    bibs: Vec<PathBuf>,

    /// Where to write the updated document; defaults to the input path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Kind {
    Parenthetical,
    InText,
    Invisible,
}

impl From<Kind> for CitationType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Parenthetical => CitationType::Parenthetical,
            Kind::InText => CitationType::InText,
            Kind::Invisible => CitationType::Invisible,
        }
    }
}

/// Everything a controller needs, loaded from disk.
struct Session {
    document: MemoryDocument,
    style: Style,
    databases: Vec<BibDatabase>,
    output: PathBuf,
}

impl Session {
    fn load(input: Input) -> Result<Self> {
        let style = load_style(&input.style)
            .with_context(|| format!("reading style {}", input.style.display()))?;
        let databases = input
            .bibs
            .iter()
            .map(|path| {
                load_database(path).with_context(|| format!("reading database {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        let document = load_document(&input.document)
            .with_context(|| format!("reading document {}", input.document.display()))?;
        tracing::debug!(
            style = %style.name,
            databases = databases.len(),
            entries = databases.iter().map(|db| db.entries.len()).sum::<usize>(),
            "loaded session"
        );
        Ok(Self {
            document,
            style,
            databases,
            output: input.output.unwrap_or(input.document),
        })
    }

    fn run<T>(
        &mut self,
        f: impl FnOnce(&mut SyncController<MemoryDocument>) -> Result<T, citesync_processor::SyncError>,
    ) -> Result<T> {
        let databases: Vec<&dyn BibliographicDatabase> = self
            .databases
            .iter()
            .map(|db| db as &dyn BibliographicDatabase)
            .collect();
        let mut controller =
            SyncController::new(&mut self.document, SyncContext::new(&self.style, &databases));
        Ok(f(&mut controller)?)
    }

    fn save(&self) -> Result<()> {
        save_document(&self.document, &self.output)
            .with_context(|| format!("writing document {}", self.output.display()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Refresh { input, json } => {
            let mut session = Session::load(input)?;
            let report = session.run(|c| c.refresh())?;
            session.save()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Merge { input } => {
            let mut session = Session::load(input)?;
            let outcome = session.run(|c| c.merge_citations())?;
            session.save()?;
            println!("Merged {} citation pair(s).", outcome.merged);
            if let Some(report) = outcome.refresh {
                print_report(&report);
            }
        }
        Commands::Insert {
            input,
            keys,
            kind,
            page_info,
            no_sync,
        } => {
            let mut session = Session::load(input)?;
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            let outcome = session.run(|c| {
                c.insert_citation(&keys, kind.into(), page_info.as_deref(), !no_sync)
            })?;
            session.save()?;
            println!("Inserted {}", outcome.mark_name);
            if let Some(report) = outcome.refresh {
                print_report(&report);
            }
        }
        Commands::Remove {
            input,
            mark,
            no_sync,
        } => {
            let mut session = Session::load(input)?;
            let refresh = session.run(|c| c.remove_citation(&mark, !no_sync))?;
            session.save()?;
            println!("Removed {mark}");
            if let Some(report) = refresh {
                print_report(&report);
            }
        }
        Commands::Keys { document } => {
            let document = load_document(&document)
                .with_context(|| format!("reading document {}", document.display()))?;
            for key in citesync_processor::cited_keys(&document)? {
                println!("{key}");
            }
        }
        Commands::Validate { path } => validate(&path)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "citesync", &mut io::stdout());
        }
        #[cfg(feature = "schema")]
        Commands::Schema => {
            let styles = schemars::schema_for!(citesync_core::style::RawStyle);
            let databases = schemars::schema_for!(BibDatabase);
            let combined = serde_json::json!({
                "style": styles,
                "database": databases,
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
    }

    Ok(())
}

fn print_report(report: &RefreshReport) {
    println!("=== CITATIONS ===\n");
    for (name, text) in &report.markers {
        println!("[{name}] {text}");
    }
    println!("\n{} bibliography entries", report.bibliography_entries);
    if !report.unresolved_keys.is_empty() {
        println!("Unresolved keys: {}", report.unresolved_keys.join(", "));
    }
}

fn validate(path: &Path) -> Result<()> {
    let style = load_style(path).with_context(|| format!("validating {}", path.display()))?;
    println!("Style is valid: {}", style.name);
    let kind = if style.citation.bibtex_key_citations {
        "key"
    } else if style.is_numeric() {
        "numeric"
    } else {
        "author-year"
    };
    println!("  citations: {kind}");
    println!(
        "  bibliography: \"{}\", {}",
        style.title,
        if style.is_sort_by_position {
            "by position"
        } else {
            "sorted"
        }
    );
    let layouts: Vec<&str> = style.layouts.keys().map(String::as_str).collect();
    println!("  layouts: {}", layouts.join(", "));
    Ok(())
}
