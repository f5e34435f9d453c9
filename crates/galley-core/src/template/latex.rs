//! Generated LaTeX fragments for LaTeX-source papers.
//!
//! Three fragments are written into the paper directory on every
//! compile, overwriting whatever was there: the document header
//! (title, authors, affiliations, keywords), the journal data macros,
//! and the bibliography hookup. They are generated files and say so in
//! their first line; they are never hand-edited.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::{JournalConfig, ResolvedParams};
use crate::error::Result;
use crate::metadata::MetadataRecord;

/// First line of every generated fragment.
pub const GENERATED_MARKER: &str =
    "% **************GENERATED FILE, DO NOT EDIT**************";

/// File names the fragments are written under.
pub const HEADER_FILE: &str = "header.tex";
pub const JOURNAL_DATA_FILE: &str = "journal_dat.tex";
pub const BIBLIOGRAPHY_FILE: &str = "bib.tex";

/// The three rendered fragments of one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexFragments {
    /// `header.tex` content.
    pub header: String,
    /// `journal_dat.tex` content.
    pub journal_data: String,
    /// `bib.tex` content.
    pub bibliography: String,
}

impl LatexFragments {
    /// Render all three fragments from validated metadata.
    pub fn render(
        metadata: &MetadataRecord,
        config: &JournalConfig,
        params: &ResolvedParams,
    ) -> Self {
        Self {
            header: render_header(metadata),
            journal_data: render_journal_data(config, params),
            bibliography: render_bibliography(metadata, config),
        }
    }

    /// Write the fragments into the paper directory, overwriting any
    /// previous generation. Returns the paths written.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let files = [
            (HEADER_FILE, &self.header),
            (JOURNAL_DATA_FILE, &self.journal_data),
            (BIBLIOGRAPHY_FILE, &self.bibliography),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, content) in files {
            let path = dir.join(name);
            std::fs::write(&path, content)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Title, author/affiliation declarations, keyword list.
///
/// Authors and affiliations are emitted in metadata order. The keyword
/// list is joined with `", "`; no separator leads or trails.
fn render_header(metadata: &MetadataRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", GENERATED_MARKER);
    let _ = writeln!(out, "\\title{{{}}}\n", metadata.title);

    for author in &metadata.authors {
        let _ = writeln!(out, "\\author[{}]{{{}}}", author.affiliation, author.name);
    }
    for affiliation in &metadata.affiliations {
        let _ = writeln!(out, "\\affil[{}]{{{}}}", affiliation.index, affiliation.name);
    }

    let _ = writeln!(out, "\n\\keywords{{{}}}", metadata.keywords.join(", "));
    out
}

/// Journal identity and issue/volume/year macros.
fn render_journal_data(config: &JournalConfig, params: &ResolvedParams) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", GENERATED_MARKER);
    let _ = writeln!(out, "\\def\\@journalName{{{}}}", config.name);
    let _ = writeln!(out, "\\def\\@volume{{{}}}", params.volume);
    let _ = writeln!(out, "\\def\\@issue{{{}}}", params.issue);
    let _ = writeln!(out, "\\def\\@year{{{}}}", params.year);
    out
}

/// Bibliography style and source hookup.
fn render_bibliography(metadata: &MetadataRecord, config: &JournalConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", GENERATED_MARKER);
    let _ = writeln!(out, "\\bibliographystyle{{{}}}", config.alias);
    let _ = writeln!(out, "\\bibliography{{{}}}", metadata.bibliography);
    out
}
