//! BibTeX database support for galley.
//!
//! This crate provides the bibliography side of citation resolution:
//!
//! - [`Bibliography`] - a parsed `.bib` database, indexed by cite key
//! - [`Entry`] - a single bibliography record with typed field access
//! - [`author`] - author-string splitting and name formatting
//!
//! The parser handles the subset of BibTeX that shows up in real paper
//! submissions: all standard entry types, braced and quoted field
//! values with nested braces, `@string` abbreviations, `@comment`
//! blocks, and `#` concatenation. It does not evaluate LaTeX markup
//! inside field values; values are returned as written.

pub mod author;
pub mod entry;
pub mod parser;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use author::{Name, citation_author, split_authors};
pub use entry::{Entry, EntryKind};

/// Errors produced while loading or parsing a bibliography.
#[derive(Debug, Error)]
pub enum BibtexError {
    /// The `.bib` file could not be read.
    #[error("failed to read bibliography {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be parsed.
    #[error("malformed BibTeX near line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Two entries share the same cite key.
    #[error("duplicate cite key: {key}")]
    DuplicateKey { key: String },
}

/// A parsed bibliography database.
///
/// Entries keep their file order; lookup by cite key is via an index
/// built at parse time. Cite keys are case-sensitive, matching BibTeX
/// behavior under the common `.bst` styles.
#[derive(Debug, Clone, Default)]
pub struct Bibliography {
    entries: Vec<Entry>,
    by_key: HashMap<String, usize>,
}

impl Bibliography {
    /// Parse a bibliography from BibTeX source text.
    pub fn parse(input: &str) -> Result<Self, BibtexError> {
        let entries = parser::parse_entries(input)?;
        let mut by_key = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if by_key.insert(entry.key.clone(), i).is_some() {
                return Err(BibtexError::DuplicateKey {
                    key: entry.key.clone(),
                });
            }
        }
        Ok(Self { entries, by_key })
    }

    /// Load and parse a bibliography file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BibtexError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BibtexError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Look up an entry by cite key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.by_key.get(key).map(|&i| &self.entries[i])
    }

    /// Check whether a cite key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// All entries, in file order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the database holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
