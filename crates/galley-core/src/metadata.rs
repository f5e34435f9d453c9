//! Paper metadata loading and validation.
//!
//! A submission declares its metadata either in a `paper.yml` next to
//! the LaTeX source, or in the YAML front matter of `paper.md`. Both
//! carry the same record: title, authors, affiliations, keywords, and
//! the bibliography file name. All five keys are required; validation
//! checks each key in declaration order before anything else happens,
//! so a missing key is reported before any external tool runs.

use std::path::Path;

use serde_yaml::Value;

use crate::error::{GalleyError, Result};

/// Metadata file name for LaTeX-source papers.
pub const METADATA_FILE: &str = "paper.yml";

/// The keys every metadata record must declare, in the order they are
/// checked (the first absent one is the one reported).
pub const REQUIRED_KEYS: [&str; 5] =
    ["title", "authors", "affiliations", "keywords", "bibliography"];

/// One author declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorMeta {
    /// Full name as it should appear on the paper.
    pub name: String,
    /// Affiliation index reference, kept verbatim ("1" or "1, 2").
    pub affiliation: String,
}

/// One affiliation declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliationMeta {
    /// Index the authors reference.
    pub index: String,
    /// Institution name.
    pub name: String,
}

/// A validated paper metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub title: String,
    pub authors: Vec<AuthorMeta>,
    pub affiliations: Vec<AffiliationMeta>,
    pub keywords: Vec<String>,
    /// Bibliography file name, relative to the paper directory.
    pub bibliography: String,
}

impl MetadataRecord {
    /// Load and validate `paper.yml` from a paper directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(METADATA_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            GalleyError::Metadata(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a record from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| GalleyError::Metadata(format!("invalid YAML: {}", e)))?;

        let mapping = value
            .as_mapping()
            .ok_or_else(|| GalleyError::Metadata("metadata is not a mapping".to_string()))?;

        for key in REQUIRED_KEYS {
            if !mapping.contains_key(Value::from(key)) {
                return Err(GalleyError::MissingMetadataKey { key });
            }
        }

        Ok(Self {
            title: string_field(mapping, "title")?,
            authors: author_list(mapping)?,
            affiliations: affiliation_list(mapping)?,
            keywords: keyword_list(mapping)?,
            bibliography: string_field(mapping, "bibliography")?,
        })
    }

    /// Parse and validate the YAML front matter of a Markdown paper.
    ///
    /// The front matter is the block between the opening `---` line and
    /// the next `---`/`...` line.
    pub fn from_front_matter(document: &str) -> Result<Self> {
        let block = front_matter_block(document).ok_or_else(|| {
            GalleyError::Metadata("paper has no YAML front matter".to_string())
        })?;
        Self::from_yaml(block)
    }
}

/// Extract the front matter block, without its delimiter lines.
fn front_matter_block(document: &str) -> Option<&str> {
    let rest = document.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| {
        rest.strip_prefix("\r\n")
    })?;

    for terminator in ["\n---", "\n..."] {
        if let Some(end) = rest.find(terminator) {
            return Some(&rest[..end]);
        }
    }
    None
}

fn string_field(mapping: &serde_yaml::Mapping, key: &str) -> Result<String> {
    scalar_string(mapping.get(Value::from(key)).unwrap_or(&Value::Null))
        .ok_or_else(|| GalleyError::Metadata(format!("key '{}' is not a string", key)))
}

/// Render a YAML scalar as a string; numbers are accepted since YAML
/// authors write `affiliation: 1` and `index: 1` without quotes.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn author_list(mapping: &serde_yaml::Mapping) -> Result<Vec<AuthorMeta>> {
    let items = sequence(mapping, "authors")?;
    items
        .iter()
        .map(|item| {
            let entry = item
                .as_mapping()
                .ok_or_else(|| GalleyError::Metadata("author is not a mapping".to_string()))?;
            Ok(AuthorMeta {
                name: string_field(entry, "name")
                    .map_err(|_| GalleyError::Metadata("author without a name".to_string()))?,
                affiliation: string_field(entry, "affiliation").map_err(|_| {
                    GalleyError::Metadata("author without an affiliation".to_string())
                })?,
            })
        })
        .collect()
}

fn affiliation_list(mapping: &serde_yaml::Mapping) -> Result<Vec<AffiliationMeta>> {
    let items = sequence(mapping, "affiliations")?;
    items
        .iter()
        .map(|item| {
            let entry = item.as_mapping().ok_or_else(|| {
                GalleyError::Metadata("affiliation is not a mapping".to_string())
            })?;
            Ok(AffiliationMeta {
                index: string_field(entry, "index").map_err(|_| {
                    GalleyError::Metadata("affiliation without an index".to_string())
                })?,
                name: string_field(entry, "name").map_err(|_| {
                    GalleyError::Metadata("affiliation without a name".to_string())
                })?,
            })
        })
        .collect()
}

fn keyword_list(mapping: &serde_yaml::Mapping) -> Result<Vec<String>> {
    let items = sequence(mapping, "keywords")?;
    items
        .iter()
        .map(|item| {
            scalar_string(item)
                .ok_or_else(|| GalleyError::Metadata("keyword is not a string".to_string()))
        })
        .collect()
}

fn sequence<'a>(mapping: &'a serde_yaml::Mapping, key: &str) -> Result<&'a Vec<Value>> {
    mapping
        .get(Value::from(key))
        .and_then(Value::as_sequence)
        .ok_or_else(|| GalleyError::Metadata(format!("key '{}' is not a list", key)))
}
