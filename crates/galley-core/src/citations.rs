//! Citation extraction and Crossref fragment generation.
//!
//! The paper body is scanned for citation-key tokens (`@` followed by
//! word or hyphen characters); each key is resolved against the
//! bibliography database. A key with no bibliography entry fails the
//! compile outright - partial citation text is never synthesized.

use once_cell::sync::Lazy;
use regex::Regex;

use galley_bibtex::{Bibliography, Entry, Name};

use crate::error::{GalleyError, Result};
use crate::metadata::AuthorMeta;

static CITATION_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@([\w-]+)").expect("citation key pattern is valid")
});

/// Scan a paper body for citation keys, in order of first appearance.
///
/// Duplicate occurrences are preserved; deduplication is the resolver's
/// business, not the scanner's. Keys are returned without the `@`.
pub fn scan_citation_keys(body: &str) -> Vec<String> {
    CITATION_KEY
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

/// One resolved citation, ready for the Crossref deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    /// Cite key, without the `@`.
    pub key: String,
    /// The Crossref `<citation>` element for this reference.
    pub element: String,
}

/// The citations of one paper, resolved against its bibliography.
#[derive(Debug, Clone, Default)]
pub struct CitationSet {
    citations: Vec<Citation>,
}

impl CitationSet {
    /// Scan `body` and resolve every key against `bibliography`.
    ///
    /// Keys are resolved in order of first appearance; repeated
    /// occurrences resolve to a single citation. An unknown key is a
    /// hard failure.
    pub fn extract(body: &str, bibliography: &Bibliography) -> Result<Self> {
        let mut citations: Vec<Citation> = Vec::new();

        for key in scan_citation_keys(body) {
            if citations.iter().any(|c| c.key == key) {
                continue;
            }
            let entry = bibliography
                .get(&key)
                .ok_or_else(|| GalleyError::UnknownCitationKey { key: key.clone() })?;
            citations.push(Citation {
                element: citation_element(entry),
                key,
            });
        }

        Ok(Self { citations })
    }

    /// The resolved citations, in first-appearance order.
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Cite keys in first-appearance order.
    pub fn keys(&self) -> Vec<&str> {
        self.citations.iter().map(|c| c.key.as_str()).collect()
    }

    /// All `<citation>` elements concatenated for template substitution.
    pub fn to_xml(&self) -> String {
        self.citations
            .iter()
            .map(|c| c.element.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

/// Render one bibliography entry as a Crossref `<citation>` element.
///
/// Entries with a DOI get a structured `<doi>` child; everything else
/// becomes an `<unstructured_citation>` assembled from author, title,
/// journal, volume, pages and year, skipping absent fields.
fn citation_element(entry: &Entry) -> String {
    if let Some(doi) = entry.doi() {
        return format!(
            "<citation key=\"{}\"><doi>{}</doi></citation>",
            xml_escape(&entry.key),
            xml_escape(doi)
        );
    }

    let text = [
        entry.author(),
        entry.title(),
        entry.journal(),
        entry.volume(),
        entry.pages(),
        entry.year(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    format!(
        "<citation key=\"{}\"><unstructured_citation>{}</unstructured_citation></citation>",
        xml_escape(&entry.key),
        xml_escape(&text)
    )
}

/// Render the paper's authors as Crossref `<person_name>` elements.
///
/// The first author carries `sequence="first"`, the rest
/// `sequence="additional"`, per the Crossref deposit schema.
pub fn crossref_authors(authors: &[AuthorMeta]) -> String {
    authors
        .iter()
        .enumerate()
        .map(|(i, author)| {
            let sequence = if i == 0 { "first" } else { "additional" };
            let name = Name::parse(&author.name);
            format!(
                "<person_name sequence=\"{}\" contributor_role=\"author\">\
                 <given_name>{}</given_name><surname>{}</surname></person_name>",
                sequence,
                xml_escape(&name.given),
                xml_escape(&name.family)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
