//! Author-name handling.
//!
//! BibTeX author fields list names separated by ` and `, each in
//! either `Family, Given` or `Given Family` form. Crossref deposits
//! need the parts split; the citation string on a paper's title page
//! needs the family names condensed.

/// A personal name split into given and family parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    /// Given name(s), possibly empty (single-token names, consortia).
    pub given: String,
    /// Family name.
    pub family: String,
}

impl Name {
    /// Parse a single name in `Family, Given` or `Given Family` form.
    ///
    /// A braced group (`{The Pandoc Team}`) is treated as a corporate
    /// name: the whole group becomes the family part.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if raw.starts_with('{') && raw.ends_with('}') && raw.len() >= 2 {
            return Self {
                given: String::new(),
                family: raw[1..raw.len() - 1].trim().to_string(),
            };
        }

        if let Some((family, given)) = raw.split_once(',') {
            return Self {
                given: given.trim().to_string(),
                family: family.trim().to_string(),
            };
        }

        match raw.rsplit_once(char::is_whitespace) {
            Some((given, family)) => Self {
                given: given.trim().to_string(),
                family: family.trim().to_string(),
            },
            None => Self {
                given: String::new(),
                family: raw.to_string(),
            },
        }
    }
}

/// Split a BibTeX author field into individual names.
///
/// The separator is the word ` and `; semicolons are accepted too
/// since they show up in hand-written files.
pub fn split_authors(field: &str) -> Vec<Name> {
    field
        .split(" and ")
        .flat_map(|s| s.split(';'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Name::parse)
        .collect()
}

/// Condense an author field into the citation string used on a paper's
/// title page and in its DOI landing metadata.
///
/// One author gives the family name, two give `A & B`, three or more
/// give `A et al.`.
pub fn citation_author(field: &str) -> String {
    let names = split_authors(field);
    match names.as_slice() {
        [] => String::new(),
        [one] => one.family.clone(),
        [a, b] => format!("{} & {}", a.family, b.family),
        [first, ..] => format!("{} et al.", first.family),
    }
}
