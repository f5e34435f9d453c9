//! Bibliography entry model.

/// BibTeX entry kind.
///
/// Unrecognized kinds collapse to [`EntryKind::Misc`] rather than
/// failing the parse; an exotic entry type is not an error in any
/// BibTeX implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Article,
    Book,
    InCollection,
    InProceedings,
    Manual,
    PhdThesis,
    MastersThesis,
    TechReport,
    Unpublished,
    Online,
    Software,
    Misc,
}

impl EntryKind {
    /// Parse an entry kind from its BibTeX name (case-insensitive).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "phdthesis" => Self::PhdThesis,
            "mastersthesis" => Self::MastersThesis,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            "online" | "electronic" | "www" => Self::Online,
            "software" => Self::Software,
            _ => Self::Misc,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::PhdThesis => "phdthesis",
            Self::MastersThesis => "mastersthesis",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
            Self::Online => "online",
            Self::Software => "software",
            Self::Misc => "misc",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single bibliography record.
///
/// Fields keep their source order; lookup is case-insensitive on the
/// field name, as BibTeX field names are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The cite key (`@article{KEY, ...}`).
    pub key: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Fields as (name, value) pairs in source order.
    pub fields: Vec<(String, String)>,
}

impl Entry {
    /// Create an empty entry.
    pub fn new(key: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            key: key.into(),
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Look up a field value by name (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn author(&self) -> Option<&str> {
        self.field("author")
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn year(&self) -> Option<&str> {
        self.field("year")
    }

    pub fn journal(&self) -> Option<&str> {
        self.field("journal")
    }

    pub fn doi(&self) -> Option<&str> {
        self.field("doi")
    }

    pub fn volume(&self) -> Option<&str> {
        self.field("volume")
    }

    pub fn pages(&self) -> Option<&str> {
        self.field("pages")
    }
}
