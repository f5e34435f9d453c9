//! Paper model: source format, DOI forms, titles.
//!
//! A [`Paper`] is constructed once per compile request from on-disk
//! state and is immutable for the duration of the compile.

use std::path::{Path, PathBuf};

use crate::config::JournalConfig;
use crate::error::{GalleyError, Result};
use crate::metadata::MetadataRecord;

/// Canonical LaTeX source file name.
pub const LATEX_SOURCE: &str = "paper.tex";

/// Canonical Markdown source file name.
pub const MARKDOWN_SOURCE: &str = "paper.md";

/// The two paper source formats the compiler handles.
///
/// Decided once, at [`Paper::discover`] time, by which canonical source
/// file is present in the paper directory. There is no third variant;
/// dispatch over this enum is always exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Latex,
    Markdown,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Latex => "latex",
            SourceFormat::Markdown => "markdown",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One paper submission, ready to compile.
#[derive(Debug, Clone)]
pub struct Paper {
    /// Paper directory; all artifacts are written here.
    pub directory: PathBuf,

    /// Declared source format.
    pub source: SourceFormat,

    /// Canonical paper source file (absolute).
    pub paper_path: PathBuf,

    /// Bibliography database file (absolute), from the metadata record.
    pub bibliography_path: PathBuf,

    /// Review issue id this submission was tracked under.
    pub review_issue_id: u32,

    /// Assigned DOI, e.g. `10.55555/jot.00042`.
    pub doi: String,

    /// Review issue URL on the journal's tracker.
    pub review_issue_url: String,

    /// Paper title, verbatim from the metadata record.
    pub title: String,

    /// Condensed author string for citations ("Smith et al.").
    pub citation_author: String,

    /// Source repository address, when known.
    pub repository: String,

    /// DOI of the archived software release, when known.
    pub archive_doi: String,
}

impl Paper {
    /// Build a paper from its directory.
    ///
    /// Detects the source format from which canonical source file
    /// exists, loads the metadata record (from `paper.yml` for LaTeX
    /// source, from the front matter for Markdown source), and derives
    /// the DOI from the journal prefix and the review issue id.
    ///
    /// A directory containing neither source file is rejected with
    /// [`GalleyError::UnsupportedSourceFormat`].
    pub fn discover(
        directory: impl AsRef<Path>,
        review_issue_id: u32,
        config: &JournalConfig,
    ) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        let latex_path = directory.join(LATEX_SOURCE);
        let markdown_path = directory.join(MARKDOWN_SOURCE);
        let (source, paper_path) = if latex_path.is_file() {
            (SourceFormat::Latex, latex_path)
        } else if markdown_path.is_file() {
            (SourceFormat::Markdown, markdown_path)
        } else {
            return Err(GalleyError::UnsupportedSourceFormat(format!(
                "{} contains neither {} nor {}",
                directory.display(),
                LATEX_SOURCE,
                MARKDOWN_SOURCE
            )));
        };

        let metadata = match source {
            SourceFormat::Latex => MetadataRecord::load(&directory)?,
            SourceFormat::Markdown => {
                let body = std::fs::read_to_string(&paper_path)?;
                MetadataRecord::from_front_matter(&body)?
            }
        };

        let doi = format!("{}{:05}", config.doi_prefix, review_issue_id);
        let review_issue_url = format!("{}/reviews/{}", config.url, review_issue_id);

        let author_field = metadata
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(" and ");

        Ok(Self {
            directory,
            source,
            paper_path,
            bibliography_path: PathBuf::new(),
            review_issue_id,
            doi,
            review_issue_url,
            title: metadata.title.clone(),
            citation_author: galley_bibtex::citation_author(&author_field),
            repository: String::new(),
            archive_doi: String::new(),
        }
        .with_bibliography(&metadata.bibliography))
    }

    fn with_bibliography(mut self, file: &str) -> Self {
        self.bibliography_path = self.directory.join(file);
        self
    }

    /// Set the source repository address.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Set the software archive DOI.
    pub fn with_archive_doi(mut self, archive_doi: impl Into<String>) -> Self {
        self.archive_doi = archive_doi.into();
        self
    }

    /// The DOI in display form (identical to the raw DOI).
    pub fn formatted_doi(&self) -> &str {
        &self.doi
    }

    /// The DOI as a resolvable URL.
    pub fn doi_url(&self) -> String {
        format!("https://doi.org/{}", self.doi)
    }

    /// Filename-safe DOI: slashes become dots.
    pub fn filename_doi(&self) -> String {
        self.doi.replace('/', ".")
    }

    /// URL the published PDF will live at.
    pub fn pdf_url(&self, config: &JournalConfig) -> String {
        format!("{}/papers/{}.pdf", config.url, self.filename_doi())
    }

    /// The paper's landing page on the journal site, addressed by the
    /// alias-dotted paper id rather than the DOI.
    pub fn resource_url(&self, config: &JournalConfig) -> String {
        format!(
            "{}/papers/{}.{:05}",
            config.url, config.alias, self.review_issue_id
        )
    }

    /// Title with underscores escaped for LaTeX.
    pub fn escaped_title(&self) -> String {
        self.title.replace('_', r"\_")
    }

    /// Footnote-safe title: underscores and `#` escaped.
    ///
    /// `#` stays unescaped in [`escaped_title`](Self::escaped_title);
    /// only this variant escapes it.
    pub fn footnote_title(&self) -> String {
        self.title.replace('_', r"\_").replace('#', r"\#")
    }
}
