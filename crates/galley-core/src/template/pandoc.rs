//! Pandoc variable sets and argument lists.
//!
//! A pandoc run is fully determined by the argument vector built here;
//! the invocation layer adds nothing. Variables are kept in insertion
//! order so a command line reads the same way across runs.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::citations::{crossref_authors, CitationSet};
use crate::config::{JournalConfig, ResolvedParams};
use crate::metadata::MetadataRecord;
use crate::paper::Paper;

/// An ordered set of `-V key=value` template variables.
#[derive(Debug, Clone, Default)]
pub struct PandocVariables {
    vars: Vec<(String, String)>,
}

impl PandocVariables {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.push((key.into(), value.into()));
    }

    /// Look up a variable by key. Last write wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Expand into `-V key=value` argument pairs, in insertion order.
    pub fn as_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.vars.len() * 2);
        for (key, value) in &self.vars {
            args.push("-V".to_string());
            args.push(format!("{key}={value}"));
        }
        args
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn long_date(params: &ResolvedParams) -> String {
    match NaiveDate::from_ymd_opt(params.year, params.month, params.day) {
        Some(date) => date.format("%d %B %Y").to_string(),
        // Out-of-range component; fall back to a plain numeric form.
        None => format!("{:02}/{:02}/{}", params.day, params.month, params.year),
    }
}

/// Variables for the PDF template of a Markdown-source paper.
pub fn pdf_variables(
    paper: &Paper,
    config: &JournalConfig,
    params: &ResolvedParams,
) -> PandocVariables {
    let published = long_date(params);

    let mut vars = PandocVariables::default();
    vars.push("repository", &paper.repository);
    vars.push("archive_doi", &paper.archive_doi);
    vars.push("paper_url", paper.pdf_url(config));
    vars.push("journal_name", &config.name);
    vars.push("formatted_doi", paper.formatted_doi());
    vars.push("review_issue_url", &paper.review_issue_url);
    vars.push("graphics", "true");
    vars.push("issue", params.issue.to_string());
    vars.push("volume", params.volume.to_string());
    vars.push("page", paper.review_issue_id.to_string());
    vars.push("logo_path", config.resources().logo().display().to_string());
    vars.push("year", params.year.to_string());
    vars.push("submitted", &published);
    vars.push("published", &published);
    vars.push("citation_author", &paper.citation_author);
    vars.push("paper_title", paper.escaped_title());
    vars.push("footnote_paper_title", paper.footnote_title());
    vars
}

/// The full pandoc argument vector producing `<filename_doi>.pdf`.
pub fn pdf_args(paper: &Paper, config: &JournalConfig, vars: &PandocVariables) -> Vec<String> {
    let resources = config.resources();
    let source_name = paper
        .paper_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::paper::MARKDOWN_SOURCE.to_string());

    let mut args = vars.as_args();
    args.extend([
        "-o".to_string(),
        format!("{}.pdf", paper.filename_doi()),
        "-V".to_string(),
        "geometry:margin=1in".to_string(),
        "--pdf-engine=xelatex".to_string(),
        "--filter".to_string(),
        "pandoc-citeproc".to_string(),
        source_name,
        "--from".to_string(),
        "markdown+autolink_bare_uris".to_string(),
        format!("--csl={}", resources.csl_file().display()),
        "--template".to_string(),
        resources.latex_template().display().to_string(),
    ]);
    args
}

/// Variables for the Crossref deposit template.
///
/// `now` stamps the deposit; the batch id is a fresh UUID so repeated
/// deposits of the same paper stay distinguishable.
pub fn crossref_variables(
    paper: &Paper,
    metadata: &MetadataRecord,
    config: &JournalConfig,
    params: &ResolvedParams,
    citations: &CitationSet,
    now: NaiveDateTime,
) -> PandocVariables {
    let mut vars = PandocVariables::default();
    vars.push("timestamp", now.format("%Y%m%d%H%M%S").to_string());
    vars.push("doi_batch_id", Uuid::new_v4().simple().to_string());
    vars.push("formatted_doi", paper.formatted_doi());
    vars.push("archive_doi", &paper.archive_doi);
    vars.push("review_issue_url", &paper.review_issue_url);
    vars.push("paper_url", paper.pdf_url(config));
    vars.push("resource_url", paper.resource_url(config));
    vars.push("journal_alias", &config.alias);
    vars.push("journal_abbrev_title", config.alias.to_uppercase());
    vars.push("journal_url", &config.url);
    vars.push("journal_name", &config.name);
    vars.push("journal_issn", &config.issn);
    vars.push("citations", citations.to_xml());
    vars.push("authors", crossref_authors(&metadata.authors));
    vars.push("month", params.month.to_string());
    vars.push("day", params.day.to_string());
    vars.push("year", params.year.to_string());
    vars.push("issue", params.issue.to_string());
    vars.push("volume", params.volume.to_string());
    vars.push("page", paper.review_issue_id.to_string());
    // The deposit is XML, not LaTeX: the title goes in unescaped.
    vars.push("title", &paper.title);
    vars
}

/// The pandoc argument vector producing `<filename_doi>.crossref.xml`.
pub fn crossref_args(
    paper: &Paper,
    config: &JournalConfig,
    vars: &PandocVariables,
) -> Vec<String> {
    let source_name = paper
        .paper_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::paper::MARKDOWN_SOURCE.to_string());

    let mut args = vars.as_args();
    args.extend([
        "-f".to_string(),
        "markdown".to_string(),
        source_name,
        "-o".to_string(),
        format!("{}.crossref.xml", paper.filename_doi()),
        "--template".to_string(),
        config.resources().crossref_template().display().to_string(),
    ]);
    args
}
