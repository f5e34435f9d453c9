//! Journal configuration and publication parameters.
//!
//! All environment reads happen here, once, at construction time. The
//! rest of the compiler receives a [`JournalConfig`] and is
//! deterministic given its inputs.
//!
//! Recognized variables:
//! - `JOURNAL_NAME`, `JOURNAL_ALIAS`, `JOURNAL_URL`, `JOURNAL_ISSN`,
//!   `JOURNAL_DOI_PREFIX` - journal identity
//! - `GALLEY_RESOURCES` - directory holding templates, CSL and logos
//! - `GALLEY_ISSUE`, `GALLEY_VOLUME`, `GALLEY_YEAR` - numeric defaults
//!   used when a compile request does not supply them

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

/// Identity and defaults for the journal publishing the papers.
#[derive(Debug, Clone, Default)]
pub struct JournalConfig {
    /// Full journal name, e.g. "Journal of Open Research Software".
    pub name: String,

    /// Short alias used for resource lookup, e.g. "jors".
    pub alias: String,

    /// Journal web address.
    pub url: String,

    /// ISSN of the journal.
    pub issn: String,

    /// DOI prefix including the journal segment, e.g. "10.21105/jors.".
    /// A paper's DOI is this prefix plus the zero-padded review issue id.
    pub doi_prefix: String,

    /// Directory holding per-journal resources (templates, CSL, logo).
    pub resources_dir: PathBuf,

    /// Default issue number when a request supplies none.
    pub default_issue: Option<u32>,

    /// Default volume number when a request supplies none.
    pub default_volume: Option<u32>,

    /// Default publication year when a request supplies none.
    pub default_year: Option<i32>,
}

impl JournalConfig {
    /// Build a configuration from the process environment.
    ///
    /// Unset identity variables become empty strings; unset or
    /// unparseable numeric variables are left as `None` so that
    /// [`PublicationParams::resolve`] can apply its fixed fallbacks.
    pub fn from_env() -> Self {
        Self {
            name: env_string("JOURNAL_NAME"),
            alias: env_string("JOURNAL_ALIAS"),
            url: env_string("JOURNAL_URL"),
            issn: env_string("JOURNAL_ISSN"),
            doi_prefix: env_string("JOURNAL_DOI_PREFIX"),
            resources_dir: PathBuf::from(env_string("GALLEY_RESOURCES")),
            default_issue: env_number("GALLEY_ISSUE"),
            default_volume: env_number("GALLEY_VOLUME"),
            default_year: env_number("GALLEY_YEAR"),
        }
    }

    /// Resource paths for this journal.
    pub fn resources(&self) -> Resources {
        Resources {
            dir: self.resources_dir.clone(),
            alias: self.alias.clone(),
        }
    }
}

fn env_string(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Per-journal resource file locations.
///
/// Layout under the resources directory:
/// `<alias>/latex.template`, `<alias>/apa.csl`, `<alias>/logo.png`,
/// and a shared `crossref.template` at the top level.
#[derive(Debug, Clone)]
pub struct Resources {
    dir: PathBuf,
    alias: String,
}

impl Resources {
    fn journal_file(&self, name: &str) -> PathBuf {
        self.dir.join(&self.alias).join(name)
    }

    /// The pandoc LaTeX template used for Markdown-source PDFs.
    pub fn latex_template(&self) -> PathBuf {
        self.journal_file("latex.template")
    }

    /// The CSL style driving pandoc's citation processing.
    pub fn csl_file(&self) -> PathBuf {
        self.journal_file("apa.csl")
    }

    /// The journal logo referenced from the LaTeX template.
    pub fn logo(&self) -> PathBuf {
        self.journal_file("logo.png")
    }

    /// The Crossref deposit template (shared across journals).
    pub fn crossref_template(&self) -> PathBuf {
        self.dir.join("crossref.template")
    }
}

/// Caller-supplied publication parameters for one compile request.
///
/// Every field is optional; [`resolve`](Self::resolve) fills the gaps
/// from the journal defaults and the current date. Transient: nothing
/// here is persisted between requests. Deserializable so embedders can
/// accept requests straight off a queue or an API payload.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PublicationParams {
    pub issue: Option<u32>,
    pub volume: Option<u32>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// Fully-determined publication parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedParams {
    pub issue: u32,
    pub volume: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl PublicationParams {
    /// Fill unset fields: caller value, then journal default, then the
    /// current date (year/month/day) or 1 (issue/volume).
    pub fn resolve(&self, config: &JournalConfig, today: NaiveDate) -> ResolvedParams {
        ResolvedParams {
            issue: self.issue.or(config.default_issue).unwrap_or(1),
            volume: self.volume.or(config.default_volume).unwrap_or(1),
            year: self.year.or(config.default_year).unwrap_or_else(|| today.year()),
            month: self.month.unwrap_or_else(|| today.month()),
            day: self.day.unwrap_or_else(|| today.day()),
        }
    }
}

/// Test helper: a config with every identity field populated.
#[cfg(test)]
pub(crate) fn test_config(resources_dir: &Path) -> JournalConfig {
    JournalConfig {
        name: "Journal of Testing".to_string(),
        alias: "jot".to_string(),
        url: "https://example.org/jot".to_string(),
        issn: "1234-5678".to_string(),
        doi_prefix: "10.55555/jot.".to_string(),
        resources_dir: resources_dir.to_path_buf(),
        default_issue: None,
        default_volume: None,
        default_year: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_prefers_caller_values() {
        let config = JournalConfig {
            default_issue: Some(7),
            default_volume: Some(3),
            default_year: Some(2019),
            ..Default::default()
        };
        let params = PublicationParams {
            issue: Some(12),
            volume: Some(5),
            year: Some(2024),
            month: Some(2),
            day: Some(29),
        };

        let resolved = params.resolve(&config, date(2026, 8, 30));
        assert_eq!(
            resolved,
            ResolvedParams {
                issue: 12,
                volume: 5,
                year: 2024,
                month: 2,
                day: 29,
            }
        );
    }

    #[test]
    fn test_resolve_falls_back_to_journal_defaults() {
        let config = JournalConfig {
            default_issue: Some(7),
            default_volume: Some(3),
            default_year: Some(2019),
            ..Default::default()
        };

        let resolved = PublicationParams::default().resolve(&config, date(2026, 8, 30));
        assert_eq!(resolved.issue, 7);
        assert_eq!(resolved.volume, 3);
        assert_eq!(resolved.year, 2019);
        // Month and day have no journal default; the current date wins.
        assert_eq!(resolved.month, 8);
        assert_eq!(resolved.day, 30);
    }

    #[test]
    fn test_resolve_fixed_fallbacks() {
        let config = JournalConfig::default();
        let resolved = PublicationParams::default().resolve(&config, date(2026, 1, 2));
        assert_eq!(resolved.issue, 1);
        assert_eq!(resolved.volume, 1);
        assert_eq!(resolved.year, 2026);
    }

    #[test]
    fn test_params_deserialize_with_gaps() {
        let params: PublicationParams =
            serde_json::from_str(r#"{"issue": 9, "year": 2025}"#).unwrap();
        assert_eq!(params.issue, Some(9));
        assert_eq!(params.year, Some(2025));
        assert_eq!(params.volume, None);

        let resolved = params.resolve(&JournalConfig::default(), date(2026, 8, 30));
        assert_eq!(resolved.issue, 9);
        assert_eq!(resolved.volume, 1);
        assert_eq!(resolved.year, 2025);
    }

    #[test]
    fn test_resource_paths() {
        let resources = Resources {
            dir: PathBuf::from("/res"),
            alias: "jot".to_string(),
        };
        assert_eq!(
            resources.latex_template(),
            PathBuf::from("/res/jot/latex.template")
        );
        assert_eq!(resources.csl_file(), PathBuf::from("/res/jot/apa.csl"));
        assert_eq!(resources.logo(), PathBuf::from("/res/jot/logo.png"));
        assert_eq!(
            resources.crossref_template(),
            PathBuf::from("/res/crossref.template")
        );
    }
}
