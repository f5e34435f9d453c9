//! galley-core: compile accepted paper submissions into publication
//! artifacts.
//!
//! A submission lives in a directory holding either `paper.tex` plus a
//! `paper.yml` metadata record, or `paper.md` with the same record in
//! its YAML front matter, along with a BibTeX bibliography. From that,
//! the compiler produces two artifacts, both named after the paper's
//! DOI with slashes turned into dots:
//!
//! - the publication PDF (`<filename_doi>.pdf`), via latexmk for LaTeX
//!   source or pandoc for Markdown source
//! - the Crossref deposit (`<filename_doi>.crossref.xml`), Markdown
//!   source only, with every cited key resolved against the
//!   bibliography before the deposit is assembled
//!
//! Typical use:
//!
//! ```no_run
//! use galley_core::{ArtifactCompiler, JournalConfig, Paper, PublicationParams};
//!
//! # fn main() -> galley_core::Result<()> {
//! let config = JournalConfig::from_env();
//! let paper = Paper::discover("papers/00042", 42, &config)?;
//! let compiler = ArtifactCompiler::new(config);
//! let pdf = compiler.generate_pdf(&paper, &PublicationParams::default())?;
//! println!("wrote {}", pdf.display());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod citations;
pub mod config;
pub mod error;
pub mod invoke;
pub mod metadata;
pub mod paper;
pub mod pipeline;
pub mod template;

pub use citations::{scan_citation_keys, Citation, CitationSet};
pub use config::{JournalConfig, PublicationParams, ResolvedParams};
pub use error::{GalleyError, Result};
pub use invoke::Toolchain;
pub use metadata::{AffiliationMeta, AuthorMeta, MetadataRecord};
pub use paper::{Paper, SourceFormat};
pub use pipeline::ArtifactCompiler;
